//! Whole-contract ABI assembled from a JSON interface description.

use std::collections::HashMap;
use std::fmt;

use ethers::abi::Token;
use tracing::debug;

use crate::constructor::{Constructor, Fallback, Receive};
use crate::contract_error::ContractError;
use crate::declaration::{Declaration, DeclarationKind};
use crate::error::{AbiError, Result, ValidationError};
use crate::event::Event;
use crate::method::Method;
use crate::named::NamedMap;
use crate::types::Selector;

const BUILTIN_ERRORS: [&str; 2] = ["Panic", "Error"];

#[derive(Debug, Clone)]
pub struct ContractAbi {
    constructor: Constructor,
    fallback: Option<Fallback>,
    receive: Option<Receive>,
    methods: NamedMap<Method>,
    events: NamedMap<Event>,
    errors: NamedMap<ContractError>,
    error_index: HashMap<Selector, String>,
}

/// Collects entities for a [`ContractAbi`]; all checks run in [`AbiBuilder::build`].
#[derive(Debug, Default)]
pub struct AbiBuilder {
    constructors: Vec<Constructor>,
    fallbacks: Vec<Fallback>,
    receives: Vec<Receive>,
    methods: Vec<Method>,
    events: Vec<Event>,
    errors: Vec<ContractError>,
}

impl AbiBuilder {
    pub fn constructor(mut self, constructor: Constructor) -> Self {
        self.constructors.push(constructor);
        self
    }

    pub fn fallback(mut self, fallback: Fallback) -> Self {
        self.fallbacks.push(fallback);
        self
    }

    pub fn receive(mut self, receive: Receive) -> Self {
        self.receives.push(receive);
        self
    }

    pub fn method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }

    pub fn event(mut self, event: Event) -> Self {
        self.events.push(event);
        self
    }

    pub fn error(mut self, error: ContractError) -> Self {
        self.errors.push(error);
        self
    }

    pub fn build(self) -> Result<ContractAbi> {
        let constructor = at_most_one(self.constructors, "constructor")?.unwrap_or_default();
        let fallback = at_most_one(self.fallbacks, "fallback")?;
        let receive = at_most_one(self.receives, "receive")?;

        let mut methods = NamedMap::new();
        for method in self.methods {
            let name = method.name().to_string();
            methods
                .insert(name.clone(), method)
                .map_err(|_| AbiError::DuplicateDeclaration { kind: "function", name })?;
        }

        let mut events = NamedMap::new();
        for event in self.events {
            let name = event.name().to_string();
            events
                .insert(name.clone(), event)
                .map_err(|_| AbiError::DuplicateDeclaration { kind: "event", name })?;
        }

        let errors = collect_errors(self.errors)?;
        let error_index = index_errors(&errors)?;

        debug!(
            methods = methods.len(),
            events = events.len(),
            errors = errors.len(),
            fallback = fallback.is_some(),
            receive = receive.is_some(),
            "assembled contract ABI"
        );

        Ok(ContractAbi { constructor, fallback, receive, methods, events, errors, error_index })
    }
}

fn at_most_one<T>(mut items: Vec<T>, kind: &'static str) -> Result<Option<T>> {
    if items.len() > 1 {
        return Err(AbiError::DuplicateDeclaration { kind, name: kind.to_string() });
    }
    Ok(items.pop())
}

// Built-ins come first; a declared error identical to a built-in takes its place.
fn collect_errors(declared: Vec<ContractError>) -> Result<NamedMap<ContractError>> {
    let mut errors = NamedMap::new();
    for builtin in [ContractError::panic(), ContractError::legacy()] {
        let _ = errors.insert(builtin.name().to_string(), builtin);
    }

    let mut redeclared = Vec::new();
    for error in declared {
        let name = error.name().to_string();
        let is_builtin = BUILTIN_ERRORS.contains(&name.as_str()) && !redeclared.contains(&name);
        match errors.get(&name).map(ContractError::canonical_signature) {
            Some(existing) if is_builtin && existing == error.canonical_signature() => {
                errors.replace(&name, error);
                redeclared.push(name);
            }
            Some(_) => return Err(AbiError::DuplicateDeclaration { kind: "error", name }),
            None => {
                let _ = errors.insert(name, error);
            }
        }
    }
    Ok(errors)
}

fn index_errors(errors: &NamedMap<ContractError>) -> Result<HashMap<Selector, String>> {
    let mut seen: HashMap<Selector, (&str, &ContractError)> = HashMap::with_capacity(errors.len());
    for (name, error) in errors {
        let selector = error.selector();
        if let Some((_, first)) = seen.insert(selector, (name, error)) {
            return Err(ValidationError::SelectorCollision {
                selector,
                first: first.canonical_signature(),
                second: error.canonical_signature(),
            }
            .into());
        }
    }
    Ok(seen.into_iter().map(|(selector, (name, _))| (selector, name.to_string())).collect())
}

impl ContractAbi {
    pub fn builder() -> AbiBuilder {
        AbiBuilder::default()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let declarations: Vec<Declaration> = serde_json::from_str(json)?;
        Self::from_declarations(declarations)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let declarations: Vec<Declaration> = serde_json::from_value(value)?;
        Self::from_declarations(declarations)
    }

    pub fn from_declarations(declarations: impl IntoIterator<Item = Declaration>) -> Result<Self> {
        let mut builder = Self::builder();
        for decl in declarations {
            builder = match decl.kind()? {
                DeclarationKind::Constructor => builder.constructor(Constructor::from_declaration(&decl)?),
                DeclarationKind::Function => builder.method(Method::from_declaration(&decl)?),
                DeclarationKind::Fallback => builder.fallback(Fallback::from_declaration(&decl)?),
                DeclarationKind::Receive => builder.receive(Receive::from_declaration(&decl)?),
                DeclarationKind::Event => builder.event(Event::from_declaration(&decl)?),
                DeclarationKind::Error => builder.error(ContractError::from_declaration(&decl)?),
            };
        }
        builder.build()
    }

    pub fn constructor(&self) -> &Constructor {
        &self.constructor
    }

    pub fn fallback(&self) -> Option<&Fallback> {
        self.fallback.as_ref()
    }

    pub fn receive(&self) -> Option<&Receive> {
        self.receive.as_ref()
    }

    pub fn methods(&self) -> &NamedMap<Method> {
        &self.methods
    }

    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.get(name)
    }

    /// Finds the method targeted by `calldata` from its leading selector.
    pub fn method_by_selector(&self, calldata: &[u8]) -> Option<&Method> {
        let selector = calldata.get(..4)?;
        self.methods.values().find(|m| m.selector() == selector)
    }

    pub fn events(&self) -> &NamedMap<Event> {
        &self.events
    }

    pub fn event(&self, name: &str) -> Option<&Event> {
        self.events.get(name)
    }

    /// Declared errors together with the built-in `Panic` and `Error`.
    pub fn errors(&self) -> &NamedMap<ContractError> {
        &self.errors
    }

    pub fn error(&self, name: &str) -> Option<&ContractError> {
        self.errors.get(name)
    }

    /// Matches revert data against the known errors and decodes its fields.
    pub fn resolve_error(&self, data: &[u8]) -> Result<(&ContractError, NamedMap<Token>)> {
        if data.len() < 4 {
            return Err(AbiError::RevertDataTooShort(data.len()));
        }
        let (head, body) = data.split_at(4);
        let mut selector = [0u8; 4];
        selector.copy_from_slice(head);

        let error = self
            .error_index
            .get(&selector)
            .and_then(|name| self.errors.get(name))
            .ok_or(AbiError::UnknownError { selector })?;
        let fields = error.decode_fields(body)?;
        Ok((error, fields))
    }
}

impl fmt::Display for ContractAbi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{{")?;
        writeln!(f, "    {}", self.constructor)?;
        if let Some(fallback) = &self.fallback {
            writeln!(f, "    fallback(){}", if fallback.payable { " payable" } else { "" })?;
        }
        if let Some(receive) = &self.receive {
            writeln!(f, "    receive(){}", if receive.payable { " payable" } else { "" })?;
        }
        for method in self.methods.values() {
            writeln!(f, "    {method}")?;
        }
        for event in self.events.values() {
            writeln!(f, "    {event}")?;
        }
        for (name, error) in &self.errors {
            if !BUILTIN_ERRORS.contains(&name) {
                writeln!(f, "    {error}")?;
            }
        }
        write!(f, "}}")
    }
}
