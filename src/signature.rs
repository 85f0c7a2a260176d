//! Parameter lists and argument binding.

use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;

use ethers::abi::{ParamType, Token};

use crate::codec;
use crate::error::{BindingError, Result, ValidationError};
use crate::named::NamedMap;

/// Call arguments: positional values fill parameters left to right, named
/// values fill them by name.
#[derive(Debug, Clone, PartialEq)]
pub struct Args<T = Token> {
    positional: Vec<T>,
    named: Vec<(String, T)>,
}

impl<T> Args<T> {
    pub fn new() -> Self {
        Self { positional: Vec::new(), named: Vec::new() }
    }

    pub fn positional<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<T>,
    {
        Self { positional: values.into_iter().map(Into::into).collect(), named: Vec::new() }
    }

    pub fn arg(mut self, value: impl Into<T>) -> Self {
        self.positional.push(value.into());
        self
    }

    pub fn named(mut self, name: impl Into<String>, value: impl Into<T>) -> Self {
        self.named.push((name.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }
}

impl<T> Default for Args<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vec<Token>> for Args<Token> {
    fn from(values: Vec<Token>) -> Self {
        Self { positional: values, named: Vec::new() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: Option<String>,
    pub kind: ParamType,
}

impl Param {
    /// Name used in diagnostics and as the key of decoded values; anonymous
    /// parameters are labelled by position.
    fn label(&self, position: usize) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => position.to_string(),
        }
    }
}

/// An ordered list of parameters, either all named or all positional.
#[derive(Debug, Clone)]
pub struct Signature {
    params: Vec<Param>,
    named: bool,
    canonical: OnceLock<String>,
}

impl Signature {
    pub fn empty() -> Self {
        Self::positional(Vec::new())
    }

    pub fn positional(kinds: impl IntoIterator<Item = ParamType>) -> Self {
        Self {
            params: kinds.into_iter().map(|kind| Param { name: None, kind }).collect(),
            named: false,
            canonical: OnceLock::new(),
        }
    }

    pub fn named<S: Into<String>>(params: impl IntoIterator<Item = (S, ParamType)>) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut list = Vec::new();
        for (name, kind) in params {
            let name = name.into();
            if name.is_empty() {
                return Err(ValidationError::MixedNaming.into());
            }
            if !seen.insert(name.clone()) {
                return Err(ValidationError::DuplicateParameter(name).into());
            }
            list.push(Param { name: Some(name), kind });
        }
        Ok(Self { params: list, named: true, canonical: OnceLock::new() })
    }

    pub(crate) fn from_param(param: Param) -> Self {
        let named = param.name.is_some();
        Self { params: vec![param], named, canonical: OnceLock::new() }
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn kinds(&self) -> Vec<ParamType> {
        self.params.iter().map(|p| p.kind.clone()).collect()
    }

    pub fn is_named(&self) -> bool {
        self.named
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// `(type1,type2,...)`, the form hashed into selectors and topics.
    pub fn canonical_form(&self) -> &str {
        self.canonical.get_or_init(|| {
            let names: Vec<String> = self.params.iter().map(|p| codec::canonical_name(&p.kind)).collect();
            format!("({})", names.join(","))
        })
    }

    /// Binds every parameter; unbound parameters are an error.
    pub fn bind<'a, T>(&self, args: &'a Args<T>) -> Result<Vec<&'a T>, BindingError> {
        if !self.named && args.named.is_empty() && args.positional.len() < self.params.len() {
            return Err(BindingError::WrongCount {
                expected: self.params.len(),
                got: args.positional.len(),
            });
        }
        self.bind_partial(args)?
            .into_iter()
            .enumerate()
            .map(|(i, slot)| slot.ok_or_else(|| BindingError::Missing(self.params[i].label(i))))
            .collect()
    }

    /// Binds the supplied arguments, leaving the other parameters unbound.
    pub fn bind_partial<'a, T>(&self, args: &'a Args<T>) -> Result<Vec<Option<&'a T>>, BindingError> {
        if args.positional.len() > self.params.len() {
            return Err(BindingError::TooManyPositional {
                expected: self.params.len(),
                got: args.positional.len(),
            });
        }

        let mut slots: Vec<Option<&T>> = vec![None; self.params.len()];
        for (slot, value) in slots.iter_mut().zip(&args.positional) {
            *slot = Some(value);
        }

        for (name, value) in &args.named {
            if !self.named {
                return Err(BindingError::NamedOnPositional(name.clone()));
            }
            let position = self
                .params
                .iter()
                .position(|p| p.name.as_deref() == Some(name.as_str()))
                .ok_or_else(|| BindingError::UnexpectedNamed(name.clone()))?;
            if slots[position].is_some() {
                return Err(BindingError::MultipleValues(name.clone()));
            }
            slots[position] = Some(value);
        }

        Ok(slots)
    }

    /// Binds `args` and encodes them as a tuple in declaration order.
    pub fn encode(&self, args: &Args<Token>) -> Result<Vec<u8>> {
        let bound = self.bind(args)?;
        let mut tokens = Vec::with_capacity(bound.len());
        for (i, (param, token)) in self.params.iter().zip(bound).enumerate() {
            if !codec::type_check(token, &param.kind) {
                return Err(BindingError::TypeMismatch {
                    name: param.label(i),
                    expected: codec::canonical_name(&param.kind),
                }
                .into());
            }
            tokens.push(token.clone());
        }
        Ok(codec::encode_tuple(&tokens))
    }

    pub fn decode(&self, data: &[u8]) -> Result<Vec<Token>> {
        codec::decode_tuple(&self.kinds(), data)
    }

    /// Decodes into values keyed by parameter name (or position, for
    /// anonymous parameters).
    pub fn decode_to_named(&self, data: &[u8]) -> Result<NamedMap<Token>> {
        let tokens = self.decode(data)?;
        let mut values = NamedMap::new();
        for (i, (param, token)) in self.params.iter().zip(tokens).enumerate() {
            // labels are unique: names were checked at construction, positions are distinct
            let _ = values.insert(param.label(i), token);
        }
        Ok(values)
    }
}

impl PartialEq for Signature {
    fn eq(&self, other: &Self) -> bool {
        self.named == other.named && self.params == other.params
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, param) in self.params.iter().enumerate() {
            if i != 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", param.kind)?;
            if let Some(name) = &param.name {
                write!(f, " {name}")?;
            }
        }
        f.write_str(")")
    }
}
