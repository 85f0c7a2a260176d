//! Serde model of compiler-emitted JSON ABI entries.

use ethers::abi::param_type::Reader;
use ethers::abi::ParamType;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Result, ValidationError};
use crate::signature::Signature;
use crate::types::StateMutability;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
    Constructor,
    Function,
    Fallback,
    Receive,
    Event,
    Error,
}

impl DeclarationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeclarationKind::Constructor => "constructor",
            DeclarationKind::Function => "function",
            DeclarationKind::Fallback => "fallback",
            DeclarationKind::Receive => "receive",
            DeclarationKind::Event => "event",
            DeclarationKind::Error => "error",
        }
    }
}

/// One entry of a JSON ABI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Declaration {
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<Vec<ParamDeclaration>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Vec<ParamDeclaration>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_mutability: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anonymous: Option<bool>,
    // pre-0.5 compilers emit these instead of `stateMutability`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constant: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payable: Option<bool>,
}

fn default_kind() -> String {
    "function".to_string()
}

/// A parameter of a function, constructor, event or error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParamDeclaration {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<ParamDeclaration>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_type: Option<String>,
}

impl Declaration {
    pub fn kind(&self) -> Result<DeclarationKind> {
        match self.kind.as_str() {
            "constructor" => Ok(DeclarationKind::Constructor),
            "function" => Ok(DeclarationKind::Function),
            "fallback" => Ok(DeclarationKind::Fallback),
            "receive" => Ok(DeclarationKind::Receive),
            "event" => Ok(DeclarationKind::Event),
            "error" => Ok(DeclarationKind::Error),
            other => Err(ValidationError::UnknownKind(other.to_string()).into()),
        }
    }

    pub(crate) fn expect_kind(&self, expected: DeclarationKind) -> Result<()> {
        if self.kind()? != expected {
            return Err(ValidationError::WrongKind { expected: expected.as_str(), found: self.kind.clone() }.into());
        }
        Ok(())
    }

    pub fn state_mutability(&self) -> Result<StateMutability> {
        if let Some(value) = &self.state_mutability {
            return value.parse();
        }
        let mutability = match (self.payable, self.constant) {
            (Some(true), _) => StateMutability::Payable,
            (_, Some(true)) => StateMutability::View,
            _ => StateMutability::NonPayable,
        };
        warn!(
            "ABI entry {:?} has no `stateMutability`, assuming `{}`",
            self.name.as_deref().unwrap_or(&self.kind),
            mutability
        );
        Ok(mutability)
    }

    pub fn inputs(&self) -> &[ParamDeclaration] {
        self.inputs.as_deref().unwrap_or_default()
    }

    pub fn outputs(&self) -> &[ParamDeclaration] {
        self.outputs.as_deref().unwrap_or_default()
    }

    pub(crate) fn has_name(&self) -> bool {
        self.name.is_some()
    }

    pub(crate) fn required_name(&self, entity: &'static str) -> Result<&str> {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => Ok(name),
            _ => Err(ValidationError::MissingName(entity).into()),
        }
    }
}

impl ParamDeclaration {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self { name: name.into(), kind: kind.into(), ..Default::default() }
    }

    pub fn is_indexed(&self) -> bool {
        self.indexed.unwrap_or(false)
    }

    /// Resolves the declared type, building tuples from `components`.
    pub fn param_type(&self) -> Result<ParamType> {
        let Some(suffix) = self.kind.strip_prefix("tuple") else {
            return Reader::read(&self.kind)
                .ok()
                .filter(has_valid_widths)
                .ok_or_else(|| ValidationError::UnknownType(self.kind.clone()).into());
        };
        let components = self
            .components
            .as_ref()
            .ok_or_else(|| ValidationError::MissingComponents(self.name.clone()))?;
        let inner = ParamType::Tuple(components.iter().map(|c| c.param_type()).collect::<Result<_>>()?);
        wrap_array_suffix(inner, suffix).ok_or_else(|| ValidationError::UnknownType(self.kind.clone()).into())
    }
}

// The type reader accepts any width, e.g. `uint7` or `bytes33`.
fn has_valid_widths(kind: &ParamType) -> bool {
    match kind {
        ParamType::Uint(bits) | ParamType::Int(bits) => (8..=256).contains(bits) && bits % 8 == 0,
        ParamType::FixedBytes(size) => (1..=32).contains(size),
        ParamType::Array(inner) | ParamType::FixedArray(inner, _) => has_valid_widths(inner),
        ParamType::Tuple(kinds) => kinds.iter().all(has_valid_widths),
        _ => true,
    }
}

// `suffix` is a run of `[]` / `[N]` groups, applied left to right.
fn wrap_array_suffix(mut kind: ParamType, mut suffix: &str) -> Option<ParamType> {
    while !suffix.is_empty() {
        let rest = suffix.strip_prefix('[')?;
        let end = rest.find(']')?;
        let size = &rest[..end];
        kind = if size.is_empty() {
            ParamType::Array(Box::new(kind))
        } else {
            ParamType::FixedArray(Box::new(kind), size.parse().ok()?)
        };
        suffix = &rest[end + 1..];
    }
    Some(kind)
}

/// Builds a signature from declared parameters: all anonymous gives a
/// positional signature, all named gives a named one, mixed is rejected.
pub fn signature_from_params(params: &[ParamDeclaration]) -> Result<Signature> {
    let named = params.iter().filter(|p| !p.name.is_empty()).count();
    if named == 0 {
        let kinds = params.iter().map(|p| p.param_type()).collect::<Result<Vec<_>>>()?;
        return Ok(Signature::positional(kinds));
    }
    if named != params.len() {
        return Err(ValidationError::MixedNaming.into());
    }
    let typed = params
        .iter()
        .map(|p| Ok((p.name.clone(), p.param_type()?)))
        .collect::<Result<Vec<_>>>()?;
    Signature::named(typed)
}
