use std::fmt;
use std::sync::OnceLock;

use ethers::abi::{ParamType, Token};

use crate::codec;
use crate::declaration::{signature_from_params, Declaration, DeclarationKind};
use crate::error::{Result, ValidationError};
use crate::named::NamedMap;
use crate::signature::{Args, Param, Signature};
use crate::types::Selector;

/// A custom error a contract can revert with.
#[derive(Debug, Clone)]
pub struct ContractError {
    name: String,
    fields: Signature,
    selector: OnceLock<Selector>,
}

impl ContractError {
    pub fn new(name: impl Into<String>, fields: Signature) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(ValidationError::MissingName("error").into());
        }
        Ok(Self { name, fields, selector: OnceLock::new() })
    }

    /// `Panic(uint256 code)`, raised by failed assertions, overflows and the like.
    pub fn panic() -> Self {
        Self::builtin("Panic", "code", ParamType::Uint(256))
    }

    /// `Error(string message)`, raised by `require` and `revert` with a reason.
    pub fn legacy() -> Self {
        Self::builtin("Error", "message", ParamType::String)
    }

    fn builtin(name: &str, field: &str, kind: ParamType) -> Self {
        let param = Param { name: Some(field.to_string()), kind };
        Self { name: name.to_string(), fields: Signature::from_param(param), selector: OnceLock::new() }
    }

    pub fn from_declaration(decl: &Declaration) -> Result<Self> {
        decl.expect_kind(DeclarationKind::Error)?;
        let name = decl.required_name("error")?;
        Self::new(name, signature_from_params(decl.inputs())?)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &Signature {
        &self.fields
    }

    /// `Name(type1,type2,...)`
    pub fn canonical_signature(&self) -> String {
        format!("{}{}", self.name, self.fields.canonical_form())
    }

    pub fn selector(&self) -> Selector {
        *self.selector.get_or_init(|| codec::selector(&self.name, self.fields.canonical_form()))
    }

    /// Revert payload: selector followed by the encoded fields.
    pub fn encode(&self, args: &Args<Token>) -> Result<Vec<u8>> {
        let mut data = self.selector().to_vec();
        data.extend(self.fields.encode(args)?);
        Ok(data)
    }

    /// Decodes the payload that follows the selector.
    pub fn decode_fields(&self, data: &[u8]) -> Result<NamedMap<Token>> {
        self.fields.decode_to_named(data)
    }
}

impl PartialEq for ContractError {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.fields == other.fields
    }
}

impl fmt::Display for ContractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error {}{}", self.name, self.fields)
    }
}
