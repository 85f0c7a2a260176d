use std::fmt;
use std::sync::OnceLock;

use ethers::abi::{ParamType, Token};
use tracing::trace;

use crate::codec;
use crate::declaration::{signature_from_params, Declaration, DeclarationKind};
use crate::error::{AbiError, Result, ValidationError};
use crate::named::NamedMap;
use crate::signature::{Args, Signature};
use crate::types::{MethodCall, Selector, StateMutability};

/// Declared return shape of a method.
#[derive(Debug, Clone, PartialEq)]
pub enum Outputs {
    /// A single bare type; decoded results are unwrapped from the one-tuple.
    Single(ParamType),
    Positional(Vec<ParamType>),
    Named(Vec<(String, ParamType)>),
}

/// Decoded return value of a method call.
#[derive(Debug, Clone, PartialEq)]
pub enum Returned {
    Single(Token),
    Tuple(Vec<Token>),
    Named(NamedMap<Token>),
}

#[derive(Debug, Clone)]
pub struct Method {
    name: String,
    inputs: Signature,
    outputs: Signature,
    mutability: StateMutability,
    single_output: bool,
    selector: OnceLock<Selector>,
}

impl Method {
    pub fn new(
        name: impl Into<String>,
        mutability: StateMutability,
        inputs: Signature,
        outputs: Outputs,
    ) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(ValidationError::MissingName("function").into());
        }
        let (outputs, single_output) = match outputs {
            Outputs::Single(kind) => (Signature::positional([kind]), true),
            Outputs::Positional(kinds) => (Signature::positional(kinds), false),
            Outputs::Named(params) => (Signature::named(params)?, false),
        };
        Ok(Self { name, inputs, outputs, mutability, single_output, selector: OnceLock::new() })
    }

    /// Builds a method from a JSON ABI `function` entry.
    ///
    /// A single anonymous output is unwrapped like [`Outputs::Single`].
    pub fn from_declaration(decl: &Declaration) -> Result<Self> {
        decl.expect_kind(DeclarationKind::Function)?;
        let name = decl.required_name("function")?;
        let mutability = decl.state_mutability()?;
        let inputs = signature_from_params(decl.inputs())?;
        let outputs = signature_from_params(decl.outputs())?;
        let single_output = matches!(decl.outputs(), [only] if only.name.is_empty());
        Ok(Self {
            name: name.to_string(),
            inputs,
            outputs,
            mutability,
            single_output,
            selector: OnceLock::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inputs(&self) -> &Signature {
        &self.inputs
    }

    pub fn outputs(&self) -> &Signature {
        &self.outputs
    }

    pub fn mutability(&self) -> StateMutability {
        self.mutability
    }

    pub fn payable(&self) -> bool {
        self.mutability.is_payable()
    }

    pub fn mutating(&self) -> bool {
        self.mutability.is_mutating()
    }

    /// `name(type1,type2,...)`
    pub fn canonical_signature(&self) -> String {
        format!("{}{}", self.name, self.inputs.canonical_form())
    }

    pub fn selector(&self) -> Selector {
        *self.selector.get_or_init(|| {
            let selector = codec::selector(&self.name, self.inputs.canonical_form());
            trace!(method = %self.name, selector = %hex::encode(selector), "derived selector");
            selector
        })
    }

    pub fn call(&self, args: &Args<Token>) -> Result<MethodCall> {
        let input = self.inputs.encode(args)?;
        let mut data = Vec::with_capacity(4 + input.len());
        data.extend_from_slice(&self.selector());
        data.extend_from_slice(&input);
        Ok(MethodCall::new(data))
    }

    /// Decodes calldata produced by [`Method::call`] back into its arguments.
    pub fn decode_input(&self, calldata: &[u8]) -> Result<NamedMap<Token>> {
        if calldata.len() < 4 || calldata[..4] != self.selector() {
            let mut selector = [0u8; 4];
            let len = calldata.len().min(4);
            selector[..len].copy_from_slice(&calldata[..len]);
            return Err(AbiError::SelectorMismatch { method: self.canonical_signature(), selector });
        }
        self.inputs.decode_to_named(&calldata[4..])
    }

    pub fn decode_output(&self, data: &[u8]) -> Result<Returned> {
        if self.single_output {
            let mut tokens = self.outputs.decode(data)?;
            return match tokens.pop() {
                Some(token) => Ok(Returned::Single(token)),
                None => Err(ethers::abi::Error::InvalidData.into()),
            };
        }
        if self.outputs.is_named() {
            Ok(Returned::Named(self.outputs.decode_to_named(data)?))
        } else {
            Ok(Returned::Tuple(self.outputs.decode(data)?))
        }
    }
}

impl PartialEq for Method {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.inputs == other.inputs
            && self.outputs == other.outputs
            && self.mutability == other.mutability
            && self.single_output == other.single_output
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "function {}{} {}", self.name, self.inputs, self.mutability)?;
        if self.single_output {
            write!(f, " returns {}", self.outputs.params()[0].kind)?;
        } else if !self.outputs.is_empty() {
            write!(f, " returns {}", self.outputs)?;
        }
        Ok(())
    }
}
