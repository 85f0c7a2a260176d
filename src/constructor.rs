use std::fmt;

use ethers::abi::Token;

use crate::declaration::{signature_from_params, Declaration, DeclarationKind};
use crate::error::{Result, ValidationError};
use crate::signature::{Args, Signature};
use crate::types::{ConstructorCall, StateMutability};

/// Constructors, fallbacks and receive handlers may only be `nonpayable` or `payable`.
fn payable_flag(decl: &Declaration, kind: &'static str) -> Result<bool> {
    match decl.state_mutability()? {
        StateMutability::NonPayable => Ok(false),
        StateMutability::Payable => Ok(true),
        mutability => Err(ValidationError::DisallowedMutability { kind, mutability }.into()),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Constructor {
    inputs: Signature,
    payable: bool,
}

impl Constructor {
    pub fn new(inputs: Signature, payable: bool) -> Self {
        Self { inputs, payable }
    }

    pub fn from_declaration(decl: &Declaration) -> Result<Self> {
        decl.expect_kind(DeclarationKind::Constructor)?;
        if decl.has_name() {
            return Err(ValidationError::ForbiddenField { kind: "constructor", field: "a name" }.into());
        }
        if !decl.outputs().is_empty() {
            return Err(ValidationError::ForbiddenField { kind: "constructor", field: "outputs" }.into());
        }
        let payable = payable_flag(decl, "constructor")?;
        let inputs = signature_from_params(decl.inputs())?;
        Ok(Self::new(inputs, payable))
    }

    pub fn inputs(&self) -> &Signature {
        &self.inputs
    }

    pub fn payable(&self) -> bool {
        self.payable
    }

    pub fn call(&self, args: &Args<Token>) -> Result<ConstructorCall> {
        Ok(ConstructorCall::new(self.inputs.encode(args)?))
    }
}

impl Default for Constructor {
    /// The implicit constructor of a contract that declares none.
    fn default() -> Self {
        Self::new(Signature::empty(), false)
    }
}

impl fmt::Display for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "constructor{}", self.inputs)?;
        if self.payable {
            f.write_str(" payable")?;
        }
        Ok(())
    }
}

fn check_bare(decl: &Declaration, kind: &'static str) -> Result<()> {
    if decl.has_name() {
        return Err(ValidationError::ForbiddenField { kind, field: "a name" }.into());
    }
    if !decl.inputs().is_empty() {
        return Err(ValidationError::ForbiddenField { kind, field: "inputs" }.into());
    }
    if !decl.outputs().is_empty() {
        return Err(ValidationError::ForbiddenField { kind, field: "outputs" }.into());
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Fallback {
    pub payable: bool,
}

impl Fallback {
    pub fn from_declaration(decl: &Declaration) -> Result<Self> {
        decl.expect_kind(DeclarationKind::Fallback)?;
        check_bare(decl, "fallback")?;
        Ok(Self { payable: payable_flag(decl, "fallback")? })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Receive {
    pub payable: bool,
}

impl Receive {
    pub fn from_declaration(decl: &Declaration) -> Result<Self> {
        decl.expect_kind(DeclarationKind::Receive)?;
        check_bare(decl, "receive")?;
        Ok(Self { payable: payable_flag(decl, "receive")? })
    }
}
