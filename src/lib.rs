//! Typed object model for Solidity contract ABIs.
//!
//! Parses compiler-emitted JSON ABIs into methods, events and errors, encodes
//! calls and event filters, and decodes return values, logs and revert data.
//! Value-level encoding is delegated to `ethers::abi`.

pub mod artifact;
pub mod codec;
pub mod constructor;
pub mod contract_abi;
pub mod contract_error;
pub mod declaration;
pub mod error;
pub mod event;
pub mod event_signature;
pub mod method;
pub mod named;
pub mod signature;
pub mod types;

pub use artifact::CompiledContract;
pub use constructor::{Constructor, Fallback, Receive};
pub use contract_abi::{AbiBuilder, ContractAbi};
pub use contract_error::ContractError;
pub use declaration::{Declaration, ParamDeclaration};
pub use error::{AbiError, BindingError, Result, ValidationError};
pub use event::Event;
pub use event_signature::{EventField, EventSignature};
pub use method::{Method, Outputs, Returned};
pub use named::NamedMap;
pub use signature::{Args, Param, Signature};
pub use types::{
    ConstructorCall, Either, EventFilter, FilterArg, LogEntry, LogValue, MethodCall, Selector, StateMutability,
};

pub use ethers::abi::{ParamType, Token};
