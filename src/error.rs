//! Error taxonomy for ABI assembly, argument binding and decoding.

use ethers::types::H256;
use thiserror::Error;

use crate::types::{Selector, StateMutability};

pub type Result<T, E = AbiError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum AbiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Binding(#[from] BindingError),

    #[error("unknown state mutability `{0}`")]
    UnknownMutability(String),

    #[error("duplicate {kind} declaration `{name}`")]
    DuplicateDeclaration { kind: &'static str, name: String },

    #[error("failed to decode ABI data: {0}")]
    Decode(#[from] ethers::abi::Error),

    #[error("expected {expected} topics, got {got}")]
    TopicCountMismatch { expected: usize, got: usize },

    #[error("log entry belongs to another event: expected topic {expected:?}, got {got:?}")]
    MismatchedEvent { expected: H256, got: H256 },

    #[error("revert data must hold at least a 4-byte selector, got {0} bytes")]
    RevertDataTooShort(usize),

    #[error("no known error with selector 0x{}", hex::encode(.selector))]
    UnknownError { selector: Selector },

    #[error("calldata selector 0x{} does not belong to `{method}`", hex::encode(.selector))]
    SelectorMismatch { method: String, selector: Selector },

    #[error("invalid JSON ABI: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid compiler artifact: {0}")]
    Artifact(String),
}

/// A declaration that breaks a structural or cardinality rule.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("expected a `{expected}` entry, got `{found}`")]
    WrongKind { expected: &'static str, found: String },

    #[error("unknown ABI entry type `{0}`")]
    UnknownKind(String),

    #[error("{kind} declarations cannot have {field}")]
    ForbiddenField { kind: &'static str, field: &'static str },

    #[error("{kind} cannot be `{mutability}`")]
    DisallowedMutability { kind: &'static str, mutability: StateMutability },

    #[error("{0} declaration is missing a name")]
    MissingName(&'static str),

    #[error("parameter `{0}` is declared more than once")]
    DuplicateParameter(String),

    #[error("parameters must be either all named or all anonymous")]
    MixedNaming,

    #[error("event `{event}` declares {count} indexed fields, at most {max} allowed")]
    TooManyIndexed { event: String, count: usize, max: usize },

    #[error("indexed field `{0}` is not a field of the event")]
    UnknownIndexedField(String),

    #[error("unsupported parameter type `{0}`")]
    UnknownType(String),

    #[error("tuple parameter `{0}` has no components")]
    MissingComponents(String),

    #[error("selector 0x{} is shared by `{first}` and `{second}`", hex::encode(.selector))]
    SelectorCollision { selector: Selector, first: String, second: String },

    #[error("CREATE2 salt must be 32 bytes, got {0}")]
    InvalidSalt(usize),
}

/// Supplied arguments do not fit a signature's parameter list.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BindingError {
    #[error("too many positional arguments: expected at most {expected}, got {got}")]
    TooManyPositional { expected: usize, got: usize },

    #[error("expected exactly {expected} positional arguments, got {got}")]
    WrongCount { expected: usize, got: usize },

    #[error("missing a required argument: `{0}`")]
    Missing(String),

    #[error("multiple values for argument `{0}`")]
    MultipleValues(String),

    #[error("unexpected named argument `{0}`")]
    UnexpectedNamed(String),

    #[error("named argument `{0}` given to a signature with anonymous parameters")]
    NamedOnPositional(String),

    #[error("argument `{name}` does not match type `{expected}`")]
    TypeMismatch { name: String, expected: String },

    #[error("`Either` for `{0}` holds no alternatives")]
    EmptyEither(String),
}
