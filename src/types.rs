// type definitions
use std::fmt;
use std::str::FromStr;

use ethers::abi::Token;
use ethers::types::H256;
use serde::{Deserialize, Serialize};

use crate::error::AbiError;

/// First 4 bytes of the keccak hash of a function or error signature.
pub type Selector = [u8; 4];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateMutability {
    Pure,
    View,
    NonPayable,
    Payable,
}

impl StateMutability {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateMutability::Pure => "pure",
            StateMutability::View => "view",
            StateMutability::NonPayable => "nonpayable",
            StateMutability::Payable => "payable",
        }
    }

    pub fn is_payable(&self) -> bool {
        *self == StateMutability::Payable
    }

    /// Whether a call may modify chain state.
    pub fn is_mutating(&self) -> bool {
        matches!(self, StateMutability::NonPayable | StateMutability::Payable)
    }
}

impl FromStr for StateMutability {
    type Err = AbiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pure" => Ok(StateMutability::Pure),
            "view" => Ok(StateMutability::View),
            "nonpayable" => Ok(StateMutability::NonPayable),
            "payable" => Ok(StateMutability::Payable),
            other => Err(AbiError::UnknownMutability(other.to_string())),
        }
    }
}

impl fmt::Display for StateMutability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Encoded constructor arguments, without the contract bytecode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructorCall {
    input_bytes: Vec<u8>,
}

impl ConstructorCall {
    pub(crate) fn new(input_bytes: Vec<u8>) -> Self {
        Self { input_bytes }
    }

    pub fn input_bytes(&self) -> &[u8] {
        &self.input_bytes
    }

    /// Contract creation payload: the bytecode followed by the encoded arguments.
    pub fn deploy_data(&self, bytecode: &[u8]) -> Vec<u8> {
        let mut data = Vec::with_capacity(bytecode.len() + self.input_bytes.len());
        data.extend_from_slice(bytecode);
        data.extend_from_slice(&self.input_bytes);
        data
    }
}

/// Encoded method call: selector followed by the encoded arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodCall {
    data_bytes: Vec<u8>,
}

impl MethodCall {
    pub(crate) fn new(data_bytes: Vec<u8>) -> Self {
        Self { data_bytes }
    }

    pub fn data_bytes(&self) -> &[u8] {
        &self.data_bytes
    }

    pub fn selector(&self) -> Selector {
        let mut selector = [0u8; 4];
        selector.copy_from_slice(&self.data_bytes[..4]);
        selector
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data_bytes
    }
}

/// Candidate values for one indexed event field; a log matches if the field
/// equals any of them.
#[derive(Debug, Clone, PartialEq)]
pub struct Either(Vec<Token>);

impl Either {
    pub fn new(values: impl IntoIterator<Item = Token>) -> Self {
        Self(values.into_iter().collect())
    }

    pub fn values(&self) -> &[Token] {
        &self.0
    }
}

/// A value bound to an indexed field when building an event filter.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterArg {
    Exact(Token),
    Either(Either),
}

impl From<Token> for FilterArg {
    fn from(token: Token) -> Self {
        FilterArg::Exact(token)
    }
}

impl From<Either> for FilterArg {
    fn from(either: Either) -> Self {
        FilterArg::Either(either)
    }
}

/// Topic filter for a log query.
///
/// Each position holds the accepted topic values, or `None` for "anything".
/// Trailing `None`s are never present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EventFilter {
    topics: Vec<Option<Vec<H256>>>,
}

impl EventFilter {
    pub(crate) fn new(mut topics: Vec<Option<Vec<H256>>>) -> Self {
        while matches!(topics.last(), Some(None)) {
            topics.pop();
        }
        Self { topics }
    }

    pub fn topics(&self) -> &[Option<Vec<H256>>] {
        &self.topics
    }
}

/// The part of a log record needed to decode an event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogEntry {
    pub topics: Vec<H256>,
    pub data: Vec<u8>,
}

/// A decoded event field.
///
/// Indexed fields of reference types (strings, bytes, arrays, tuples) are
/// stored in the log as a hash of their value, which cannot be inverted.
#[derive(Debug, Clone, PartialEq)]
pub enum LogValue {
    Token(Token),
    Hashed(H256),
}

impl LogValue {
    pub fn as_token(&self) -> Option<&Token> {
        match self {
            LogValue::Token(token) => Some(token),
            LogValue::Hashed(_) => None,
        }
    }

    pub fn into_token(self) -> Option<Token> {
        match self {
            LogValue::Token(token) => Some(token),
            LogValue::Hashed(_) => None,
        }
    }
}

impl fmt::Display for LogValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogValue::Token(token) => write!(f, "{token}"),
            LogValue::Hashed(hash) => write!(f, "hash {hash:?}"),
        }
    }
}
