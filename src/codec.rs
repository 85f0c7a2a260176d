//! Thin layer over the ethabi codec shipped with `ethers`.
//!
//! Tuple encoding and decoding are ethabi's. This module adds the keccak hash,
//! the topic representation of indexed event fields and CREATE2 derivation.

use ethers::abi::{self, ParamType, Token};
use ethers::types::{Address, H256, U256};
use sha3::{Digest, Keccak256};

use crate::error::{Result, ValidationError};
use crate::types::{LogValue, Selector};

pub fn keccak256(data: impl AsRef<[u8]>) -> [u8; 32] {
    Keccak256::digest(data.as_ref()).into()
}

/// Leading 4 bytes of `keccak256(name ++ canonical_form)`.
pub fn selector(name: &str, canonical_form: &str) -> Selector {
    let hash = signature_hash(name, canonical_form);
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&hash.as_bytes()[..4]);
    selector
}

/// `keccak256(name ++ canonical_form)`.
pub fn signature_hash(name: &str, canonical_form: &str) -> H256 {
    let mut hasher = Keccak256::new();
    hasher.update(name.as_bytes());
    hasher.update(canonical_form.as_bytes());
    H256::from(<[u8; 32]>::from(hasher.finalize()))
}

/// Canonical type name used in signature hashing, e.g. `uint256[]` or `(address,bool)`.
pub fn canonical_name(kind: &ParamType) -> String {
    kind.to_string()
}

/// Whether `token` can be encoded as `kind`, including integer widths.
pub fn type_check(token: &Token, kind: &ParamType) -> bool {
    token.type_check(kind) && fits_width(token, kind)
}

// ethabi checks only the variant; a `uint8` must also hold at most 8 bits.
fn fits_width(token: &Token, kind: &ParamType) -> bool {
    match (kind, token) {
        (ParamType::Uint(bits), Token::Uint(value)) => *bits >= 256 || value.bits() <= *bits,
        (ParamType::Int(bits), Token::Int(raw)) => {
            if *bits >= 256 {
                return true;
            }
            if *bits == 0 {
                return false;
            }
            // two's complement: every bit from the sign bit up must match it
            let high = *raw >> (*bits - 1);
            high.is_zero() || high == U256::MAX >> (*bits - 1)
        }
        (ParamType::Array(inner), Token::Array(items)) | (ParamType::FixedArray(inner, _), Token::FixedArray(items)) => {
            items.iter().all(|item| fits_width(item, inner))
        }
        (ParamType::Tuple(kinds), Token::Tuple(items)) => {
            items.iter().zip(kinds).all(|(item, kind)| fits_width(item, kind))
        }
        _ => true,
    }
}

pub fn encode_tuple(tokens: &[Token]) -> Vec<u8> {
    abi::encode(tokens)
}

pub fn decode_tuple(kinds: &[ParamType], data: &[u8]) -> Result<Vec<Token>> {
    Ok(abi::decode(kinds, data)?)
}

/// Whether values of this type are stored in a topic as a hash.
pub fn is_hashed_in_topic(kind: &ParamType) -> bool {
    matches!(
        kind,
        ParamType::String
            | ParamType::Bytes
            | ParamType::Array(_)
            | ParamType::FixedArray(..)
            | ParamType::Tuple(_)
    )
}

/// Topic representation of an indexed value.
///
/// The token must already have been checked against `kind`.
pub fn encode_topic(kind: &ParamType, token: &Token) -> H256 {
    match (kind, token) {
        (ParamType::String, Token::String(s)) => H256::from(keccak256(s.as_bytes())),
        (ParamType::Bytes, Token::Bytes(b)) => H256::from(keccak256(b)),
        _ if is_hashed_in_topic(kind) => {
            let mut packed = Vec::new();
            encode_in_place(token, &mut packed);
            H256::from(keccak256(&packed))
        }
        _ => H256::from_slice(&abi::encode(std::slice::from_ref(token))),
    }
}

/// Best-effort inverse of [`encode_topic`]; hashed types come back as the hash.
pub fn decode_topic(kind: &ParamType, topic: &H256) -> Result<LogValue> {
    if is_hashed_in_topic(kind) {
        return Ok(LogValue::Hashed(*topic));
    }
    let mut tokens = abi::decode(std::slice::from_ref(kind), topic.as_bytes())?;
    match tokens.pop() {
        Some(token) => Ok(LogValue::Token(token)),
        None => Err(abi::Error::InvalidData.into()),
    }
}

// Elements are padded to 32 bytes and concatenated, without offsets or lengths.
fn encode_in_place(token: &Token, out: &mut Vec<u8>) {
    match token {
        Token::String(s) => pad_into(s.as_bytes(), out),
        Token::Bytes(b) => pad_into(b, out),
        Token::Array(items) | Token::FixedArray(items) | Token::Tuple(items) => {
            for item in items {
                encode_in_place(item, out);
            }
        }
        _ => out.extend_from_slice(&abi::encode(std::slice::from_ref(token))),
    }
}

fn pad_into(bytes: &[u8], out: &mut Vec<u8>) {
    out.extend_from_slice(bytes);
    let rem = bytes.len() % 32;
    if rem != 0 {
        out.resize(out.len() + 32 - rem, 0);
    }
}

/// Address of a contract deployed with `CREATE2` from `deployer`.
///
/// `deployer` is the contract executing `CREATE2`, not the transaction sender.
pub fn create2_address(deployer: Address, init_code: &[u8], salt: &[u8]) -> Result<Address> {
    if salt.len() != 32 {
        return Err(ValidationError::InvalidSalt(salt.len()).into());
    }
    let mut preimage = Vec::with_capacity(1 + 20 + 32 + 32);
    preimage.push(0xff);
    preimage.extend_from_slice(deployer.as_bytes());
    preimage.extend_from_slice(salt);
    preimage.extend_from_slice(&keccak256(init_code));
    Ok(Address::from_slice(&keccak256(&preimage)[12..]))
}
