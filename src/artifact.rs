//! Loading compiled contracts from compiler output.
//!
//! Two layouts are understood: the per-contract JSON that `forge build` writes
//! to `out/<File>.sol/<Name>.json`, and the `solc --combined-json bin,abi`
//! document keyed by `<file>:<Name>`.

use std::fs;
use std::path::Path;

use ethers::abi::Token;
use ethers::types::Address;
use serde_json::Value;
use tracing::debug;

use crate::codec;
use crate::contract_abi::ContractAbi;
use crate::error::{AbiError, Result};
use crate::signature::Args;

#[derive(Debug, Clone)]
pub struct CompiledContract {
    pub name: String,
    pub abi: ContractAbi,
    pub bytecode: Vec<u8>,
}

impl CompiledContract {
    pub fn new(name: impl Into<String>, abi: ContractAbi, bytecode: Vec<u8>) -> Self {
        Self { name: name.into(), abi, bytecode }
    }

    /// Parses a Foundry artifact.
    pub fn from_forge_artifact(name: impl Into<String>, artifact: &Value) -> Result<Self> {
        let name = name.into();
        debug!("Loading forge artifact for {}", name);

        // `bytecode.object` in current releases, a bare string in older ones
        let bytecode_hex = artifact
            .get("bytecode")
            .and_then(|v| v.get("object").or(Some(v)))
            .and_then(Value::as_str)
            .ok_or_else(|| missing(&name, "bytecode"))?;
        let abi_value = artifact.get("abi").ok_or_else(|| missing(&name, "abi"))?;

        let abi = ContractAbi::from_value(abi_value.clone())?;
        let bytecode = decode_hex(&name, bytecode_hex)?;
        Ok(Self { name, abi, bytecode })
    }

    /// Picks `<source>:<name>` out of `solc --combined-json bin,abi` output.
    pub fn from_solc_combined(output: &Value, source: &str, name: &str) -> Result<Self> {
        debug!("Loading {}:{} from solc output", source, name);

        let contracts = output
            .get("contracts")
            .ok_or_else(|| AbiError::Artifact("no `contracts` in solc output".into()))?;
        let key = format!("{source}:{name}");
        let contract = contracts
            .get(&key)
            .ok_or_else(|| AbiError::Artifact(format!("contract `{key}` not found in solc output")))?;

        let bytecode_hex = contract.get("bin").and_then(Value::as_str).ok_or_else(|| missing(name, "bin"))?;
        // older solc versions embed the ABI as a JSON string
        let abi = match contract.get("abi") {
            Some(Value::String(json)) => ContractAbi::from_json(json)?,
            Some(value) => ContractAbi::from_value(value.clone())?,
            None => return Err(missing(name, "abi")),
        };
        let bytecode = decode_hex(name, bytecode_hex)?;
        Ok(Self { name: name.to_string(), abi, bytecode })
    }

    /// Reads a Foundry artifact from disk; the contract takes the file stem as its name.
    pub fn from_forge_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| AbiError::Artifact(format!("cannot derive a contract name from {}", path.display())))?;
        let content = fs::read_to_string(path)
            .map_err(|e| AbiError::Artifact(format!("failed to read {}: {e}", path.display())))?;
        let artifact: Value = serde_json::from_str(&content)?;
        Self::from_forge_artifact(name, &artifact)
    }

    /// Creation payload: bytecode followed by the encoded constructor arguments.
    pub fn deploy(&self, args: &Args<Token>) -> Result<Vec<u8>> {
        let call = self.abi.constructor().call(args)?;
        Ok(call.deploy_data(&self.bytecode))
    }

    /// Address the contract lands at when `deployer` creates it through CREATE2.
    pub fn create2_address(&self, deployer: Address, args: &Args<Token>, salt: &[u8]) -> Result<Address> {
        codec::create2_address(deployer, &self.deploy(args)?, salt)
    }
}

fn missing(name: &str, field: &str) -> AbiError {
    AbiError::Artifact(format!("`{field}` not found for contract `{name}`"))
}

fn decode_hex(name: &str, encoded: &str) -> Result<Vec<u8>> {
    hex::decode(encoded.strip_prefix("0x").unwrap_or(encoded))
        .map_err(|e| AbiError::Artifact(format!("bytecode of `{name}` is not valid hex: {e}")))
}
