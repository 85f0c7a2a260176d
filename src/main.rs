use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use ethers::types::H256;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::debug;

use sol_interface::{ContractAbi, LogEntry, LogValue, NamedMap, Returned, Token};

#[derive(Parser)]
#[command(name = "abi-inspect")]
#[command(about = "Inspect a Solidity contract ABI and decode calldata, logs and revert data")]
#[command(version)]
struct Cli {
    /// Path to a JSON ABI array or a Foundry build artifact
    #[arg(short, long)]
    abi: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List methods, events and errors with their selectors and topics
    Summary,
    /// Resolve revert data against the declared and built-in errors
    DecodeError {
        /// Hex-encoded revert data
        data: String,
    },
    /// Decode a log entry of one of the declared events
    DecodeLog {
        /// Log topics in order, hex-encoded
        #[arg(short, long = "topic")]
        topics: Vec<String>,
        /// Hex-encoded log data
        #[arg(short, long, default_value = "")]
        data: String,
    },
    /// Decode calldata of one of the declared methods
    DecodeCall {
        /// Hex-encoded calldata
        data: String,
        /// Also decode this hex-encoded return data
        #[arg(short, long)]
        output: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .init();

    let abi = load_abi(Path::new(&cli.abi))?;

    match cli.command {
        Command::Summary => print_summary(&abi),
        Command::DecodeError { data } => decode_error(&abi, &data),
        Command::DecodeLog { topics, data } => decode_log(&abi, &topics, &data),
        Command::DecodeCall { data, output } => decode_call(&abi, &data, output.as_deref()),
    }
}

fn load_abi(path: &Path) -> Result<ContractAbi> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let json: Value = serde_json::from_str(&content)
        .context("Failed to parse ABI file as JSON")?;

    // Foundry artifacts wrap the ABI array in an object
    let abi_value = match json {
        Value::Array(_) => json,
        Value::Object(mut artifact) => {
            debug!("Reading `abi` from build artifact {}", path.display());
            artifact
                .remove("abi")
                .context("ABI not found in artifact")?
        }
        _ => bail!("Expected a JSON ABI array or a build artifact object"),
    };

    ContractAbi::from_value(abi_value).context("Failed to build contract ABI")
}

fn parse_hex(input: &str) -> Result<Vec<u8>> {
    let trimmed = input.trim();
    hex::decode(trimmed.strip_prefix("0x").unwrap_or(trimmed))
        .with_context(|| format!("Invalid hex: {}", input))
}

fn parse_topic(input: &str) -> Result<H256> {
    let bytes = parse_hex(input)?;
    if bytes.len() != 32 {
        bail!("Topic must be 32 bytes, got {}", bytes.len());
    }
    Ok(H256::from_slice(&bytes))
}

fn print_summary(abi: &ContractAbi) -> Result<()> {
    println!("{}", "Constructor".bold());
    println!("  {}", abi.constructor());
    if let Some(fallback) = abi.fallback() {
        println!("  fallback(){}", if fallback.payable { " payable" } else { "" });
    }
    if let Some(receive) = abi.receive() {
        println!("  receive(){}", if receive.payable { " payable" } else { "" });
    }

    println!("\n{} ({})", "Methods".bold(), abi.methods().len());
    for method in abi.methods().values() {
        println!("  {}  {}", hex::encode(method.selector()).cyan(), method);
    }

    println!("\n{} ({})", "Events".bold(), abi.events().len());
    for event in abi.events().values() {
        if event.anonymous() {
            println!("  {}  {}", "anonymous".yellow(), event);
        } else {
            println!("  {}  {}", format!("{:?}", event.topic_signature()).cyan(), event);
        }
    }

    println!("\n{} ({})", "Errors".bold(), abi.errors().len());
    for error in abi.errors().values() {
        println!("  {}  {}", hex::encode(error.selector()).cyan(), error);
    }
    Ok(())
}

fn decode_error(abi: &ContractAbi, data: &str) -> Result<()> {
    let data = parse_hex(data)?;
    let (error, fields) = abi.resolve_error(&data).context("Failed to resolve revert data")?;
    println!("{} {}", "✔".green(), error.canonical_signature().bold());
    print_tokens(&fields);
    Ok(())
}

fn decode_log(abi: &ContractAbi, topics: &[String], data: &str) -> Result<()> {
    let log = LogEntry {
        topics: topics.iter().map(|t| parse_topic(t)).collect::<Result<_>>()?,
        data: parse_hex(data)?,
    };

    // named events are matched by their signature topic, anonymous ones by trying each
    let first = log.topics.first().copied();
    let named = abi
        .events()
        .values()
        .find(|event| !event.anonymous() && Some(event.topic_signature()) == first);
    let candidates: Vec<_> = match named {
        Some(event) => vec![event],
        None => abi.events().values().filter(|event| event.anonymous()).collect(),
    };

    for event in candidates {
        match event.decode(&log) {
            Ok(values) => {
                println!("{} {}", "✔".green(), event.canonical_signature().bold());
                print_log_values(&values);
                return Ok(());
            }
            Err(e) => debug!("{} does not match: {}", event.name(), e),
        }
    }
    Err(anyhow!("No declared event matches the log"))
}

fn decode_call(abi: &ContractAbi, data: &str, output: Option<&str>) -> Result<()> {
    let calldata = parse_hex(data)?;
    let method = abi
        .method_by_selector(&calldata)
        .ok_or_else(|| anyhow!("No declared method matches calldata selector"))?;
    let inputs = method.decode_input(&calldata).context("Failed to decode calldata")?;

    println!("{} {}", "✔".green(), method.canonical_signature().bold());
    print_tokens(&inputs);

    if let Some(output) = output {
        let returned = method
            .decode_output(&parse_hex(output)?)
            .context("Failed to decode return data")?;
        println!("{}", "returns".bold());
        match returned {
            Returned::Single(token) => println!("  {}", format_token(&token)),
            Returned::Tuple(tokens) => {
                for (i, token) in tokens.iter().enumerate() {
                    println!("  {} = {}", i, format_token(token));
                }
            }
            Returned::Named(values) => print_tokens(&values),
        }
    }
    Ok(())
}

fn print_tokens(values: &NamedMap<Token>) {
    for (name, token) in values {
        println!("  {} = {}", name.cyan(), format_token(token));
    }
}

fn print_log_values(values: &NamedMap<LogValue>) {
    for (name, value) in values {
        match value {
            LogValue::Token(token) => println!("  {} = {}", name.cyan(), format_token(token)),
            LogValue::Hashed(hash) => println!("  {} = {} {:?}", name.cyan(), "hash".yellow(), hash),
        }
    }
}

fn format_token(token: &Token) -> String {
    match token {
        Token::Address(address) => format!("{:?}", address),
        Token::Bytes(bytes) | Token::FixedBytes(bytes) => format!("0x{}", hex::encode(bytes)),
        Token::Uint(value) => value.to_string(),
        Token::Int(value) => ethers::types::I256::from_raw(*value).to_string(),
        Token::Bool(value) => value.to_string(),
        Token::String(value) => format!("{:?}", value),
        Token::Array(items) | Token::FixedArray(items) => {
            format!("[{}]", items.iter().map(format_token).collect::<Vec<_>>().join(", "))
        }
        Token::Tuple(items) => {
            format!("({})", items.iter().map(format_token).collect::<Vec<_>>().join(", "))
        }
    }
}
