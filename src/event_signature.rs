//! Event fields split into indexed (topic) and non-indexed (data) parts.

use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;

use ethers::abi::ParamType;
use ethers::types::H256;

use crate::codec;
use crate::error::{AbiError, BindingError, Result, ValidationError};
use crate::named::NamedMap;
use crate::signature::{Args, Signature};
use crate::types::{FilterArg, LogValue};

#[derive(Debug, Clone, PartialEq)]
pub struct EventField {
    pub name: String,
    pub kind: ParamType,
    pub indexed: bool,
}

#[derive(Debug, Clone)]
pub struct EventSignature {
    fields: Vec<EventField>,
    indexed: Signature,
    data: Signature,
    canonical: OnceLock<String>,
}

impl EventSignature {
    /// Builds the signature from all fields in declaration order and the
    /// names of the indexed ones.
    pub fn new<S, I>(fields: impl IntoIterator<Item = (S, ParamType)>, indexed: I) -> Result<Self>
    where
        S: Into<String>,
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let all = Signature::named(fields)?;
        let indexed: HashSet<String> = indexed.into_iter().map(|n| n.as_ref().to_string()).collect();

        if let Some(unknown) = indexed
            .iter()
            .find(|name| !all.params().iter().any(|p| p.name.as_deref() == Some(name.as_str())))
        {
            return Err(ValidationError::UnknownIndexedField(unknown.clone()).into());
        }

        let fields = all
            .params()
            .iter()
            .map(|p| {
                let name = p.name.clone().unwrap_or_default();
                let is_indexed = indexed.contains(&name);
                EventField { name, kind: p.kind.clone(), indexed: is_indexed }
            })
            .collect();
        Ok(Self::from_fields(fields))
    }

    fn from_fields(fields: Vec<EventField>) -> Self {
        let split = |indexed: bool| {
            fields
                .iter()
                .filter(|f| f.indexed == indexed)
                .map(|f| (f.name.clone(), f.kind.clone()))
                .collect::<Vec<_>>()
        };
        // field names are unique, so both halves are valid named signatures
        let indexed = Signature::named(split(true)).unwrap_or_else(|_| Signature::empty());
        let data = Signature::named(split(false)).unwrap_or_else(|_| Signature::empty());
        Self { fields, indexed, data, canonical: OnceLock::new() }
    }

    pub fn fields(&self) -> &[EventField] {
        &self.fields
    }

    pub fn indexed(&self) -> &Signature {
        &self.indexed
    }

    pub fn non_indexed(&self) -> &Signature {
        &self.data
    }

    pub fn indexed_count(&self) -> usize {
        self.indexed.len()
    }

    /// Canonical type list over all fields, indexed or not.
    pub fn canonical_form(&self) -> &str {
        self.canonical.get_or_init(|| {
            let names: Vec<String> = self.fields.iter().map(|f| codec::canonical_name(&f.kind)).collect();
            format!("({})", names.join(","))
        })
    }

    pub fn canonical_form_nonindexed(&self) -> &str {
        self.data.canonical_form()
    }

    /// Topic alternatives for each indexed field, in declaration order.
    ///
    /// Unbound fields are `None`; trailing `None`s are dropped.
    pub fn encode_to_topics(&self, args: &Args<FilterArg>) -> Result<Vec<Option<Vec<H256>>>> {
        let slots = self.indexed.bind_partial(args)?;
        let mut topics = Vec::with_capacity(slots.len());

        for (param, slot) in self.indexed.params().iter().zip(slots) {
            let name = param.name.clone().unwrap_or_default();
            let values = match slot {
                None => None,
                Some(FilterArg::Exact(token)) => Some(vec![topic_of(&name, &param.kind, token)?]),
                Some(FilterArg::Either(either)) => {
                    if either.values().is_empty() {
                        return Err(BindingError::EmptyEither(name).into());
                    }
                    let alternatives = either
                        .values()
                        .iter()
                        .map(|token| topic_of(&name, &param.kind, token))
                        .collect::<Result<Vec<_>>>()?;
                    Some(alternatives)
                }
            };
            topics.push(values);
        }

        while matches!(topics.last(), Some(None)) {
            topics.pop();
        }
        Ok(topics)
    }

    /// Rebuilds the full field mapping from the indexed topics (without the
    /// event signature topic) and the data section.
    pub fn decode_log_entry(&self, topics: &[H256], data: &[u8]) -> Result<NamedMap<LogValue>> {
        if topics.len() != self.indexed.len() {
            return Err(AbiError::TopicCountMismatch { expected: self.indexed.len(), got: topics.len() });
        }

        let mut indexed_values = Vec::with_capacity(topics.len());
        for (param, topic) in self.indexed.params().iter().zip(topics) {
            indexed_values.push(codec::decode_topic(&param.kind, topic)?);
        }
        let data_values = self.data.decode(data)?;

        let mut indexed_values = indexed_values.into_iter();
        let mut data_values = data_values.into_iter();
        let mut decoded = NamedMap::new();
        for field in &self.fields {
            let value = if field.indexed {
                indexed_values.next()
            } else {
                data_values.next().map(LogValue::Token)
            };
            if let Some(value) = value {
                let _ = decoded.insert(field.name.clone(), value);
            }
        }
        Ok(decoded)
    }
}

fn topic_of(name: &str, kind: &ParamType, token: &ethers::abi::Token) -> Result<H256> {
    if !codec::type_check(token, kind) {
        return Err(BindingError::TypeMismatch {
            name: name.to_string(),
            expected: codec::canonical_name(kind),
        }
        .into());
    }
    Ok(codec::encode_topic(kind, token))
}

impl PartialEq for EventSignature {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}

impl fmt::Display for EventSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, field) in self.fields.iter().enumerate() {
            if i != 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", field.kind)?;
            if field.indexed {
                f.write_str(" indexed")?;
            }
            write!(f, " {}", field.name)?;
        }
        f.write_str(")")
    }
}
