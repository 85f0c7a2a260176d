use std::fmt;
use std::sync::OnceLock;

use ethers::abi::ParamType;
use ethers::types::H256;
use tracing::trace;

use crate::codec;
use crate::declaration::{Declaration, DeclarationKind};
use crate::error::{AbiError, Result, ValidationError};
use crate::event_signature::EventSignature;
use crate::named::NamedMap;
use crate::signature::Args;
use crate::types::{EventFilter, FilterArg, LogEntry, LogValue};

/// Indexed field cap for events that carry a signature topic.
pub const MAX_INDEXED: usize = 3;
/// Anonymous events free up the signature topic for one more field.
pub const MAX_INDEXED_ANONYMOUS: usize = 4;

#[derive(Debug, Clone)]
pub struct Event {
    name: String,
    signature: EventSignature,
    anonymous: bool,
    topic: OnceLock<H256>,
}

impl Event {
    pub fn new<S, I>(
        name: impl Into<String>,
        fields: impl IntoIterator<Item = (S, ParamType)>,
        indexed: I,
        anonymous: bool,
    ) -> Result<Self>
    where
        S: Into<String>,
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let name = name.into();
        if name.is_empty() {
            return Err(ValidationError::MissingName("event").into());
        }
        let signature = EventSignature::new(fields, indexed)?;

        let max = if anonymous { MAX_INDEXED_ANONYMOUS } else { MAX_INDEXED };
        if signature.indexed_count() > max {
            return Err(ValidationError::TooManyIndexed {
                event: name,
                count: signature.indexed_count(),
                max,
            }
            .into());
        }

        Ok(Self { name, signature, anonymous, topic: OnceLock::new() })
    }

    /// Builds an event from a JSON ABI `event` entry.
    ///
    /// Fields declared without a name are called `_<position>`.
    pub fn from_declaration(decl: &Declaration) -> Result<Self> {
        decl.expect_kind(DeclarationKind::Event)?;
        let name = decl.required_name("event")?;

        let mut fields = Vec::with_capacity(decl.inputs().len());
        let mut indexed = Vec::new();
        for (i, param) in decl.inputs().iter().enumerate() {
            let field_name = if param.name.is_empty() { format!("_{i}") } else { param.name.clone() };
            if param.is_indexed() {
                indexed.push(field_name.clone());
            }
            fields.push((field_name, param.param_type()?));
        }

        Self::new(name, fields, indexed, decl.anonymous.unwrap_or(false))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &EventSignature {
        &self.signature
    }

    pub fn anonymous(&self) -> bool {
        self.anonymous
    }

    /// `Name(type1,type2,...)`
    pub fn canonical_signature(&self) -> String {
        format!("{}{}", self.name, self.signature.canonical_form())
    }

    /// Hash of the canonical signature; the first topic of every log of a
    /// non-anonymous event.
    pub fn topic_signature(&self) -> H256 {
        *self.topic.get_or_init(|| {
            let topic = codec::signature_hash(&self.name, self.signature.canonical_form());
            trace!(event = %self.name, ?topic, "derived topic signature");
            topic
        })
    }

    /// Filter matching logs of this event whose indexed fields equal the
    /// bound arguments.
    pub fn filter(&self, args: &Args<FilterArg>) -> Result<EventFilter> {
        let field_topics = self.signature.encode_to_topics(args)?;
        let mut topics = Vec::with_capacity(field_topics.len() + 1);
        if !self.anonymous {
            topics.push(Some(vec![self.topic_signature()]));
        }
        topics.extend(field_topics);
        Ok(EventFilter::new(topics))
    }

    /// Topic counts in errors cover the whole log, signature topic included.
    pub fn decode(&self, log: &LogEntry) -> Result<NamedMap<LogValue>> {
        let skip = usize::from(!self.anonymous);
        if !self.anonymous {
            if let Some(first) = log.topics.first() {
                let expected = self.topic_signature();
                if *first != expected {
                    return Err(AbiError::MismatchedEvent { expected, got: *first });
                }
            }
        }
        let expected = self.signature.indexed_count() + skip;
        if log.topics.len() != expected {
            return Err(AbiError::TopicCountMismatch { expected, got: log.topics.len() });
        }
        self.signature.decode_log_entry(&log.topics[skip..], &log.data)
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.signature == other.signature && self.anonymous == other.anonymous
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "event {}{}", self.name, self.signature)?;
        if self.anonymous {
            f.write_str(" anonymous")?;
        }
        Ok(())
    }
}
