use alloc::{string::String, vec::Vec};

use crate::{OutputMode, ParserError, Record};

/// A record in the shape selected by [`OutputMode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutput {
    /// The structured record.
    Fields(Record),
    /// JSON array text, e.g. `["a","b"]`.
    Text(String),
    /// UTF-8 bytes of the JSON array text.
    Bytes(Vec<u8>),
}

impl RecordOutput {
    /// The structured record, if this output carries one.
    #[must_use]
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Fields(record) => Some(record),
            Self::Text(_) | Self::Bytes(_) => None,
        }
    }

    /// The serialized form, if this output carries one.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Fields(_) => None,
            Self::Text(text) => Some(text.as_bytes()),
            Self::Bytes(bytes) => Some(bytes),
        }
    }
}

/// Puts a freshly emitted record into the shape requested by `mode`.
///
/// # Errors
///
/// Returns [`ParserError::Format`] if JSON serialization fails.
pub fn format_record(mode: OutputMode, record: Record) -> Result<RecordOutput, ParserError> {
    Ok(match mode {
        OutputMode::Fields => RecordOutput::Fields(record),
        OutputMode::Text => RecordOutput::Text(serde_json::to_string(&record)?),
        OutputMode::Bytes => RecordOutput::Bytes(serde_json::to_vec(&record)?),
    })
}
