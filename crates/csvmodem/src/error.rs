use alloc::string::String;

use thiserror::Error;

/// Errors surfaced by a parse session.
///
/// The tokenizer itself never fails: structurally odd CSV is resolved into
/// data. Everything here is either a rejected configuration, an input that
/// cannot be decoded with the declared source encoding, or a failure of one of
/// the collaborators (serializer, reader) around the tokenizer.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ParserError {
    /// The options passed at construction are not a usable dialect.
    #[error("invalid parser options: {0}")]
    InvalidOptions(&'static str),

    /// The source encoding label is not known to `encoding_rs`.
    #[error("unknown source encoding '{0}'")]
    UnknownEncoding(String),

    /// The input contains a byte sequence that is invalid in the declared
    /// source encoding. Ends the session.
    #[error("malformed {encoding} input at byte offset {offset}")]
    Transcode {
        /// Canonical name of the source encoding.
        encoding: &'static str,
        /// Offset of the first byte of the malformed sequence, counted from
        /// the start of the raw input stream.
        offset: u64,
    },

    /// A record could not be serialized to JSON.
    #[error("failed to serialize record: {0}")]
    Format(#[from] serde_json::Error),

    /// Reading from the underlying transport failed.
    #[cfg(feature = "std")]
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl ParserError {
    /// Returns `true` for errors that end a session that was already running,
    /// as opposed to errors rejected at construction.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::InvalidOptions(_) | Self::UnknownEncoding(_))
    }
}
