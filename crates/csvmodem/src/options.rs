use alloc::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::ParserError;

/// Shape of each record handed to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// The structured [`Record`](crate::Record) itself.
    Fields,
    /// The record serialized as a JSON array of strings.
    Text,
    /// The UTF-8 bytes of the JSON array text.
    #[default]
    Bytes,
}

/// Configuration options for the CSV streaming parser.
///
/// Options are resolved once, when a session is constructed; a running parser
/// never observes changes to them.
///
/// # Examples
///
/// ```rust
/// use csvmodem::{CsvModem, OutputMode, ParserOptions};
///
/// let modem = CsvModem::new(ParserOptions {
///     field_delimiter: b';',
///     record_delimiter: b"\r\n".as_slice().into(),
///     source_encoding: Some("latin1".into()),
///     output: OutputMode::Text,
///     ..Default::default()
/// });
/// assert!(modem.is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserOptions {
    /// Byte separating fields within a record.
    ///
    /// # Default
    ///
    /// `b','`
    pub field_delimiter: u8,

    /// Byte that opens and closes a quoted field.
    ///
    /// A quote only opens a quoted section when it is the very first byte of a
    /// field. Anywhere else it is ordinary data. Inside a quoted section two
    /// consecutive quotes stand for one literal quote.
    ///
    /// # Default
    ///
    /// `b'"'`
    pub quote: u8,

    /// Byte sequence terminating a record. May be longer than one byte, in
    /// which case it is matched across chunk boundaries.
    ///
    /// When a partial match breaks off, only the bytes that cannot start a
    /// new match become data. For a self-overlapping delimiter such as
    /// `b"aab"` the input `xaaab` is therefore the record `xa`.
    ///
    /// # Default
    ///
    /// `b"\n"`
    pub record_delimiter: Cow<'static, [u8]>,

    /// Encoding label of the input, e.g. `"latin1"` or `"shift_jis"`.
    ///
    /// When `None`, or when the label resolves to UTF-8, input bytes reach the
    /// tokenizer untouched. Otherwise every chunk is decoded to UTF-8 first.
    ///
    /// # Default
    ///
    /// `None`
    pub source_encoding: Option<Cow<'static, str>>,

    /// Shape of the emitted records.
    ///
    /// # Default
    ///
    /// [`OutputMode::Bytes`]
    pub output: OutputMode,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            field_delimiter: b',',
            quote: b'"',
            record_delimiter: Cow::Borrowed(b"\n"),
            source_encoding: None,
            output: OutputMode::default(),
        }
    }
}

impl ParserOptions {
    /// Checks that the delimiters describe an unambiguous dialect.
    ///
    /// # Errors
    ///
    /// Returns [`ParserError::InvalidOptions`] when the record delimiter is
    /// empty, when the field delimiter and quote are the same byte, or when the
    /// record delimiter contains either of them.
    pub fn validate(&self) -> Result<(), ParserError> {
        if self.record_delimiter.is_empty() {
            return Err(ParserError::InvalidOptions(
                "record delimiter must not be empty",
            ));
        }
        if self.field_delimiter == self.quote {
            return Err(ParserError::InvalidOptions(
                "field delimiter and quote must differ",
            ));
        }
        if self.record_delimiter.contains(&self.field_delimiter) {
            return Err(ParserError::InvalidOptions(
                "record delimiter must not contain the field delimiter",
            ));
        }
        if self.record_delimiter.contains(&self.quote) {
            return Err(ParserError::InvalidOptions(
                "record delimiter must not contain the quote",
            ));
        }
        Ok(())
    }
}
