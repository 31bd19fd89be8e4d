//! An incremental CSV tokenizer for arbitrarily chunked byte streams.
//!
//! Input arrives as byte chunks whose boundaries need not line up with
//! records, fields, quote pairs, multi-byte record delimiters or even
//! characters. The parser carries its state from one chunk to the next and
//! yields each record as soon as its record delimiter has been seen.
//!
//! ```rust
//! use csvmodem::{CsvModem, OutputMode, ParserOptions, RecordOutput, record};
//!
//! let mut modem = CsvModem::new(ParserOptions {
//!     record_delimiter: b"\r\n".as_slice().into(),
//!     output: OutputMode::Fields,
//!     ..Default::default()
//! })
//! .unwrap();
//!
//! let mut records = Vec::new();
//! for chunk in [&b"hey,yo\r"[..], b"\nfoo,bar"] {
//!     records.extend(modem.feed(chunk).map(Result::unwrap));
//! }
//! records.extend(modem.finish().map(Result::unwrap));
//!
//! assert_eq!(
//!     records,
//!     vec![
//!         RecordOutput::Fields(record!["hey", "yo"]),
//!         RecordOutput::Fields(record!["foo", "bar"]),
//!     ]
//! );
//! ```

#![no_std]
extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

mod chunk_utils;
mod csvmodem;
mod document;
mod error;
mod format;
#[cfg(feature = "std")]
mod io;
mod options;
mod parser;
mod record;
mod transcoder;

#[cfg(test)]
mod tests;

pub use chunk_utils::{produce_chunks, produce_prefixes};
pub use csvmodem::{CsvModem, CsvModemClosed, CsvModemIter};
pub use document::{CsvModemDocument, Document, parse_document};
pub use error::ParserError;
pub use format::{RecordOutput, format_record};
#[cfg(feature = "std")]
pub use io::CsvReader;
pub use options::{OutputMode, ParserOptions};
pub use parser::{ClosedStreamingParser, StreamingParser, StreamingParserIter};
pub use record::Record;
pub use transcoder::Transcoder;

#[doc(hidden)]
pub use alloc::vec;
#[doc(hidden)]
pub use bstr::BString;

/// Macro to build a [`Record`] from a list of field values.
///
/// Each element may be anything convertible into a [`bstr::BString`]: string
/// slices, byte slices, `String`s or `Vec<u8>`s.
///
/// ```rust
/// # use csvmodem::record;
/// let r = record!["a", b"b\xff".as_slice(), ""];
/// assert_eq!(r.len(), 3);
/// assert_eq!(r.to_strings_lossy(), vec!["a", "b\u{FFFD}", ""]);
/// ```
#[macro_export]
macro_rules! record {
    ( $( $field:expr ),* $(,)? ) => {{
        $crate::Record::from($crate::vec![$($crate::BString::from($field)),*])
    }};
}
