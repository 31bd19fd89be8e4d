//! The incremental CSV tokenizer.
//!
//! Overview
//! - `StreamingParser` is a resumable state machine over bytes. Each call to
//!   [`StreamingParser::feed`] returns an iterator that tokenizes the chunk
//!   lazily and yields every record completed inside it. Whatever follows the
//!   last record delimiter stays in the parser as carry-over state: the field
//!   being built, the fields of the record being built, the quote state, and
//!   the progress of a partially matched record delimiter.
//! - [`StreamingParser::finish`] closes the input and flushes the trailing
//!   partial record, if any.
//!
//! Carry-over and drop semantics
//! - `source: Buffer` holds bytes that were handed to the parser but not yet
//!   tokenized. It is filled by `push(...)` and by dropping a feed iterator
//!   before it reached the end of its chunk. Every feed drains the ring first,
//!   then reads directly from the new chunk, so input order is preserved no
//!   matter where the caller stops pulling.
//! - Memory is bounded by the unterminated record plus unread input. Nothing
//!   of a record outlives its emission.
//!
//! Quoting
//! - A quote byte opens a quoted section only as the first byte of a field;
//!   anywhere else it is data. Inside quotes, field and record delimiters are
//!   data and a doubled quote is one literal quote. After the closing quote
//!   the field continues unquoted, so `"ab"cd` is the field `abcd`.
//! - Nothing here is ever an error. Odd input is resolved into data.
//!
//! # Examples
//!
//! ```rust
//! use csvmodem::{ParserOptions, StreamingParser, record};
//!
//! let mut parser = StreamingParser::new(&ParserOptions::default()).unwrap();
//! let mut records: Vec<_> = parser.feed(br#""""hey,yo""#).collect();
//! records.extend(parser.feed(br#""",foo,bar"#));
//! records.extend(parser.finish());
//! assert_eq!(records, vec![record![r#""hey,yo""#, "foo", "bar"]]);
//! ```

mod buffer;
mod delimiter;


use alloc::vec::Vec;

use bstr::BString;
use buffer::Buffer;
use delimiter::{RecordDelimiter, Step};

use crate::{ParserError, ParserOptions, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexState {
    /// Nothing of the current field has been seen.
    FieldStart,
    /// Inside an unquoted field, or after the closing quote of a quoted one.
    InField,
    InQuotedField,
    /// Saw a quote inside a quoted field: either an escaped quote or the end
    /// of the quoted section, depending on the next byte.
    QuoteInQuotedField,
    /// A prefix of a multi-byte record delimiter has been seen.
    MatchingRecordDelimiter,
}

/// The streaming CSV tokenizer.
///
/// `StreamingParser` can be fed partial input in chunks of any size. Records
/// come out of the iterator returned by [`feed`](Self::feed) as soon as their
/// record delimiter has been seen.
#[derive(Debug)]
pub struct StreamingParser {
    source: Buffer,
    state: LexState,

    field: BString,
    record: Vec<BString>,

    field_delimiter: u8,
    quote: u8,
    record_delimiter: RecordDelimiter,

    record_count: usize,
}

impl StreamingParser {
    /// Creates a tokenizer for the dialect described by `options`.
    ///
    /// Only the delimiter and quote settings are read; encoding and output
    /// shape belong to the session layer.
    ///
    /// # Errors
    ///
    /// Returns [`ParserError::InvalidOptions`] if the options fail
    /// [`ParserOptions::validate`].
    pub fn new(options: &ParserOptions) -> Result<Self, ParserError> {
        options.validate()?;
        Ok(Self {
            source: Buffer::new(),
            state: LexState::FieldStart,
            field: BString::default(),
            record: Vec::new(),
            field_delimiter: options.field_delimiter,
            quote: options.quote,
            record_delimiter: RecordDelimiter::new(&options.record_delimiter),
            record_count: 0,
        })
    }

    /// Tokenizes a chunk, lazily.
    ///
    /// The returned iterator yields every record completed within `chunk`.
    /// If it is dropped early, the unread rest of `chunk` is kept and
    /// tokenized by the next call.
    pub fn feed<'a>(&'a mut self, chunk: &'a [u8]) -> StreamingParserIter<'a> {
        StreamingParserIter {
            parser: self,
            batch: chunk,
            pos: 0,
        }
    }

    /// Appends a chunk to the input without tokenizing it. Records are pulled
    /// with the `Iterator` impl.
    pub fn push(&mut self, chunk: &[u8]) {
        self.source.push(chunk);
    }

    /// Marks the end of input and returns an iterator over the remaining
    /// records, the last of which may be an unterminated trailing record.
    #[must_use]
    pub fn finish(self) -> ClosedStreamingParser {
        ClosedStreamingParser {
            parser: self,
            flushed: false,
        }
    }

    /// Number of records emitted so far.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.record_count
    }

    /// Bytes currently held: unread input plus the unterminated record.
    #[must_use]
    pub fn buffered_len(&self) -> usize {
        self.source.len()
            + self.field.len()
            + self.record.iter().map(|f| f.len()).sum::<usize>()
            + self.record_delimiter.matched()
    }

    fn next_from_source(&mut self) -> Option<Record> {
        while !self.source.is_empty() {
            if let Some((a, b)) = self.literal_stop() {
                self.source
                    .copy_while(&mut self.field, |byte| byte != a && byte != b);
            }
            let byte = self.source.next_byte()?;
            if let Some(record) = self.step(byte) {
                return Some(record);
            }
        }
        None
    }

    fn next_from_batch(&mut self, batch: &[u8], pos: &mut usize) -> Option<Record> {
        while *pos < batch.len() {
            if let Some((a, b)) = self.literal_stop() {
                let rest = &batch[*pos..];
                let run = rest
                    .iter()
                    .position(|&byte| byte == a || byte == b)
                    .unwrap_or(rest.len());
                self.field.extend_from_slice(&rest[..run]);
                *pos += run;
                if *pos == batch.len() {
                    break;
                }
            }
            let byte = batch[*pos];
            *pos += 1;
            if let Some(record) = self.step(byte) {
                return Some(record);
            }
        }
        None
    }

    /// Bytes that end a run of plain data in the current state, if the state
    /// has such runs.
    #[inline]
    fn literal_stop(&self) -> Option<(u8, u8)> {
        match self.state {
            LexState::InField => Some((self.field_delimiter, self.record_delimiter.first())),
            LexState::InQuotedField => Some((self.quote, self.quote)),
            _ => None,
        }
    }

    /// Advances the state machine by one byte, returning the record it
    /// completed, if any.
    fn step(&mut self, byte: u8) -> Option<Record> {
        match self.state {
            LexState::FieldStart if byte == self.quote => {
                self.state = LexState::InQuotedField;
                None
            }
            LexState::FieldStart | LexState::InField => self.unquoted(byte),
            LexState::InQuotedField => {
                if byte == self.quote {
                    self.state = LexState::QuoteInQuotedField;
                } else {
                    self.field.push(byte);
                }
                None
            }
            LexState::QuoteInQuotedField => {
                if byte == self.quote {
                    self.field.push(self.quote);
                    self.state = LexState::InQuotedField;
                    None
                } else {
                    // The quoted section is closed; the field goes on unquoted.
                    self.state = LexState::InField;
                    self.unquoted(byte)
                }
            }
            LexState::MatchingRecordDelimiter => self.continue_record_delimiter(byte),
        }
    }

    fn unquoted(&mut self, byte: u8) -> Option<Record> {
        if byte == self.field_delimiter {
            self.end_field();
            None
        } else if byte == self.record_delimiter.first() {
            self.state = LexState::MatchingRecordDelimiter;
            self.continue_record_delimiter(byte)
        } else {
            self.field.push(byte);
            self.state = LexState::InField;
            None
        }
    }

    fn continue_record_delimiter(&mut self, byte: u8) -> Option<Record> {
        loop {
            match self.record_delimiter.step(byte) {
                Step::NeedMore => return None,
                Step::Done => return Some(self.end_record()),
                Step::Reject { literal } => {
                    self.field
                        .extend_from_slice(&self.record_delimiter.bytes()[..literal]);
                    if !self.record_delimiter.is_matching() {
                        self.state = LexState::InField;
                        return self.unquoted(byte);
                    }
                }
            }
        }
    }

    fn end_field(&mut self) {
        self.record.push(core::mem::take(&mut self.field));
        self.state = LexState::FieldStart;
    }

    fn end_record(&mut self) -> Record {
        self.end_field();
        self.record_count += 1;
        let record = Record::from(core::mem::take(&mut self.record));
        log::trace!("record {} ({} fields)", self.record_count, record.len());
        record
    }

    /// End-of-input: a dangling delimiter prefix is data, and a non-empty
    /// partial record is emitted.
    fn flush(&mut self) -> Option<Record> {
        let pending = self.record_delimiter.take_pending();
        if pending > 0 {
            self.field
                .extend_from_slice(&self.record_delimiter.bytes()[..pending]);
        }
        if self.field.is_empty() && self.record.is_empty() {
            self.state = LexState::FieldStart;
            return None;
        }
        Some(self.end_record())
    }
}

impl Iterator for StreamingParser {
    type Item = Record;

    /// Pulls the next record out of input buffered with
    /// [`push`](StreamingParser::push).
    fn next(&mut self) -> Option<Self::Item> {
        self.next_from_source()
    }
}

/// Iterator over the records completed by one chunk.
///
/// Returned by [`StreamingParser::feed`].
pub struct StreamingParserIter<'a> {
    parser: &'a mut StreamingParser,
    batch: &'a [u8],
    pos: usize,
}

impl StreamingParserIter<'_> {
    /// Record count of the underlying parser, including records yielded by
    /// this iterator so far.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.parser.record_count
    }
}

impl Iterator for StreamingParserIter<'_> {
    type Item = Record;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(record) = self.parser.next_from_source() {
            return Some(record);
        }
        self.parser.next_from_batch(self.batch, &mut self.pos)
    }
}

impl Drop for StreamingParserIter<'_> {
    fn drop(&mut self) {
        if self.pos < self.batch.len() {
            self.parser.source.push(&self.batch[self.pos..]);
            self.pos = self.batch.len();
        }
    }
}

/// A `StreamingParser` that has been closed to further input.
///
/// Returned by [`StreamingParser::finish`]; yields the records still held by
/// the parser, then the flushed trailing record.
#[derive(Debug)]
pub struct ClosedStreamingParser {
    parser: StreamingParser,
    flushed: bool,
}

impl ClosedStreamingParser {
    /// Number of records emitted by the parser, including the flushed one once
    /// it has been yielded.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.parser.record_count
    }
}

impl Iterator for ClosedStreamingParser {
    type Item = Record;

    fn next(&mut self) -> Option<Self::Item> {
        if self.flushed {
            return None;
        }
        if let Some(record) = self.parser.next_from_source() {
            return Some(record);
        }
        self.flushed = true;
        self.parser.flush()
    }
}
