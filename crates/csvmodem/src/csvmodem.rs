use alloc::vec::Vec;

use crate::{
    OutputMode, ParserError, ParserOptions, RecordOutput, StreamingParser, Transcoder,
    format::format_record,
    parser::{ClosedStreamingParser, StreamingParserIter},
};

/// `CsvModem`: one parse session.
///
/// Wires the transcoder, the tokenizer and the record formatter together:
/// raw chunks go in, records in the configured [`OutputMode`] come out.
///
/// A malformed sequence in the source encoding ends the session. Records
/// completed by the input decoded before it are still delivered, then the
/// error is yielded once.
#[derive(Debug)]
pub struct CsvModem {
    parser: StreamingParser,
    transcoder: Transcoder,
    /// Decoded text of the current chunk when the transcoder is not a
    /// pass-through.
    scratch: Vec<u8>,
    output: OutputMode,
    /// Transcoding failure not yet handed to the caller.
    pending_error: Option<ParserError>,
}

impl CsvModem {
    /// Creates a session.
    ///
    /// # Errors
    ///
    /// Returns [`ParserError::InvalidOptions`] for an unusable dialect and
    /// [`ParserError::UnknownEncoding`] for an unknown source encoding label.
    pub fn new(options: ParserOptions) -> Result<Self, ParserError> {
        let parser = StreamingParser::new(&options)?;
        let transcoder = Transcoder::new(options.source_encoding.as_deref())?;
        log::debug!(
            "csv session: source encoding {}{}, output {:?}",
            transcoder.encoding().name(),
            if transcoder.is_passthrough() {
                " (pass-through)"
            } else {
                ""
            },
            options.output,
        );
        Ok(Self {
            parser,
            transcoder,
            scratch: Vec::new(),
            output: options.output,
            pending_error: None,
        })
    }

    /// Feeds a chunk of raw input and iterates over the records it completes.
    ///
    /// If the chunk cannot be decoded, the iterator yields the records of the
    /// decodable part, then the error once. The session is over: later chunks
    /// are ignored.
    pub fn feed<'a>(&'a mut self, chunk: &'a [u8]) -> CsvModemIter<'a> {
        let Self {
            parser,
            transcoder,
            scratch,
            output,
            pending_error,
        } = self;
        let text: &'a [u8] = if transcoder.has_failed() {
            &[]
        } else {
            let (text, error) = transcoder.decode(chunk, scratch, false);
            *pending_error = error;
            text
        };
        CsvModemIter {
            inner: parser.feed(text),
            pending_error,
            output: *output,
        }
    }

    /// Buffers a chunk of raw input without tokenizing it; records are pulled
    /// with [`next_record`](Self::next_record).
    ///
    /// A decoding failure is reported by `next_record` after the records of
    /// the decodable part. Chunks pushed after that are ignored.
    pub fn push(&mut self, chunk: &[u8]) {
        if self.transcoder.has_failed() {
            return;
        }
        let (text, error) = self.transcoder.decode(chunk, &mut self.scratch, false);
        self.parser.push(text);
        self.pending_error = error;
    }

    /// Pulls the next record out of input buffered with
    /// [`push`](Self::push), or the transcoding failure once every record
    /// before it has been pulled.
    pub fn next_record(&mut self) -> Option<Result<RecordOutput, ParserError>> {
        match self.parser.next() {
            Some(record) => Some(format_record(self.output, record)),
            None => self.pending_error.take().map(Err),
        }
    }

    /// Finishes the stream and iterates over the remaining records.
    ///
    /// After a transcoding failure the unterminated trailing record is
    /// dropped rather than flushed.
    #[must_use]
    pub fn finish(self) -> CsvModemClosed {
        let Self {
            mut parser,
            mut transcoder,
            mut scratch,
            output,
            mut pending_error,
        } = self;
        if !transcoder.has_failed() {
            let (tail, error) = transcoder.decode(&[], &mut scratch, true);
            parser.push(tail);
            pending_error = error;
        }
        let record_count = parser.record_count();
        let remaining = if transcoder.has_failed() {
            Remaining::Drain(parser)
        } else {
            Remaining::Flush(parser.finish())
        };
        CsvModemClosed {
            remaining,
            error: pending_error,
            output,
            record_count,
        }
    }

    /// Number of records emitted so far.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.parser.record_count()
    }

    /// Bytes held for the unterminated record and unread input.
    #[must_use]
    pub fn buffered_len(&self) -> usize {
        self.parser.buffered_len()
    }
}

/// Iterator over the records completed by one chunk.
///
/// Returned by [`CsvModem::feed`].
pub struct CsvModemIter<'a> {
    inner: StreamingParserIter<'a>,
    pending_error: &'a mut Option<ParserError>,
    output: OutputMode,
}

impl Iterator for CsvModemIter<'_> {
    type Item = Result<RecordOutput, ParserError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.inner.next() {
            Some(record) => Some(format_record(self.output, record)),
            None => self.pending_error.take().map(Err),
        }
    }
}

enum Remaining {
    /// Records still buffered, then the flushed trailing record.
    Flush(ClosedStreamingParser),
    /// Records still buffered; the session failed, nothing is flushed.
    Drain(StreamingParser),
    Done,
}

/// A `CsvModem` that has been closed to further input.
///
/// Returned by [`CsvModem::finish`]. Yields the remaining records, including
/// the unterminated trailing one, then ends.
pub struct CsvModemClosed {
    remaining: Remaining,
    error: Option<ParserError>,
    output: OutputMode,
    record_count: usize,
}

impl CsvModemClosed {
    /// Number of records emitted by the session so far.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.record_count
    }
}

impl Iterator for CsvModemClosed {
    type Item = Result<RecordOutput, ParserError>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match &mut self.remaining {
            Remaining::Flush(closed) => closed.next(),
            Remaining::Drain(parser) => parser.next(),
            Remaining::Done => None,
        };
        if let Some(record) = record {
            self.record_count += 1;
            return Some(format_record(self.output, record));
        }
        if !matches!(self.remaining, Remaining::Done) {
            log::debug!("csv session finished after {} records", self.record_count);
            self.remaining = Remaining::Done;
        }
        self.error.take().map(Err)
    }
}
