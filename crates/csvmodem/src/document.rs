use alloc::vec::Vec;

use crate::{CsvModem, OutputMode, ParserError, ParserOptions, Record, RecordOutput};

/// All records of an input, in order.
pub type Document = Vec<Record>;

/// `CsvModemDocument`: aggregate mode.
///
/// Wraps a [`CsvModem`] and collects every record into a [`Document`]. The
/// completion callback runs exactly once: with the document when the session
/// is finished, or with the error that ended the session early.
///
/// ```rust
/// use csvmodem::{CsvModemDocument, Document, ParserError, ParserOptions, record};
///
/// let on_done = |result: Result<Document, ParserError>| {
///     let doc = result.unwrap();
///     assert_eq!(doc, vec![record!["a", "b"], record!["c", "d"]]);
/// };
/// let mut doc = CsvModemDocument::new(ParserOptions::default(), on_done).unwrap();
/// doc.feed(b"a,b\nc,");
/// doc.feed(b"d");
/// doc.finish();
/// ```
pub struct CsvModemDocument<F>
where
    F: FnOnce(Result<Document, ParserError>),
{
    modem: CsvModem,
    records: Document,
    callback: Option<F>,
}

impl<F> CsvModemDocument<F>
where
    F: FnOnce(Result<Document, ParserError>),
{
    /// Creates an aggregating session. `options.output` is ignored; records
    /// are always collected structured.
    ///
    /// # Errors
    ///
    /// Same as [`CsvModem::new`]. The callback is not invoked in that case.
    pub fn new(mut options: ParserOptions, callback: F) -> Result<Self, ParserError> {
        options.output = OutputMode::Fields;
        Ok(Self {
            modem: CsvModem::new(options)?,
            records: Vec::new(),
            callback: Some(callback),
        })
    }

    /// Feeds a chunk of raw input.
    ///
    /// A decoding failure hands the error to the callback right away; the
    /// rest of the chunk and everything after it are ignored.
    pub fn feed(&mut self, chunk: &[u8]) {
        if self.callback.is_none() {
            return;
        }
        let mut failure = None;
        for output in self.modem.feed(chunk) {
            match output {
                Ok(output) => Self::collect(&mut self.records, output),
                Err(err) => {
                    failure = Some(err);
                    break;
                }
            }
        }
        if let Some(err) = failure {
            self.fail(err);
        }
    }

    /// The records collected so far.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records emitted so far.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.modem.record_count()
    }

    /// Ends the input, flushes the trailing record and invokes the callback
    /// with the whole document (unless it already received an error).
    pub fn finish(self) {
        let Self {
            modem,
            mut records,
            callback,
        } = self;
        let Some(callback) = callback else {
            return;
        };
        for output in modem.finish() {
            match output {
                Ok(output) => Self::collect(&mut records, output),
                Err(err) => {
                    callback(Err(err));
                    return;
                }
            }
        }
        log::debug!("document complete: {} records", records.len());
        callback(Ok(records));
    }

    fn collect(records: &mut Document, output: RecordOutput) {
        if let RecordOutput::Fields(record) = output {
            records.push(record);
        }
    }

    fn fail(&mut self, err: ParserError) {
        self.records.clear();
        if let Some(callback) = self.callback.take() {
            callback(Err(err));
        }
    }
}

/// Parses a whole chunked input into a [`Document`].
///
/// # Errors
///
/// Returns the first error of the session: invalid options, an unknown
/// encoding, or undecodable input.
pub fn parse_document<I, C>(options: ParserOptions, chunks: I) -> Result<Document, ParserError>
where
    I: IntoIterator<Item = C>,
    C: AsRef<[u8]>,
{
    let mut result = None;
    let mut doc =
        CsvModemDocument::new(options, |r: Result<Document, ParserError>| result = Some(r))?;
    for chunk in chunks {
        doc.feed(chunk.as_ref());
    }
    doc.finish();
    result.unwrap_or_else(|| Ok(Document::new()))
}
