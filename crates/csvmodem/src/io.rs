use alloc::{vec, vec::Vec};
use std::io::{ErrorKind, Read};

use crate::{CsvModem, CsvModemClosed, ParserError, ParserOptions, RecordOutput};

const DEFAULT_CHUNK_SIZE: usize = 8 * 1024;

enum State {
    Reading(CsvModem),
    Closing(CsvModemClosed),
    Done,
}

/// Pull adapter over any [`Read`] transport.
///
/// Reads a chunk only when no complete record is buffered, so a consumer that
/// stops pulling also stops the reads.
///
/// ```rust
/// use csvmodem::{CsvReader, OutputMode, ParserOptions, RecordOutput, record};
///
/// let input: &[u8] = b"a,b\nc,d";
/// let records: Vec<_> = CsvReader::new(
///     input,
///     ParserOptions {
///         output: OutputMode::Fields,
///         ..Default::default()
///     },
/// )
/// .unwrap()
/// .collect::<Result<_, _>>()
/// .unwrap();
/// assert_eq!(
///     records,
///     vec![
///         RecordOutput::Fields(record!["a", "b"]),
///         RecordOutput::Fields(record!["c", "d"]),
///     ]
/// );
/// ```
pub struct CsvReader<R> {
    reader: R,
    buf: Vec<u8>,
    state: State,
    emitted: usize,
}

impl<R: Read> CsvReader<R> {
    /// Creates a reader with the default 8 KiB chunk size.
    ///
    /// # Errors
    ///
    /// Same as [`CsvModem::new`].
    pub fn new(reader: R, options: ParserOptions) -> Result<Self, ParserError> {
        Self::with_capacity(DEFAULT_CHUNK_SIZE, reader, options)
    }

    /// Creates a reader that reads at most `capacity` bytes per chunk.
    ///
    /// # Errors
    ///
    /// Same as [`CsvModem::new`], or [`ParserError::InvalidOptions`] for a
    /// zero capacity.
    pub fn with_capacity(
        capacity: usize,
        reader: R,
        options: ParserOptions,
    ) -> Result<Self, ParserError> {
        if capacity == 0 {
            return Err(ParserError::InvalidOptions("chunk size must not be zero"));
        }
        Ok(Self {
            reader,
            buf: vec![0; capacity],
            state: State::Reading(CsvModem::new(options)?),
            emitted: 0,
        })
    }

    /// Number of records emitted so far.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.emitted
    }

    /// Unwraps the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }

    fn close(&mut self) {
        if let State::Reading(modem) = core::mem::replace(&mut self.state, State::Done) {
            self.state = State::Closing(modem.finish());
        }
    }

    fn pull(&mut self) -> Option<Result<RecordOutput, ParserError>> {
        loop {
            match &mut self.state {
                State::Reading(modem) => {
                    if let Some(output) = modem.next_record() {
                        if let Err(ParserError::Transcode { .. }) = output {
                            self.state = State::Done;
                        }
                        return Some(output);
                    }
                    match read_chunk(&mut self.reader, &mut self.buf) {
                        Ok(0) => self.close(),
                        Ok(read) => {
                            log::trace!("read {read} bytes");
                            modem.push(&self.buf[..read]);
                        }
                        Err(err) => {
                            self.state = State::Done;
                            return Some(Err(err.into()));
                        }
                    }
                }
                State::Closing(closed) => {
                    if let Some(output) = closed.next() {
                        return Some(output);
                    }
                    self.state = State::Done;
                }
                State::Done => return None,
            }
        }
    }
}

fn read_chunk<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize, std::io::Error> {
    loop {
        match reader.read(buf) {
            Err(err) if err.kind() == ErrorKind::Interrupted => {}
            other => return other,
        }
    }
}

impl<R: Read> Iterator for CsvReader<R> {
    type Item = Result<RecordOutput, ParserError>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.pull();
        if let Some(Ok(_)) = item {
            self.emitted += 1;
        }
        item
    }
}
