#![allow(missing_docs)]
#![allow(dead_code)]

use csvmodem::{CsvModem, OutputMode, ParserOptions, Record, RecordOutput};

/// A Latin-1 encoded job sheet, LF terminated.
pub const QUOTE_LF: &[u8] = include_bytes!("fixtures/quote.csv");

/// The same sheet, CRLF terminated.
pub const QUOTE_CRLF: &[u8] = include_bytes!("fixtures/quote_crlf.csv");

pub const RECORDS: usize = 13;

pub fn latin1(record_delimiter: &'static [u8], output: OutputMode) -> ParserOptions {
    ParserOptions {
        record_delimiter: record_delimiter.into(),
        source_encoding: Some("latin1".into()),
        output,
        ..Default::default()
    }
}

pub fn run(options: ParserOptions, chunks: &[&[u8]]) -> Vec<RecordOutput> {
    let mut modem = CsvModem::new(options).expect("valid options");
    let mut out = Vec::new();
    for chunk in chunks {
        out.extend(modem.feed(chunk).map(|r| r.expect("record")));
    }
    out.extend(modem.finish().map(|r| r.expect("record")));
    out
}

pub fn fields(outputs: Vec<RecordOutput>) -> Vec<Record> {
    outputs
        .into_iter()
        .map(|output| match output {
            RecordOutput::Fields(record) => record,
            other => panic!("expected fields, got {other:?}"),
        })
        .collect()
}
