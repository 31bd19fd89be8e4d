mod property_roundtrip;

use alloc::{borrow::Cow, vec::Vec};

use crate::{ParserOptions, Record, StreamingParser};

/// Cuts `input` at the positions derived from `splits`, the way an
/// unpredictable transport would.
pub(crate) fn split_by<'a>(input: &'a [u8], splits: &[usize]) -> Vec<&'a [u8]> {
    let mut chunks = Vec::new();
    let mut rest = input;
    for &s in splits {
        if rest.is_empty() {
            break;
        }
        let size = 1 + (s % rest.len());
        let (chunk, tail) = rest.split_at(size);
        chunks.push(chunk);
        rest = tail;
    }
    if !rest.is_empty() {
        chunks.push(rest);
    }
    chunks
}

pub(crate) fn parse_all(options: &ParserOptions, chunks: &[&[u8]]) -> Vec<Record> {
    let mut parser = StreamingParser::new(options).unwrap();
    let mut records = Vec::new();
    for chunk in chunks {
        records.extend(parser.feed(chunk));
    }
    records.extend(parser.finish());
    records
}

pub(crate) fn with_record_delimiter(record_delimiter: &'static [u8]) -> ParserOptions {
    ParserOptions {
        record_delimiter: Cow::Borrowed(record_delimiter),
        ..Default::default()
    }
}

pub(crate) fn test_count() -> u64 {
    #[cfg(not(miri))]
    let tests = if is_ci::cached() { 10_000 } else { 1_000 };
    #[cfg(miri)]
    let tests = 10;
    tests
}
