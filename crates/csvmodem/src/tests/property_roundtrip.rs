use alloc::{string::String, vec::Vec};

use bstr::BString;
use quickcheck::{QuickCheck, TestResult};
use quickcheck_macros::quickcheck;

use super::{parse_all, split_by, test_count, with_record_delimiter};
use crate::{Record, StreamingParser, parse_document};

/// Writes every field quoted, every record terminated by CRLF. Returns the
/// text and the length of its longest line.
fn quote_all(rows: &[Vec<String>]) -> (String, usize) {
    let mut out = String::new();
    let mut longest = 0;
    for row in rows {
        let start = out.len();
        for (i, field) in row.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            out.push('"');
            out.push_str(&field.replace('"', "\"\""));
            out.push('"');
        }
        out.push_str("\r\n");
        longest = longest.max(out.len() - start);
    }
    (out, longest)
}

fn non_empty(rows: Vec<Vec<String>>) -> Vec<Vec<String>> {
    rows.into_iter().filter(|row| !row.is_empty()).collect()
}

/// Property: Quoting every field and joining with CRLF, then parsing in
/// arbitrary chunks, gives back the original rows.
#[test]
fn quote_all_roundtrip_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(rows: Vec<Vec<String>>, splits: Vec<usize>) -> bool {
        let rows = non_empty(rows);
        let (text, _) = quote_all(&rows);
        let expected: Vec<Record> = rows
            .iter()
            .map(|row| {
                let fields: Vec<BString> = row.iter().map(|f| BString::from(f.as_str())).collect();
                Record::from(fields)
            })
            .collect();
        let records = parse_all(
            &with_record_delimiter(b"\r\n"),
            &split_by(text.as_bytes(), &splits),
        );
        records == expected
    }

    QuickCheck::new()
        .tests(test_count())
        .quickcheck(prop as fn(Vec<Vec<String>>, Vec<usize>) -> bool);
}

/// Property: Between chunks the parser holds no more than one open record
/// plus the unmatched part of the record delimiter.
#[test]
fn buffered_bytes_stay_bounded_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(rows: Vec<Vec<String>>, splits: Vec<usize>) -> TestResult {
        let rows = non_empty(rows);
        if rows.is_empty() {
            return TestResult::discard();
        }
        let (text, longest) = quote_all(&rows);
        let mut parser = StreamingParser::new(&with_record_delimiter(b"\r\n")).unwrap();
        for chunk in split_by(text.as_bytes(), &splits) {
            parser.feed(chunk).for_each(drop);
            if parser.buffered_len() > longest {
                return TestResult::failed();
            }
        }
        TestResult::from_bool(parser.buffered_len() == 0 && parser.finish().count() == 0)
    }

    QuickCheck::new()
        .tests(test_count())
        .quickcheck(prop as fn(Vec<Vec<String>>, Vec<usize>) -> TestResult);
}

#[quickcheck]
fn record_count_matches_document(seed: Vec<u8>) -> bool {
    let mut parser = StreamingParser::new(&with_record_delimiter(b"\n")).unwrap();
    let emitted = parser.feed(&seed).count();
    let mut closed = parser.finish();
    let emitted = emitted + closed.by_ref().count();
    let document = parse_document(with_record_delimiter(b"\n"), [&seed]).unwrap();
    emitted == document.len() && closed.record_count() == document.len()
}
