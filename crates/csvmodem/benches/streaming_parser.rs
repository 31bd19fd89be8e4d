//! Benchmark – `csvmodem::StreamingParser` and `csvmodem::CsvModem`
#![allow(missing_docs)]

use std::{borrow::Cow, time::Duration};

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use csvmodem::{CsvModem, OutputMode, ParserOptions, StreamingParser, produce_chunks};

/// Produce a *deterministic* CSV document of roughly `target_len` bytes mixing
/// plain fields, quoted fields with embedded delimiters and escaped quotes.
fn make_csv_payload(target_len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(target_len + 64);
    let mut row = 0usize;
    while out.len() < target_len {
        out.extend_from_slice(format!("{row},plain text,").as_bytes());
        out.extend_from_slice(b"\"quoted, with \"\"escapes\"\"\r\nand a line break\",");
        out.extend_from_slice(format!("{}\r\n", row * 31 % 977).as_bytes());
        row += 1;
    }
    out
}

fn run_streaming_parser(payload: &[u8], parts: usize) -> usize {
    let mut parser = StreamingParser::new(&ParserOptions {
        record_delimiter: Cow::Borrowed(b"\r\n"),
        ..Default::default()
    })
    .unwrap();
    let mut produced = 0usize;
    for chunk in produce_chunks(payload, parts) {
        produced += parser.feed(chunk).count();
    }
    produced + parser.finish().count()
}

fn run_modem(payload: &[u8], parts: usize, output: OutputMode, label: Option<&'static str>) -> usize {
    let mut modem = CsvModem::new(ParserOptions {
        record_delimiter: Cow::Borrowed(b"\r\n"),
        source_encoding: label.map(Cow::Borrowed),
        output,
        ..Default::default()
    })
    .unwrap();
    let mut produced = 0usize;
    for chunk in produce_chunks(payload, parts) {
        for res in modem.feed(chunk) {
            let _ = res.unwrap();
            produced += 1;
        }
    }
    for res in modem.finish() {
        let _ = res.unwrap();
        produced += 1;
    }
    produced
}

fn bench_streaming_parser(c: &mut Criterion) {
    let payload = make_csv_payload(100_000);

    let mut group = c.benchmark_group("streaming_parser_split");
    group.throughput(Throughput::Bytes(payload.len() as u64));
    for &parts in &[1usize, 100, 10_000] {
        group.bench_with_input(BenchmarkId::new("tokenizer", parts), &parts, |b, &p| {
            b.iter(|| black_box(run_streaming_parser(black_box(&payload), p)));
        });
    }
    group.finish();

    let mut group = c.benchmark_group("csvmodem_split");
    group.throughput(Throughput::Bytes(payload.len() as u64));
    for &parts in &[1usize, 1_000] {
        for &(output, label) in &[
            (OutputMode::Fields, None),
            (OutputMode::Bytes, None),
            (OutputMode::Fields, Some("windows-1252")),
        ] {
            let name = format!("{output:?}-{}", label.unwrap_or("utf-8")).to_lowercase();
            group.bench_with_input(BenchmarkId::new(name, parts), &parts, |b, &p| {
                b.iter(|| black_box(run_modem(black_box(&payload), p, output, label)));
            });
        }
    }
    group.finish();
}

fn criterion() -> Criterion {
    let mut c = Criterion::default();
    if cfg!(feature = "bench-fast") {
        c = c
            .warm_up_time(Duration::from_millis(10))
            .measurement_time(Duration::from_millis(100))
            .sample_size(10);
    } else {
        c = c
            .warm_up_time(Duration::from_secs(5))
            .measurement_time(Duration::from_secs(10));
    }
    c
}

criterion_group! { name = benches; config = criterion(); targets = bench_streaming_parser }
criterion_main!(benches);
