#![no_main]
use std::cell::RefCell;

use arbitrary::{Arbitrary, Unstructured};
use csvmodem::{CsvModem, OutputMode, ParserOptions};
use libfuzzer_sys::{fuzz_mutator, fuzz_target, fuzzer_mutate};
use rand::rngs::SmallRng; // faster than StdRng
use rand::{Rng, RngCore, SeedableRng};

const HEADER: usize = 5; // 1 flag + 4-byte seed

thread_local! {
    // One SmallRng per thread, seeded once from the host OS
    static RNG: RefCell<SmallRng> =
        RefCell::new(SmallRng::from_os_rng());
}

/// Helper: borrow the thread-local RNG and run a closure with it.
fn with_rng<F, R>(f: F) -> R
where
    F: FnOnce(&mut SmallRng) -> R,
{
    RNG.with(|cell| f(&mut cell.borrow_mut()))
}

fn mutator(data: &mut [u8], size: usize, max_size: usize, seed: u32) -> usize {
    if size < HEADER || seed.is_multiple_of(10) {
        data[0] = with_rng(|rng| rng.next_u32() as u8 & 0x1F); // 5 bits
        data[1..5].copy_from_slice(&with_rng(|rng| rng.next_u32().to_le_bytes()));

        let mut prefix = HEADER;
        while prefix < size.max(HEADER + 1) && prefix < max_size {
            let written = append_row(&mut data[prefix..], size, max_size - prefix);
            if written == 0 {
                break;
            }
            prefix += written;
        }
        prefix
    } else {
        fuzzer_mutate(data, size, max_size)
    }
}

/// Append one CSV row built from arbitrary fields, quoting some of them,
/// without exceeding `limit`. Returns the number of bytes written.
fn append_row(data: &mut [u8], size: usize, limit: usize) -> usize {
    let row = loop {
        let s = with_rng(|rng| rng.random_range(size / 2..size * 2 + 2).min(limit));
        let bytes: Vec<u8> = with_rng(|rng| (0..s).map(|_| rng.random::<u8>()).collect());
        if let Ok(row) = ArbitraryRow::arbitrary(&mut Unstructured::new(&bytes)) {
            break row;
        }
    };

    let mut out = Vec::new();
    for (i, (field, quoted)) in row.0.iter().enumerate() {
        if i > 0 {
            out.push(b',');
        }
        if *quoted {
            out.push(b'"');
            out.extend_from_slice(field.replace('"', "\"\"").as_bytes());
            out.push(b'"');
        } else {
            out.extend_from_slice(field.as_bytes());
        }
    }
    out.extend_from_slice(if with_rng(|rng| rng.random()) { b"\r\n".as_slice() } else { b"\n" });

    let len = out.len().min(limit);
    data[..len].copy_from_slice(&out[..len]);
    len
}

fuzz_mutator!(|data: &mut [u8], size: usize, max_size: usize, seed: u32| {
    mutator(data, size, max_size, seed)
});

#[derive(Debug, Arbitrary)]
struct ArbitraryRow(Vec<(String, bool)>);

fn options(flags: u8) -> ParserOptions {
    let mut options = ParserOptions {
        record_delimiter: if flags & 1 != 0 {
            b"\r\n".as_slice().into()
        } else {
            b"\n".as_slice().into()
        },
        // Single-byte encodings never fail to decode, so every chunking must
        // agree.
        source_encoding: (flags & 2 != 0).then(|| "windows-1252".into()),
        output: match (flags >> 3) & 3 {
            0 => OutputMode::Fields,
            1 => OutputMode::Text,
            _ => OutputMode::Bytes,
        },
        ..Default::default()
    };
    if flags & 4 != 0 {
        options.field_delimiter = b';';
        options.quote = b'\'';
    }
    options
}

fn run(options: ParserOptions, chunks: &[&[u8]]) -> Vec<csvmodem::RecordOutput> {
    let mut modem = CsvModem::new(options).unwrap();
    let mut out = Vec::new();
    for chunk in chunks {
        out.extend(modem.feed(chunk).map(Result::unwrap));
    }
    out.extend(modem.finish().map(Result::unwrap));
    out
}

fn parser(data: &[u8]) {
    if data.len() < HEADER {
        return;
    }

    let flags = data[0];
    let split_seed = u32::from_le_bytes(data[1..5].try_into().unwrap()) as u64;
    let data = &data[HEADER..];

    let whole = run(options(flags), &[data]);
    let chunked = run(options(flags), &split_into_chunks(data, split_seed));
    assert_eq!(whole, chunked);
}

fuzz_target!(|data: &[u8]| parser(data));

/// Split `data` into chunks using a deterministic random value to generate
/// splits. Boundaries may fall anywhere, including inside multi-byte
/// sequences and record delimiters.
fn split_into_chunks(data: &[u8], split_seed: u64) -> Vec<&[u8]> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut seed = split_seed;

    while start < data.len() {
        let remaining = data.len() - start;
        let size = (seed as usize % remaining) + 1;
        chunks.push(&data[start..start + size]);
        start += size;
        seed = seed.rotate_left(7) ^ 0x9e37_79b9;
    }

    chunks
}
