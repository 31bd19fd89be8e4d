//! Streams a Latin-1 CSV file from disk and prints each record as JSON.
//!
//! ```sh
//! RUST_LOG=debug cargo run --example latin1_stream -- tests/fixtures/quote.csv
//! ```
#![allow(missing_docs)]

use std::{env, fs::File, io::Write, process::ExitCode};

use csvmodem::{CsvReader, OutputMode, ParserOptions, RecordOutput};

fn main() -> ExitCode {
    env_logger::init();

    let Some(path) = env::args().nth(1) else {
        eprintln!("usage: latin1_stream <file.csv> [encoding]");
        return ExitCode::FAILURE;
    };
    let encoding = env::args().nth(2).unwrap_or_else(|| "latin1".to_owned());

    let file = match File::open(&path) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("{path}: {err}");
            return ExitCode::FAILURE;
        }
    };
    let options = ParserOptions {
        source_encoding: Some(encoding.into()),
        output: OutputMode::Bytes,
        ..Default::default()
    };
    let reader = match CsvReader::new(file, options) {
        Ok(reader) => reader,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let mut stdout = std::io::stdout().lock();
    for output in reader {
        match output {
            Ok(RecordOutput::Bytes(json)) => {
                let _ = stdout.write_all(&json);
                let _ = stdout.write_all(b"\n");
            }
            Ok(other) => log::warn!("unexpected output {other:?}"),
            Err(err) => {
                eprintln!("{path}: {err}");
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}
