//! Converts raw input chunks from the declared source encoding to UTF-8.
//!
//! The tokenizer works on bytes, so a session without a source encoding (or
//! with a UTF-8 source) hands chunks through untouched. Everything else goes
//! through one streaming [`encoding_rs::Decoder`] per session, which keeps
//! the state of any multi-byte sequence cut by a chunk boundary.

use alloc::{string::ToString, vec::Vec};

use encoding_rs::{DecoderResult, Encoding, UTF_8};

use crate::ParserError;

/// Extra room reserved when the decoder cannot size its output up front.
const MIN_OUTPUT_RESERVE: usize = 16;

/// Per-session adapter between the transport's bytes and the tokenizer.
pub struct Transcoder {
    decoder: Option<encoding_rs::Decoder>,
    encoding: &'static Encoding,
    /// Raw bytes consumed so far, for error offsets.
    position: u64,
    failed: bool,
}

impl core::fmt::Debug for Transcoder {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Transcoder")
            .field("encoding", &self.encoding.name())
            .field("passthrough", &self.is_passthrough())
            .field("position", &self.position)
            .field("failed", &self.failed)
            .finish()
    }
}

impl Transcoder {
    /// Resolves `label` and prepares a decoder for it.
    ///
    /// # Errors
    ///
    /// Returns [`ParserError::UnknownEncoding`] if `encoding_rs` does not know
    /// the label.
    pub fn new(label: Option<&str>) -> Result<Self, ParserError> {
        let encoding = match label {
            None => UTF_8,
            Some(label) => Encoding::for_label(label.trim().as_bytes())
                .ok_or_else(|| ParserError::UnknownEncoding(label.to_string()))?,
        };
        let decoder = if encoding == UTF_8 {
            None
        } else {
            Some(encoding.new_decoder_with_bom_removal())
        };
        Ok(Self {
            decoder,
            encoding,
            position: 0,
            failed: false,
        })
    }

    /// `true` when chunks reach the tokenizer unmodified.
    #[must_use]
    pub fn is_passthrough(&self) -> bool {
        self.decoder.is_none()
    }

    /// The resolved source encoding.
    #[must_use]
    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// `true` once a malformed sequence has been seen.
    #[must_use]
    pub fn has_failed(&self) -> bool {
        self.failed
    }

    /// Decodes one chunk.
    ///
    /// In pass-through mode the chunk itself is returned. Otherwise the UTF-8
    /// output replaces the contents of `scratch` and a view of it is returned.
    /// Set `last` for the final call of the session so that an incomplete
    /// trailing sequence is reported.
    ///
    /// The second element is [`ParserError::Transcode`] when a malformed
    /// sequence was hit. The returned text then holds everything decoded
    /// before that sequence, and every later call returns no text and the
    /// same error.
    pub fn decode<'a>(
        &mut self,
        chunk: &'a [u8],
        scratch: &'a mut Vec<u8>,
        last: bool,
    ) -> (&'a [u8], Option<ParserError>) {
        if self.failed {
            return (&[], Some(self.failure(self.position)));
        }
        let Some(decoder) = self.decoder.as_mut() else {
            self.position += chunk.len() as u64;
            return (chunk, None);
        };

        scratch.clear();
        let mut read_total = 0;
        loop {
            let remaining = &chunk[read_total..];
            let reserve = decoder
                .max_utf8_buffer_length_without_replacement(remaining.len())
                .unwrap_or(remaining.len())
                .max(MIN_OUTPUT_RESERVE);
            let start = scratch.len();
            scratch.resize(start + reserve, 0);

            let (result, read, written) =
                decoder.decode_to_utf8_without_replacement(remaining, &mut scratch[start..], last);
            scratch.truncate(start + written);
            read_total += read;

            match result {
                DecoderResult::InputEmpty => break,
                DecoderResult::OutputFull => {}
                DecoderResult::Malformed(bad, after) => {
                    let offset = self.position + read_total as u64
                        - u64::from(bad)
                        - u64::from(after);
                    self.failed = true;
                    self.position = offset;
                    log::warn!(
                        "malformed {} input at byte offset {offset}",
                        self.encoding.name()
                    );
                    return (scratch.as_slice(), Some(self.failure(offset)));
                }
            }
        }
        self.position += read_total as u64;
        (scratch.as_slice(), None)
    }

    fn failure(&self, offset: u64) -> ParserError {
        ParserError::Transcode {
            encoding: self.encoding.name(),
            offset,
        }
    }
}
