use alloc::boxed::Box;

/// What happened after feeding one more byte into the record-delimiter
/// matcher?
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// Byte matched, but the delimiter is not finished yet.
    NeedMore,
    /// Byte matched *and* completed the delimiter.
    Done,
    /// Byte broke the match. The first `literal` bytes of the delimiter turned
    /// out to be data; matching continues with whatever partial match remains
    /// (possibly none), and the rejected byte has not been consumed.
    Reject { literal: usize },
}

/// Tracks how much of the record delimiter has been seen.
///
/// The progress survives chunk boundaries, so a `\r\n` delimiter whose `\r`
/// ends one chunk and whose `\n` starts the next is still recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RecordDelimiter {
    bytes: Box<[u8]>,
    matched: usize,
}

impl RecordDelimiter {
    pub(crate) fn new(bytes: &[u8]) -> Self {
        debug_assert!(!bytes.is_empty());
        Self {
            bytes: bytes.into(),
            matched: 0,
        }
    }

    #[inline]
    pub(crate) fn first(&self) -> u8 {
        self.bytes[0]
    }

    pub(crate) fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of delimiter bytes tentatively matched so far.
    pub(crate) fn matched(&self) -> usize {
        self.matched
    }

    pub(crate) fn is_matching(&self) -> bool {
        self.matched > 0
    }

    /// Feeds one byte.
    pub(crate) fn step(&mut self, byte: u8) -> Step {
        if byte == self.bytes[self.matched] {
            self.matched += 1;
            if self.matched == self.bytes.len() {
                self.matched = 0;
                return Step::Done;
            }
            return Step::NeedMore;
        }

        // Drop the shortest prefix that leaves the matched bytes' suffix
        // aligned with the start of the delimiter again.
        let matched = self.matched;
        let literal = (1..=matched)
            .find(|&shift| self.bytes[shift..matched] == self.bytes[..matched - shift])
            .unwrap_or(matched);
        self.matched = matched - literal;
        Step::Reject { literal }
    }

    /// Abandons a partial match at end of input; returns how many delimiter
    /// bytes were pending.
    pub(crate) fn take_pending(&mut self) -> usize {
        core::mem::take(&mut self.matched)
    }
}
