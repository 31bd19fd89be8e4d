#![expect(clippy::inline_always)]

use alloc::collections::VecDeque;

use bstr::BString;

/// Ring of input bytes that were handed to the parser but not tokenized yet.
///
/// Bytes land here through `StreamingParser::push` and when a feed iterator is
/// dropped before it reached the end of its chunk.
#[derive(Debug, Default)]
pub(crate) struct Buffer {
    data: VecDeque<u8>,
}

impl Buffer {
    pub(crate) fn new() -> Self {
        Self {
            data: VecDeque::new(),
        }
    }

    pub(crate) fn push(&mut self, bytes: &[u8]) {
        self.data.extend(bytes);
    }

    pub(crate) fn len(&self) -> usize {
        self.data.len()
    }

    #[inline(always)]
    pub(crate) fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline(always)]
    pub(crate) fn next_byte(&mut self) -> Option<u8> {
        self.data.pop_front()
    }

    /// Moves the longest prefix of bytes satisfying `predicate` into `dst`.
    #[inline]
    pub(crate) fn copy_while<F>(&mut self, dst: &mut BString, mut predicate: F) -> usize
    where
        F: FnMut(u8) -> bool,
    {
        let mut copied = 0;
        loop {
            let (front_len, prefix) = {
                let (front, _) = self.data.as_slices();
                if front.is_empty() {
                    break;
                }
                let prefix = front
                    .iter()
                    .position(|&b| !predicate(b))
                    .unwrap_or(front.len());
                if prefix == 0 {
                    break;
                }
                dst.extend_from_slice(&front[..prefix]);
                (front.len(), prefix)
            };

            self.data.drain(..prefix);
            copied += prefix;

            if prefix < front_len {
                break;
            }
        }
        copied
    }
}

#[cfg(test)]
mod tests {
    use bstr::BString;

    use super::Buffer;

    #[test]
    fn copy_while_spans_ring_wraparound() {
        let mut buf = Buffer::new();
        buf.push(b"xxxx");
        for _ in 0..4 {
            buf.next_byte();
        }
        // Force the ring to wrap so the data sits in two slices.
        buf.push(b"abcdef,gh");
        let mut dst = BString::from("");
        assert_eq!(buf.copy_while(&mut dst, |b| b != b','), 6);
        assert_eq!(dst, "abcdef");
        assert_eq!(buf.next_byte(), Some(b','));
        assert_eq!(buf.len(), 2);
    }

    #[test]
    fn copy_while_stops_on_first_reject() {
        let mut buf = Buffer::new();
        buf.push(b",abc");
        let mut dst = BString::from("");
        assert_eq!(buf.copy_while(&mut dst, |b| b != b','), 0);
        assert!(dst.is_empty());
        assert!(!buf.is_empty());
    }
}
