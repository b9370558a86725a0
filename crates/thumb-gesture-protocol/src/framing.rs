//! Newline framing over a byte stream.
//!
//! Reads from a socket arrive in arbitrary chunks; a message may be split
//! across reads or several messages may share one read. [`LineFramer`]
//! buffers bytes until a `\n` terminator is seen.

use std::mem;

use crate::error::ProtocolError;

/// Maximum accepted line length in bytes, excluding the terminator.
pub const MAX_LINE_LEN: usize = 1024;

/// Incremental splitter of a byte stream into text lines.
#[derive(Debug, Default)]
pub struct LineFramer {
    buf: Vec<u8>,
    /// Set while skipping the remainder of an overlong line.
    discarding: bool,
    discarded: usize,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed bytes from one read, returning every line completed by them.
    ///
    /// Returned lines do not include the `\n` terminator.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<Result<String, ProtocolError>> {
        let mut lines = Vec::new();

        for chunk in bytes.split_inclusive(|b| *b == b'\n') {
            let (body, terminated) = match chunk.split_last() {
                Some((&b'\n', body)) => (body, true),
                _ => (chunk, false),
            };

            if self.discarding {
                self.discarded += body.len();
                if terminated {
                    lines.push(Err(self.end_discard()));
                }
                continue;
            }

            self.buf.extend_from_slice(body);
            if terminated {
                lines.push(self.take_line());
            } else if self.buf.len() > MAX_LINE_LEN {
                self.discarding = true;
                self.discarded = self.buf.len();
                self.buf.clear();
            }
        }

        lines
    }

    /// Flush a trailing unterminated line at end of stream.
    pub fn finish(&mut self) -> Option<Result<String, ProtocolError>> {
        if self.discarding {
            return Some(Err(self.end_discard()));
        }
        if self.buf.is_empty() {
            return None;
        }
        Some(self.take_line())
    }

    /// Number of buffered bytes still waiting for a terminator.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    fn take_line(&mut self) -> Result<String, ProtocolError> {
        let bytes = mem::take(&mut self.buf);
        if bytes.len() > MAX_LINE_LEN {
            return Err(ProtocolError::LineTooLong {
                len: bytes.len(),
                limit: MAX_LINE_LEN,
            });
        }
        String::from_utf8(bytes).map_err(|e| ProtocolError::InvalidUtf8 {
            line: String::from_utf8_lossy(e.as_bytes()).into_owned(),
        })
    }

    fn end_discard(&mut self) -> ProtocolError {
        let len = mem::take(&mut self.discarded);
        self.discarding = false;
        ProtocolError::LineTooLong {
            len,
            limit: MAX_LINE_LEN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok_lines(results: Vec<Result<String, ProtocolError>>) -> Vec<String> {
        results.into_iter().map(Result::unwrap).collect()
    }

    #[test]
    fn splits_multiple_lines_in_one_read() {
        let mut framer = LineFramer::new();
        let lines = ok_lines(framer.push(b"left:1\nright:2\nleft:3\n"));
        assert_eq!(lines, vec!["left:1", "right:2", "left:3"]);
        assert_eq!(framer.pending(), 0);
    }

    #[test]
    fn buffers_partial_line_across_reads() {
        let mut framer = LineFramer::new();
        assert!(framer.push(b"lef").is_empty());
        assert!(framer.push(b"t:").is_empty());
        assert_eq!(framer.pending(), 5);
        let lines = ok_lines(framer.push(b"5\nrigh"));
        assert_eq!(lines, vec!["left:5"]);
        let lines = ok_lines(framer.push(b"t:2\n"));
        assert_eq!(lines, vec!["right:2"]);
    }

    #[test]
    fn finish_flushes_unterminated_tail() {
        let mut framer = LineFramer::new();
        assert_eq!(framer.push(b"left:1\nright:4").len(), 1);
        assert_eq!(framer.finish().unwrap().unwrap(), "right:4");
        assert!(framer.finish().is_none());
    }

    #[test]
    fn keeps_blank_lines() {
        let mut framer = LineFramer::new();
        let lines = ok_lines(framer.push(b"\n\nleft:1\n"));
        assert_eq!(lines, vec!["", "", "left:1"]);
    }

    #[test]
    fn invalid_utf8_is_reported_and_stream_continues() {
        let mut framer = LineFramer::new();
        let results = framer.push(b"\xff\xfe:1\nleft:2\n");
        assert_eq!(results.len(), 2);
        assert!(matches!(results[0], Err(ProtocolError::InvalidUtf8 { .. })));
        assert_eq!(results[1].as_deref(), Ok("left:2"));
    }

    #[test]
    fn overlong_line_is_dropped_once() {
        let mut framer = LineFramer::new();
        let long = vec![b'x'; MAX_LINE_LEN + 10];
        assert!(framer.push(&long).is_empty());
        assert!(framer.push(&long).is_empty());
        let results = framer.push(b"tail\nleft:1\n");
        assert_eq!(results.len(), 2);
        assert_eq!(
            results[0],
            Err(ProtocolError::LineTooLong {
                len: 2 * (MAX_LINE_LEN + 10) + 4,
                limit: MAX_LINE_LEN,
            })
        );
        assert_eq!(results[1].as_deref(), Ok("left:1"));
    }
}
