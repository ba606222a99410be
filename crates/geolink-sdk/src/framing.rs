//! Byte-stream framing for the assistant channel.
//!
//! The channel delivers a long-lived response body as raw byte chunks whose
//! boundaries carry no meaning: a chunk may end mid-line or even mid-way
//! through a multi-byte UTF-8 sequence. [`LineScanner`] reassembles those
//! chunks into complete text lines, and [`payload_of`] keeps only the lines
//! that carry assistant content.

use tracing::warn;

/// Prefix identifying a transport line that carries assistant content.
///
/// Everything else on the wire (comments, keep-alives, event names) is
/// control noise and is dropped.
pub const DATA_MARKER: &str = "data:";

// ---------------------------------------------------------------------------
// LineScanner
// ---------------------------------------------------------------------------

/// Incremental byte-chunk to text-line decoder.
///
/// Bytes are buffered until a `\n` appears, so a UTF-8 sequence split across
/// two chunks is reassembled before decoding. A trailing `\r` is stripped
/// from each line. A completed line that still fails UTF-8 validation is
/// logged and skipped; the stream continues.
#[derive(Debug, Default)]
pub struct LineScanner {
    pending: Vec<u8>,
}

impl LineScanner {
    /// Create a scanner with an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk and return every line it completes, in order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(index) = self.pending.iter().position(|byte| *byte == b'\n') {
            let mut line: Vec<u8> = self.pending.drain(..=index).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            match String::from_utf8(line) {
                Ok(text) => lines.push(text),
                Err(e) => warn!(error = %e, "skipping line with invalid UTF-8"),
            }
        }
        lines
    }

    /// Consume the scanner at stream end.
    ///
    /// A non-empty remainder is an unterminated final line and is delivered
    /// as an implicit last line; an empty remainder yields `None`.
    pub fn finish(self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        match String::from_utf8(self.pending) {
            Ok(text) => Some(text),
            Err(e) => {
                warn!(error = %e, "discarding trailing bytes with invalid UTF-8");
                None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Payload filter
// ---------------------------------------------------------------------------

/// Return the payload of a transport line, or `None` for control lines.
///
/// The marker match is a case-sensitive literal prefix; whitespace after the
/// marker is stripped.
///
/// # Examples
///
/// ```
/// use geolink_sdk::framing::payload_of;
///
/// assert_eq!(payload_of("data: Hello"), Some("Hello"));
/// assert_eq!(payload_of("event: ping"), None);
/// ```
pub fn payload_of(line: &str) -> Option<&str> {
    line.strip_prefix(DATA_MARKER).map(str::trim_start)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_chunk_single_line() {
        let mut scanner = LineScanner::new();
        assert_eq!(scanner.push(b"data: hi\n"), vec!["data: hi"]);
    }

    #[test]
    fn line_split_across_chunks() {
        let mut scanner = LineScanner::new();
        assert!(scanner.push(b"data: He").is_empty());
        assert_eq!(scanner.push(b"llo\n"), vec!["data: Hello"]);
    }

    #[test]
    fn multiple_lines_in_one_chunk() {
        let mut scanner = LineScanner::new();
        assert_eq!(scanner.push(b"a\nb\nc\n"), vec!["a", "b", "c"]);
    }

    #[test]
    fn crlf_stripped() {
        let mut scanner = LineScanner::new();
        assert_eq!(scanner.push(b"data: x\r\n"), vec!["data: x"]);
    }

    #[test]
    fn multibyte_char_split_across_chunks() {
        // "蓝" is three bytes in UTF-8; split it in the middle.
        let bytes = "data: 蓝色\n".as_bytes();
        let mut scanner = LineScanner::new();
        assert!(scanner.push(&bytes[..8]).is_empty());
        assert_eq!(scanner.push(&bytes[8..]), vec!["data: 蓝色"]);
    }

    #[test]
    fn split_invariance_over_arbitrary_offsets() {
        let text = "data: première\ndata: ligne 蓝\n\ndata: fin\n";
        let whole: Vec<String> = LineScanner::new().push(text.as_bytes());

        let bytes = text.as_bytes();
        for split in 0..bytes.len() {
            let mut scanner = LineScanner::new();
            let mut lines = scanner.push(&bytes[..split]);
            lines.extend(scanner.push(&bytes[split..]));
            assert_eq!(lines, whole, "diverged at split offset {split}");
        }
    }

    #[test]
    fn byte_at_a_time_delivery() {
        let text = "data: one\ndata: two\n";
        let whole: Vec<String> = LineScanner::new().push(text.as_bytes());
        let mut scanner = LineScanner::new();
        let mut lines = Vec::new();
        for byte in text.as_bytes() {
            lines.extend(scanner.push(std::slice::from_ref(byte)));
        }
        assert_eq!(lines, whole);
    }

    #[test]
    fn finish_delivers_unterminated_final_line() {
        let mut scanner = LineScanner::new();
        assert!(scanner.push(b"data: tail without newline").is_empty());
        assert_eq!(
            scanner.finish(),
            Some("data: tail without newline".to_string())
        );
    }

    #[test]
    fn finish_empty_buffer_yields_none() {
        let mut scanner = LineScanner::new();
        assert_eq!(scanner.push(b"done\n"), vec!["done"]);
        assert_eq!(scanner.finish(), None);
    }

    #[test]
    fn invalid_utf8_line_skipped() {
        let mut scanner = LineScanner::new();
        let lines = scanner.push(b"ok\n\xff\xfe\nstill ok\n");
        assert_eq!(lines, vec!["ok", "still ok"]);
    }

    #[test]
    fn payload_marker_stripped() {
        assert_eq!(payload_of("data: Hello"), Some("Hello"));
        assert_eq!(payload_of("data:Hello"), Some("Hello"));
        assert_eq!(payload_of("data:   spaced"), Some("spaced"));
        assert_eq!(payload_of("data:"), Some(""));
    }

    #[test]
    fn control_lines_dropped() {
        assert_eq!(payload_of(""), None);
        assert_eq!(payload_of(": keep-alive"), None);
        assert_eq!(payload_of("event: message"), None);
        // Case-sensitive literal match.
        assert_eq!(payload_of("DATA: x"), None);
    }
}
