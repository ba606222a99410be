//! Extraction of embedded command blocks from payload text.
//!
//! Assistant payload fragments may contain `<CMD>{ … }</CMD>` spans carrying
//! machine-readable instructions. The channel splits payloads at arbitrary
//! offsets, so a tag pair — or the tag literal itself — can straddle a
//! fragment boundary. [`CommandExtractor`] therefore keeps carry-over state
//! between fragments: any text from an unmatched open tag onward (or a
//! trailing partial prefix of the open tag) is held back until the close tag
//! arrives, the hold limit is exceeded, or the stream ends.
//!
//! A span that validates into a [`Command`] is removed from the display
//! text. A span that fails to parse is logged and left visible, so the
//! transcript always preserves what the assistant actually sent.

use geolink_models::Command;
use tracing::warn;

/// Opening delimiter of an embedded command block.
pub const OPEN_TAG: &str = "<CMD>";
/// Closing delimiter of an embedded command block.
pub const CLOSE_TAG: &str = "</CMD>";

/// Upper bound on text held back while waiting for a close tag. An open tag
/// whose close never arrives must not buffer the rest of the stream; past
/// this bound the held text is flushed back as plain display text.
const MAX_HELD_BYTES: usize = 8 * 1024;

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// The result of scanning one payload fragment.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Extraction {
    /// Text destined for the transcript, with validated command spans
    /// removed. May be empty when the fragment was pure command markup or
    /// is being held back pending a close tag.
    pub display: String,
    /// Commands validated from matched spans, in order of appearance.
    pub commands: Vec<Command>,
}

// ---------------------------------------------------------------------------
// CommandExtractor
// ---------------------------------------------------------------------------

/// Streaming scanner for `<CMD>…</CMD>` spans.
#[derive(Debug, Default)]
pub struct CommandExtractor {
    held: String,
}

impl CommandExtractor {
    /// Create an extractor with no carry-over state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan one payload fragment, prepended with any carry-over from the
    /// previous fragment.
    pub fn scan(&mut self, fragment: &str) -> Extraction {
        let mut text = std::mem::take(&mut self.held);
        text.push_str(fragment);

        let mut out = Extraction::default();
        let mut rest = text.as_str();

        loop {
            let Some(open_idx) = rest.find(OPEN_TAG) else {
                // No open tag; hold a trailing partial prefix of the tag
                // literal, emit everything before it.
                let keep = partial_open_tag_suffix(rest);
                let cut = rest.len() - keep;
                out.display.push_str(&rest[..cut]);
                self.held = rest[cut..].to_string();
                break;
            };

            let after_open = &rest[open_idx + OPEN_TAG.len()..];
            let Some(close_idx) = after_open.find(CLOSE_TAG) else {
                // Open without close yet: emit preceding text, hold the tag
                // and everything after it for the next fragment.
                out.display.push_str(&rest[..open_idx]);
                let held = &rest[open_idx..];
                if held.len() > MAX_HELD_BYTES {
                    warn!(
                        held_bytes = held.len(),
                        "command block exceeded hold limit without close tag; flushing as text"
                    );
                    out.display.push_str(held);
                    self.held.clear();
                } else {
                    self.held = held.to_string();
                }
                break;
            };

            out.display.push_str(&rest[..open_idx]);
            let body = &after_open[..close_idx];
            match Command::parse_block(body) {
                Ok(command) => out.commands.push(command),
                Err(e) => {
                    // Malformed blocks stay visible in the transcript.
                    warn!(error = %e, "discarding unparseable command block");
                    out.display.push_str(OPEN_TAG);
                    out.display.push_str(body);
                    out.display.push_str(CLOSE_TAG);
                }
            }
            rest = &after_open[close_idx + CLOSE_TAG.len()..];
        }

        out
    }

    /// Flush carry-over state at stream end.
    ///
    /// An unterminated command block is by then known to be plain text and
    /// is returned for display.
    pub fn finish(&mut self) -> String {
        std::mem::take(&mut self.held)
    }
}

/// Length of the longest proper prefix of [`OPEN_TAG`] that is a suffix of
/// `text`. Such a suffix may be the start of a tag split across fragments.
fn partial_open_tag_suffix(text: &str) -> usize {
    for len in (1..OPEN_TAG.len()).rev() {
        if text.ends_with(&OPEN_TAG[..len]) {
            return len;
        }
    }
    0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
