//! The transcript assembler.
//!
//! [`Transcript`] turns the ordered payload-fragment sequence of one or more
//! streamed replies into a linear, append-only list of [`Message`] entries.
//! It is a two-state machine: *idle* (no accumulating message) and
//! *accumulating* (exactly one assistant message, always the last entry, is
//! still growing). The assembler enforces the invariant the rendering layer
//! relies on: at most one entry is ever non-finalized.

use geolink_models::{Message, MessageState, Role};

// ---------------------------------------------------------------------------
// Transcript
// ---------------------------------------------------------------------------

/// Ordered, append-only conversation transcript.
#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    /// Create an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only view of the message sequence.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// True while an assistant reply is mid-stream.
    pub fn is_accumulating(&self) -> bool {
        self.messages
            .last()
            .is_some_and(Message::is_accumulating)
    }

    /// Append a finalized user message.
    ///
    /// Does not touch any accumulating assistant message; a user entry can
    /// interleave only between replies, which the session guarantees.
    pub fn push_user(&mut self, text: impl Into<String>) {
        self.messages.push(Message::finalized(Role::User, text));
    }

    /// Route one payload fragment to the accumulating assistant message,
    /// creating it if the assembler is idle.
    ///
    /// The accumulating message's content is always the exact in-order
    /// concatenation of every fragment delivered to it.
    pub fn push_payload(&mut self, fragment: &str) {
        match self.messages.last_mut() {
            Some(last) if last.is_accumulating() => last.content.push_str(fragment),
            _ => self.messages.push(Message::accumulating(fragment)),
        }
    }

    /// Close out the accumulating message, if any. Idempotent.
    pub fn finalize(&mut self) {
        if let Some(last) = self.messages.last_mut() {
            if last.is_accumulating() {
                last.state = MessageState::Finalized;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
