//! Transcript entry types.
//!
//! A conversation with the assistant is an ordered, append-only sequence of
//! [`Message`] values. While a reply is still being streamed, exactly one
//! message — always the last one — sits in [`MessageState::Accumulating`]
//! and grows in place; every other entry is [`MessageState::Finalized`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// The author of a transcript entry.
#[derive(
    Serialize,
    Deserialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A prompt typed by the operator.
    User,
    /// A streamed reply from the remote assistant.
    Assistant,
    /// A locally generated notice (connection issues, etc.).
    System,
}

// ---------------------------------------------------------------------------
// MessageState
// ---------------------------------------------------------------------------

/// Whether a message is still receiving streamed content.
///
/// The state is an explicit discriminant rather than an ad-hoc flag so that
/// the single-accumulating-message invariant can be checked, not assumed.
#[derive(
    Serialize,
    Deserialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageState {
    /// Content is still arriving from an in-flight stream.
    Accumulating,
    /// Content is complete and will never change again.
    Finalized,
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// One entry in the conversation transcript.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Message {
    /// Unique message identifier (UUID v4).
    pub id: Uuid,
    /// Timestamp (UTC) at which the entry was created.
    pub timestamp: DateTime<Utc>,
    /// Who authored the entry.
    pub role: Role,
    /// The display text. For an accumulating message this is the exact
    /// in-order concatenation of every payload fragment delivered so far.
    pub content: String,
    /// Streaming state of the entry.
    pub state: MessageState,
}

impl Message {
    /// Create a finalized message with the given role and content.
    pub fn finalized(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            role,
            content: content.into(),
            state: MessageState::Finalized,
        }
    }

    /// Create an assistant message that will accumulate streamed content,
    /// seeded with the first payload fragment.
    pub fn accumulating(first_fragment: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            role: Role::Assistant,
            content: first_fragment.into(),
            state: MessageState::Accumulating,
        }
    }

    /// True while the message is still receiving streamed content.
    pub fn is_accumulating(&self) -> bool {
        self.state == MessageState::Accumulating
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
