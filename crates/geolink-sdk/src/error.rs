//! SDK error types.
//!
//! [`ChatError`] is the single error type returned by every fallible
//! operation in the SDK. It wraps transport and serialization failures into
//! a unified enum; recoverable in-stream conditions (malformed command
//! blocks, skipped lines) are logged instead and never surface here.

/// Error type for all SDK operations.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// `send` was called while a stream is already in flight.
    #[error("a chat stream is already in flight")]
    SessionBusy,

    /// The service answered with a non-success HTTP status.
    #[error("chat request failed with HTTP status {code}")]
    Status {
        /// The HTTP status code received.
        code: u16,
    },

    /// HTTP request or body-read failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization / deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
