//! Error types for the `geolink-models` crate.
//!
//! All fallible parsing in this crate returns variants of [`ModelError`].

/// Errors produced when parsing or validating model types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// A command block did not contain valid JSON in the expected shape.
    #[error("malformed command block: {reason}")]
    MalformedCommand {
        /// Human-readable explanation.
        reason: String,
    },

    /// A command block named an action outside the closed action set.
    #[error("unknown command action \"{action}\"")]
    UnknownAction {
        /// The rejected action discriminator.
        action: String,
    },
}
