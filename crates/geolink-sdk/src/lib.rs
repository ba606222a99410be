//! # GeoLink SDK
//!
//! Streaming client for the **GeoLink** assistant channel: the
//! conversational interface of a 3D globe viewer whose reply stream carries
//! an embedded camera-command protocol alongside the human-readable text.
//!
//! The SDK provides:
//!
//! * [`ChatSession`] — owns the transcript and at most one in-flight
//!   streaming request; `send` / cancel with clean teardown.
//! * [`framing`] — byte-chunk to line decoding and the `data:` payload
//!   filter.
//! * [`CommandExtractor`] — finds `<CMD>…</CMD>` spans in payload text,
//!   across fragment boundaries, and validates their JSON bodies.
//! * [`Transcript`] — the append-only message assembler.
//! * [`Viewport`] — the injected camera collaborator commands are
//!   dispatched to.
//! * [`ChatError`] — unified error type for all SDK operations.
//!
//! Wire types from [`geolink_models`] are re-exported for convenience.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use geolink_sdk::{CameraFlight, ChatSession, Viewport};
//!
//! struct LoggingViewport;
//!
//! impl Viewport for LoggingViewport {
//!     fn fly_to(&self, flight: CameraFlight) {
//!         println!("flying to {}, {}", flight.lat_degrees, flight.lon_degrees);
//!     }
//! }
//!
//! # async fn run() -> Result<(), geolink_sdk::ChatError> {
//! let mut session = ChatSession::new("http://localhost:8000/api/chat")
//!     .with_viewport(Arc::new(LoggingViewport));
//!
//! let handle = session.handle(); // keep for cancellation
//! session.send("fly to the northern pit").await?;
//!
//! for message in session.messages() {
//!     println!("[{}] {}", message.role, message.content);
//! }
//! # let _ = handle;
//! # Ok(())
//! # }
//! ```

pub mod dispatch;
pub mod error;
pub mod extract;
pub mod framing;
pub mod session;
pub mod transcript;

pub use dispatch::{CameraFlight, Viewport, FLIGHT_DURATION_SECONDS};
pub use error::ChatError;
pub use extract::{CommandExtractor, Extraction};
pub use framing::{payload_of, LineScanner, DATA_MARKER};
pub use session::{ChatSession, SessionHandle, SessionStatus};
pub use transcript::Transcript;

// Re-export wire types from geolink-models for ergonomic usage.
pub use geolink_models::{ChatRequest, Command, FlyToParams, Message, MessageState, Role};
