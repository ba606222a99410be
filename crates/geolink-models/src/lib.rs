#![deny(missing_docs)]

//! # GeoLink Models
//!
//! Core data types for the GeoLink assistant channel: the conversational
//! interface of a 3D globe viewer whose reply stream doubles as a carrier
//! for camera-control commands.
//!
//! ## Type hierarchy
//!
//! ```text
//! Message                      transcript entry (user / assistant / system)
//! ├── Role
//! └── MessageState             accumulating | finalized
//!
//! Command                      embedded wire command, tagged by "action"
//! └── Command::FlyTo(FlyToParams)
//!
//! ChatRequest                  outbound request body for one send
//! └── ChatInputs
//! ```
//!
//! ## Module layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`message`] | Transcript entries (`Message`, `Role`, `MessageState`) |
//! | [`command`] | Embedded command protocol (`Command`, `FlyToParams`) |
//! | [`request`] | Outbound chat request wire types |

pub mod command;
pub mod error;
pub mod message;
pub mod request;

// Re-export all public types at crate root for convenience.
// Downstream crates can use `geolink_models::Message` directly.
pub use command::*;
pub use error::*;
pub use message::*;
pub use request::*;
