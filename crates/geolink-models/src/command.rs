//! The embedded command protocol carried inside assistant text.
//!
//! The assistant's reply stream is free text, but it may contain tagged
//! spans of the form `<CMD>{ "action": "...", "params": { ... } }</CMD>`.
//! The JSON between the tags deserializes into a [`Command`]. The action set
//! is closed: an unrecognized `action` is rejected at parse time and never
//! stored.
//!
//! Parameter defaults live here (not in the dispatcher) so that every
//! consumer of a parsed command observes the same resolved values.

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Camera height above the ellipsoid applied when a command omits `height`.
pub const DEFAULT_HEIGHT_METERS: f64 = 3000.0;
/// Heading applied when a command omits `heading`.
pub const DEFAULT_HEADING_DEGREES: f64 = 0.0;
/// Pitch applied when a command omits `pitch`. Looking down at the terrain.
pub const DEFAULT_PITCH_DEGREES: f64 = -45.0;
/// Roll applied when a command omits `roll`.
pub const DEFAULT_ROLL_DEGREES: f64 = 0.0;

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// A validated command extracted from the assistant stream.
///
/// New camera or scene actions will be added as additional variants.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "action", content = "params")]
pub enum Command {
    /// Reposition the viewport camera over a geographic point.
    #[serde(rename = "flyTo")]
    FlyTo(FlyToParams),
}

impl Command {
    /// Parse the JSON body of one command block.
    ///
    /// Distinguishes an unrecognized `action` (a well-formed block the
    /// protocol does not know) from malformed JSON, so callers can log
    /// each case accordingly. Both are recoverable: the caller discards
    /// the block and the stream continues.
    pub fn parse_block(body: &str) -> Result<Self, ModelError> {
        let value: serde_json::Value =
            serde_json::from_str(body).map_err(|e| ModelError::MalformedCommand {
                reason: e.to_string(),
            })?;

        let action = value
            .get("action")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| ModelError::MalformedCommand {
                reason: "missing string field `action`".to_string(),
            })?;

        if action != "flyTo" {
            return Err(ModelError::UnknownAction {
                action: action.to_string(),
            });
        }

        serde_json::from_value(value).map_err(|e| ModelError::MalformedCommand {
            reason: e.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// FlyToParams
// ---------------------------------------------------------------------------

/// Parameters of a [`Command::FlyTo`].
///
/// `lat`/`lon` are required; the remaining fields fall back to the protocol
/// defaults when omitted. All angles are in degrees on the wire.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FlyToParams {
    /// Target latitude in degrees.
    pub lat: f64,
    /// Target longitude in degrees.
    pub lon: f64,
    /// Camera height above the ellipsoid in meters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Camera heading in degrees.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<f64>,
    /// Camera pitch in degrees.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pitch: Option<f64>,
    /// Camera roll in degrees.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roll: Option<f64>,
}

impl FlyToParams {
    /// Target a point with all optional parameters left to their defaults.
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            height: None,
            heading: None,
            pitch: None,
            roll: None,
        }
    }

    /// Height in meters with the default applied.
    pub fn height_meters(&self) -> f64 {
        self.height.unwrap_or(DEFAULT_HEIGHT_METERS)
    }

    /// Heading in degrees with the default applied.
    pub fn heading_degrees(&self) -> f64 {
        self.heading.unwrap_or(DEFAULT_HEADING_DEGREES)
    }

    /// Pitch in degrees with the default applied.
    pub fn pitch_degrees(&self) -> f64 {
        self.pitch.unwrap_or(DEFAULT_PITCH_DEGREES)
    }

    /// Roll in degrees with the default applied.
    pub fn roll_degrees(&self) -> f64 {
        self.roll.unwrap_or(DEFAULT_ROLL_DEGREES)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
