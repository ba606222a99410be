//! Dispatch of validated commands to the viewport collaborator.
//!
//! The viewport (3D camera + rendering) lives outside this crate and is only
//! ever *called*; it is injected as a [`Viewport`] trait object so the
//! streaming core is testable without a live renderer. Dispatching while no
//! viewport is attached — not yet constructed, or already torn down — drops
//! the command silently: a camera move with no camera is not a failure.

use geolink_models::{Command, FlyToParams};
use tracing::debug;

/// Fixed camera transition duration for every flight.
pub const FLIGHT_DURATION_SECONDS: f64 = 2.5;

// ---------------------------------------------------------------------------
// Viewport
// ---------------------------------------------------------------------------

/// The camera-move capability consumed by command dispatch.
pub trait Viewport: Send + Sync {
    /// Fly the camera to the given destination and orientation.
    fn fly_to(&self, flight: CameraFlight);
}

// ---------------------------------------------------------------------------
// CameraFlight
// ---------------------------------------------------------------------------

/// A fully resolved camera transition.
///
/// Defaults are already applied and orientation angles are converted to
/// radians, the viewport's angular unit; the wire protocol speaks degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFlight {
    /// Destination longitude in degrees.
    pub lon_degrees: f64,
    /// Destination latitude in degrees.
    pub lat_degrees: f64,
    /// Destination height above the ellipsoid in meters.
    pub height_meters: f64,
    /// Heading in radians.
    pub heading_radians: f64,
    /// Pitch in radians.
    pub pitch_radians: f64,
    /// Roll in radians.
    pub roll_radians: f64,
    /// Transition duration in seconds.
    pub duration_seconds: f64,
}

impl From<&FlyToParams> for CameraFlight {
    fn from(params: &FlyToParams) -> Self {
        Self {
            lon_degrees: params.lon,
            lat_degrees: params.lat,
            height_meters: params.height_meters(),
            heading_radians: params.heading_degrees().to_radians(),
            pitch_radians: params.pitch_degrees().to_radians(),
            roll_radians: params.roll_degrees().to_radians(),
            duration_seconds: FLIGHT_DURATION_SECONDS,
        }
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Apply one validated command against the viewport, if one is attached.
pub fn dispatch(command: &Command, viewport: Option<&dyn Viewport>) {
    match command {
        Command::FlyTo(params) => {
            let Some(viewport) = viewport else {
                debug!(lat = params.lat, lon = params.lon, "no viewport attached; dropping flyTo");
                return;
            };
            let flight = CameraFlight::from(params);
            debug!(
                lat = flight.lat_degrees,
                lon = flight.lon_degrees,
                height = flight.height_meters,
                "dispatching flyTo"
            );
            viewport.fly_to(flight);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
