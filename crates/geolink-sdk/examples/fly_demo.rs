//! Send one prompt to a running chat endpoint and print the transcript.
//!
//! Usage:
//!
//! ```text
//! GEOLINK_CHAT_URL=http://localhost:8000/api/chat \
//!     cargo run --example fly_demo -- "fly to the northern pit"
//! ```

use std::sync::Arc;

use geolink_sdk::{CameraFlight, ChatSession, Viewport};

/// Prints every camera flight instead of moving a real camera.
struct LoggingViewport;

impl Viewport for LoggingViewport {
    fn fly_to(&self, flight: CameraFlight) {
        println!(
            "→ camera flight: lat {:.4}°, lon {:.4}°, height {:.0} m over {:.1} s",
            flight.lat_degrees, flight.lon_degrees, flight.height_meters, flight.duration_seconds
        );
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialise structured logging (controlled via RUST_LOG env var).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let endpoint = std::env::var("GEOLINK_CHAT_URL")
        .unwrap_or_else(|_| "http://localhost:8000/api/chat".to_string());
    let prompt = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "where is the deepest pit?".to_string());

    let mut session = ChatSession::new(endpoint).with_viewport(Arc::new(LoggingViewport));
    session.send(&prompt).await?;

    for message in session.messages() {
        println!("[{}] {}", message.role, message.content);
    }

    Ok(())
}
