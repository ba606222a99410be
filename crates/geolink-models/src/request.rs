//! Outbound request wire types.
//!
//! One `send` issues a single JSON `POST` whose body is a [`ChatRequest`];
//! the response is a long-lived newline-framed stream consumed by the SDK.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ChatRequest
// ---------------------------------------------------------------------------

/// The JSON body of one streaming chat request.
///
/// # Examples
///
/// ```
/// use geolink_models::ChatRequest;
///
/// let req = ChatRequest::streaming("fly to the northern pit");
/// let json = serde_json::to_string(&req).unwrap();
/// assert!(json.contains("\"response_mode\":\"streaming\""));
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    /// Prompt inputs forwarded to the remote assistant.
    pub inputs: ChatInputs,
    /// Delivery mode; the SDK always requests `"streaming"`.
    pub response_mode: String,
}

impl ChatRequest {
    /// Build a streaming-mode request for the given prompt.
    pub fn streaming(prompt: impl Into<String>) -> Self {
        Self {
            inputs: ChatInputs {
                prompt: prompt.into(),
            },
            response_mode: "streaming".to_string(),
        }
    }
}

/// The `inputs` object of a [`ChatRequest`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ChatInputs {
    /// The operator's prompt text.
    pub prompt: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_wire_shape() {
        let req = ChatRequest::streaming("ping");
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["inputs"]["prompt"], "ping");
        assert_eq!(json["response_mode"], "streaming");
    }

    #[test]
    fn request_serde_roundtrip() {
        let req = ChatRequest::streaming("show me the mine");
        let json = serde_json::to_string(&req).unwrap();
        let back: ChatRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(req, back);
    }
}
