//! JSON serialization for wire messages.

use quill_core::error::AppError;

use super::types::{InboundMessage, OutboundMessage};

/// Serialize an outbound message to a text frame.
pub fn serialize_outbound(msg: &OutboundMessage) -> Result<String, AppError> {
    Ok(serde_json::to_string(msg)?)
}

/// Deserialize an inbound text frame.
pub fn deserialize_inbound(text: &str) -> Result<InboundMessage, AppError> {
    Ok(serde_json::from_str(text)?)
}
