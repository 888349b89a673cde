//! Real-time collaboration engine configuration.

use serde::{Deserialize, Serialize};

/// Real-time (WebSocket) engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Outbound message buffer per connection. A full buffer drops messages
    /// for that subscriber only.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer_size: usize,
    /// How many times an edit is re-fetched and re-applied after the store
    /// rejects the compare-and-swap.
    #[serde(default = "default_edit_retries")]
    pub edit_cas_retries: u32,
    /// Maximum accepted inbound frame size in bytes.
    #[serde(default = "default_max_message_bytes")]
    pub max_message_bytes: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            channel_buffer_size: default_channel_buffer(),
            edit_cas_retries: default_edit_retries(),
            max_message_bytes: default_max_message_bytes(),
        }
    }
}

fn default_channel_buffer() -> usize {
    256
}

fn default_edit_retries() -> u32 {
    1
}

fn default_max_message_bytes() -> usize {
    65_536
}
