//! Document store configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings applied to every call into the document store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Upper bound for a single storage call in milliseconds.
    #[serde(default = "default_operation_timeout")]
    pub operation_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            operation_timeout_ms: default_operation_timeout(),
        }
    }
}

impl StoreConfig {
    /// Returns the operation timeout as a [`Duration`].
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }
}

fn default_operation_timeout() -> u64 {
    2_000
}
