//! Presence and cursor value objects.

pub mod cursor;
pub mod model;

pub use cursor::CursorEvent;
pub use model::PresenceEvent;

use serde::{Deserialize, Serialize};

/// Whether an identity entered or left a document session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PresenceStatus {
    /// The identity joined the document.
    Joined,
    /// The identity left the document or disconnected.
    Left,
}

impl PresenceStatus {
    /// Return the status as its wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Joined => "JOINED",
            Self::Left => "LEFT",
        }
    }
}

impl std::fmt::Display for PresenceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
