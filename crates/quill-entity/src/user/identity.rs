//! Authenticated identity, resolved once per connection.

use serde::{Deserialize, Serialize};

use quill_core::types::id::UserId;

/// Opaque reference to a user as seen by the collaboration layer.
///
/// Owned by the external user store; Quill only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    /// Stable user identifier.
    pub user_id: UserId,
    /// Display name shown to other collaborators.
    pub username: String,
}

impl Identity {
    /// Creates a new identity.
    pub fn new(user_id: UserId, username: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
        }
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.username, self.user_id)
    }
}
