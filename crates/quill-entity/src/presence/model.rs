//! Presence event value object.

use serde::{Deserialize, Serialize};

use quill_core::types::id::DocumentId;

use super::PresenceStatus;
use crate::user::Identity;

/// A single JOINED/LEFT transition. Constructed per event, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceEvent {
    /// Document the session is bound to.
    pub document_id: DocumentId,
    /// Server-resolved identity of the session.
    pub identity: Identity,
    /// Transition kind.
    pub status: PresenceStatus,
}

impl PresenceEvent {
    /// Creates a JOINED event.
    pub fn joined(document_id: DocumentId, identity: Identity) -> Self {
        Self {
            document_id,
            identity,
            status: PresenceStatus::Joined,
        }
    }

    /// Creates a LEFT event.
    pub fn left(document_id: DocumentId, identity: Identity) -> Self {
        Self {
            document_id,
            identity,
            status: PresenceStatus::Left,
        }
    }
}
