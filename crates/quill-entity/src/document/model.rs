//! Document entity model.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use quill_core::types::id::{DocumentId, UserId};

/// A shared text document.
///
/// `version` increases by exactly one for every accepted mutation, which is
/// what the store's compare-and-swap checks against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Unique document identifier.
    pub id: DocumentId,
    /// Human-readable title.
    pub title: String,
    /// Full text content.
    pub content: String,
    /// The user who created the document.
    pub owner: UserId,
    /// Users allowed to read and edit besides the owner.
    pub collaborators: BTreeSet<UserId>,
    /// Optimistic concurrency counter.
    pub version: u64,
    /// When the document was created.
    pub created_at: DateTime<Utc>,
    /// When the document was last mutated.
    pub last_modified: DateTime<Utc>,
}

/// The relationship a user has with a document.
///
/// Ordered by privilege: Owner > Collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentRole {
    /// Created the document; may manage collaborators and delete it.
    Owner,
    /// May read and edit content.
    Collaborator,
}

impl Document {
    /// Creates a fresh document at version 0 owned by `owner`.
    pub fn new(title: impl Into<String>, content: impl Into<String>, owner: UserId) -> Self {
        let now = Utc::now();
        Self {
            id: DocumentId::new(),
            title: title.into(),
            content: content.into(),
            owner,
            collaborators: BTreeSet::new(),
            version: 0,
            created_at: now,
            last_modified: now,
        }
    }

    /// Returns the role `user_id` holds on this document, if any.
    pub fn role_of(&self, user_id: UserId) -> Option<DocumentRole> {
        if self.owner == user_id {
            Some(DocumentRole::Owner)
        } else if self.collaborators.contains(&user_id) {
            Some(DocumentRole::Collaborator)
        } else {
            None
        }
    }

    /// Content length in characters (the unit edit offsets are expressed in).
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }

    /// Produces the successor of this document after one accepted mutation.
    pub fn next_revision(&self) -> Self {
        Self {
            version: self.version + 1,
            last_modified: Utc::now(),
            ..self.clone()
        }
    }
}
