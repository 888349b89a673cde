//! Read / edit / manage decisions over a document's owner and collaborators.
//!
//! There is no separate read-only role: anyone who may read may also edit.
//! Checks are pure and total; rejecting a missing document is the caller's job.

use tracing::warn;

use quill_core::error::AppError;
use quill_entity::document::{Document, DocumentRole};
use quill_entity::user::Identity;

/// Stateless access policy for documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessPolicy;

impl AccessPolicy {
    /// Whether `identity` may view the document and join its session.
    pub fn can_read(doc: &Document, identity: &Identity) -> bool {
        Self::can_edit(doc, identity)
    }

    /// Whether `identity` may change the document's content.
    pub fn can_edit(doc: &Document, identity: &Identity) -> bool {
        doc.role_of(identity.user_id).is_some()
    }

    /// Whether `identity` may add/remove collaborators or delete the document.
    pub fn can_manage(doc: &Document, identity: &Identity) -> bool {
        doc.role_of(identity.user_id) == Some(DocumentRole::Owner)
    }

    /// Returns `Ok(())` if readable, otherwise an authorization error.
    pub fn require_read(doc: &Document, identity: &Identity) -> Result<(), AppError> {
        Self::require(Self::can_read(doc, identity), doc, identity, "read")
    }

    /// Returns `Ok(())` if editable, otherwise an authorization error.
    pub fn require_edit(doc: &Document, identity: &Identity) -> Result<(), AppError> {
        Self::require(Self::can_edit(doc, identity), doc, identity, "edit")
    }

    /// Returns `Ok(())` if manageable, otherwise an authorization error.
    pub fn require_manage(doc: &Document, identity: &Identity) -> Result<(), AppError> {
        Self::require(Self::can_manage(doc, identity), doc, identity, "manage")
    }

    fn require(
        allowed: bool,
        doc: &Document,
        identity: &Identity,
        action: &'static str,
    ) -> Result<(), AppError> {
        if allowed {
            return Ok(());
        }

        warn!(
            security = true,
            document_id = %doc.id,
            user_id = %identity.user_id,
            action,
            "Document access denied"
        );

        Err(AppError::authorization(format!(
            "User '{}' may not {action} document {}",
            identity.username, doc.id
        )))
    }
}
