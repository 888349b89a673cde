//! Request DTOs.

use serde::{Deserialize, Serialize};

use quill_core::types::id::UserId;

/// Body of `POST /api/documents/{id}/collaborators`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddCollaboratorRequest {
    /// User to grant access.
    pub user_id: UserId,
}

/// Body of `PUT /api/documents/{id}`: replaces the whole content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateDocumentRequest {
    /// New content.
    pub content: String,
    /// Version the caller last saw; omitted means last-writer-wins.
    #[serde(default)]
    pub base_version: Option<u64>,
}
