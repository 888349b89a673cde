//! Cursor position value object.

use serde::{Deserialize, Serialize};

use quill_core::types::id::DocumentId;

use crate::user::Identity;

/// A collaborator's caret position.
///
/// Cursors are advisory: values are relayed as received, including
/// negative or out-of-bounds positions, and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorEvent {
    /// Document the cursor belongs to.
    pub document_id: DocumentId,
    /// Server-resolved identity of the sender.
    pub identity: Identity,
    /// Zero-based line.
    pub line: i64,
    /// Zero-based column.
    pub column: i64,
}
