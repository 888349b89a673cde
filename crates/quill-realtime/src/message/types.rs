//! Inbound and outbound message type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use quill_core::types::id::{DocumentId, UserId};
use quill_entity::document::{EditOperation, EditRequest};
use quill_entity::presence::PresenceStatus;
use quill_entity::user::Identity;

/// Messages sent by the client to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    /// Enter a document's collaborative session.
    Join {
        /// Target document.
        document_id: DocumentId,
    },
    /// Leave a document's session.
    Leave {
        /// Target document.
        document_id: DocumentId,
    },
    /// Change the document's content.
    Edit {
        /// Target document.
        document_id: DocumentId,
        /// Operation kind.
        operation: EditOperation,
        /// Inserted or replacement text.
        #[serde(default)]
        content: Option<String>,
        /// Start offset in characters.
        #[serde(default)]
        start_position: Option<usize>,
        /// End offset in characters (exclusive).
        #[serde(default)]
        end_position: Option<usize>,
        /// Version the client believed current.
        #[serde(default)]
        base_version: Option<u64>,
    },
    /// Caret position update.
    Cursor {
        /// Target document.
        document_id: DocumentId,
        /// Zero-based line.
        line: i64,
        /// Zero-based column.
        column: i64,
    },
}

impl InboundMessage {
    /// Document the message refers to.
    pub fn document_id(&self) -> DocumentId {
        match self {
            Self::Join { document_id }
            | Self::Leave { document_id }
            | Self::Edit { document_id, .. }
            | Self::Cursor { document_id, .. } => *document_id,
        }
    }

    /// Wire name of the message kind, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Join { .. } => "join",
            Self::Leave { .. } => "leave",
            Self::Edit { .. } => "edit",
            Self::Cursor { .. } => "cursor",
        }
    }
}

/// Messages sent by the server to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// Someone joined or left a document.
    Presence {
        /// Topic the event was published on.
        topic: String,
        /// User ID.
        user_id: UserId,
        /// Username.
        username: String,
        /// JOINED or LEFT.
        status: PresenceStatus,
        /// Document.
        document_id: DocumentId,
    },
    /// A persisted edit, relayed as submitted.
    Content {
        /// Topic the event was published on.
        topic: String,
        /// Document.
        document_id: DocumentId,
        /// The original edit payload.
        #[serde(flatten)]
        edit: EditRequest,
    },
    /// A collaborator's caret moved.
    Cursor {
        /// Topic the event was published on.
        topic: String,
        /// Document.
        document_id: DocumentId,
        /// Username of the collaborator.
        username: String,
        /// Zero-based line.
        line: i64,
        /// Zero-based column.
        column: i64,
    },
    /// Full document state, sent directly to a connection that just joined.
    DocumentState(DocumentState),
    /// Error reply to the originating connection.
    Error {
        /// Stable error code.
        code: String,
        /// Error description.
        message: String,
        /// Server version, present on conflicts.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        current_version: Option<u64>,
    },
}

/// Snapshot of a document and who is editing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentState {
    /// Document.
    pub document_id: DocumentId,
    /// Title.
    pub title: String,
    /// Current content.
    pub content: String,
    /// Current version.
    pub version: u64,
    /// Last modification time.
    pub last_modified: DateTime<Utc>,
    /// Identities currently joined.
    pub present: Vec<Identity>,
}
