//! Constructors for outbound messages from domain events.

use quill_core::error::AppError;
use quill_core::types::id::DocumentId;
use quill_entity::document::{Document, EditRequest};
use quill_entity::presence::{CursorEvent, PresenceEvent};
use quill_entity::user::Identity;

use crate::channel::topic::Topic;

use super::types::{DocumentState, OutboundMessage};

impl OutboundMessage {
    /// Presence event as published on `topic`.
    pub fn presence(topic: &Topic, event: &PresenceEvent) -> Self {
        Self::Presence {
            topic: topic.name(),
            user_id: event.identity.user_id,
            username: event.identity.username.clone(),
            status: event.status,
            document_id: event.document_id,
        }
    }

    /// Relayed edit as published on `topic`.
    pub fn content(topic: &Topic, document_id: DocumentId, edit: &EditRequest) -> Self {
        Self::Content {
            topic: topic.name(),
            document_id,
            edit: edit.clone(),
        }
    }

    /// Cursor event as published on `topic`.
    pub fn cursor(topic: &Topic, event: &CursorEvent) -> Self {
        Self::Cursor {
            topic: topic.name(),
            document_id: event.document_id,
            username: event.identity.username.clone(),
            line: event.line,
            column: event.column,
        }
    }

    /// Join-time snapshot.
    pub fn document_state(doc: &Document, present: Vec<Identity>) -> Self {
        Self::DocumentState(DocumentState {
            document_id: doc.id,
            title: doc.title.clone(),
            content: doc.content.clone(),
            version: doc.version,
            last_modified: doc.last_modified,
            present,
        })
    }

    /// Error reply for `err`.
    pub fn error(err: &AppError) -> Self {
        Self::Error {
            code: err.code().to_string(),
            message: err.message.clone(),
            current_version: err.current_version,
        }
    }
}
