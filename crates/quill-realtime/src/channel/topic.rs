//! Canonical topic names.

use std::fmt;

use serde::{Deserialize, Serialize};

use quill_core::types::id::DocumentId;

/// The three topic families every document exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicKind {
    /// JOINED/LEFT events.
    Presence,
    /// Relayed edits.
    Content,
    /// Caret positions.
    Cursor,
}

impl TopicKind {
    /// All kinds, in subscription order.
    pub const ALL: [TopicKind; 3] = [Self::Presence, Self::Content, Self::Cursor];

    /// Last path segment of the topic name.
    pub fn segment(&self) -> &'static str {
        match self {
            Self::Presence => "collaborators",
            Self::Content => "content",
            Self::Cursor => "cursors",
        }
    }
}

/// A single document topic, rendered as `document/{id}/{segment}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Topic {
    /// Document the topic belongs to.
    pub document_id: DocumentId,
    /// Topic family.
    pub kind: TopicKind,
}

impl Topic {
    /// Creates a topic.
    pub fn new(document_id: DocumentId, kind: TopicKind) -> Self {
        Self { document_id, kind }
    }

    /// The three topics of a document.
    pub fn all_for(document_id: DocumentId) -> [Topic; 3] {
        TopicKind::ALL.map(|kind| Self::new(document_id, kind))
    }

    /// Wire name of the topic.
    pub fn name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "document/{}/{}", self.document_id, self.kind.segment())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_follow_document_path_scheme() {
        let id = DocumentId::new();
        assert_eq!(
            Topic::new(id, TopicKind::Presence).name(),
            format!("document/{id}/collaborators")
        );
        assert_eq!(
            Topic::new(id, TopicKind::Content).name(),
            format!("document/{id}/content")
        );
        assert_eq!(
            Topic::new(id, TopicKind::Cursor).name(),
            format!("document/{id}/cursors")
        );
    }

    #[test]
    fn all_for_covers_every_kind_once() {
        let id = DocumentId::new();
        let topics = Topic::all_for(id);
        assert_eq!(topics.len(), 3);
        assert!(topics.iter().all(|t| t.document_id == id));
        assert_ne!(topics[0], topics[1]);
        assert_ne!(topics[1], topics[2]);
    }
}
