//! Client edit requests.

use serde::{Deserialize, Serialize};

/// Kind of content change carried by an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EditOperation {
    /// Insert `content` before `start_position`.
    Insert,
    /// Remove the characters in `[start_position, end_position)`.
    Delete,
    /// Replace the whole document content with `content`.
    Replace,
}

impl EditOperation {
    /// Return the operation as its wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Insert => "INSERT",
            Self::Delete => "DELETE",
            Self::Replace => "REPLACE",
        }
    }
}

impl std::fmt::Display for EditOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An edit as submitted by a client.
///
/// This is also the payload relayed verbatim to the document's content
/// topic once the edit has been persisted, so peers can apply the same delta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditRequest {
    /// Operation kind.
    pub operation: EditOperation,
    /// Text to insert, or the replacement content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Start offset in characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_position: Option<usize>,
    /// End offset in characters (exclusive).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_position: Option<usize>,
    /// The version the client believed current. `None` skips the staleness check.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_version: Option<u64>,
}

impl EditRequest {
    /// Builds a whole-content replacement.
    pub fn replace(content: impl Into<String>, base_version: Option<u64>) -> Self {
        Self {
            operation: EditOperation::Replace,
            content: Some(content.into()),
            start_position: None,
            end_position: None,
            base_version,
        }
    }

    /// Builds an insertion at `position`.
    pub fn insert(position: usize, content: impl Into<String>, base_version: Option<u64>) -> Self {
        Self {
            operation: EditOperation::Insert,
            content: Some(content.into()),
            start_position: Some(position),
            end_position: None,
            base_version,
        }
    }

    /// Builds a deletion of `[start, end)`.
    pub fn delete(start: usize, end: usize, base_version: Option<u64>) -> Self {
        Self {
            operation: EditOperation::Delete,
            content: None,
            start_position: Some(start),
            end_position: Some(end),
            base_version,
        }
    }
}
