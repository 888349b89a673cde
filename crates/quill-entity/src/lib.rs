//! # quill-entity
//!
//! Domain entity models for Quill. The `Document` is the only persisted
//! entity; identities, presence and cursor events are value objects that
//! live for the duration of a session or a single broadcast.

pub mod document;
pub mod presence;
pub mod user;

pub use document::{Document, DocumentRole, EditOperation, EditRequest};
pub use presence::{CursorEvent, PresenceEvent, PresenceStatus};
pub use user::Identity;
