//! # quill-service
//!
//! Document management use cases for Quill. Services follow constructor
//! injection: all dependencies are provided at construction time via `Arc`
//! references, and every call receives the caller's [`RequestContext`].

pub mod context;
pub mod document;

pub use context::RequestContext;
pub use document::{CreateDocumentRequest, DocumentService};
