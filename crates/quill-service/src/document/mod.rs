//! Document lifecycle and membership.

pub mod service;

pub use service::{CreateDocumentRequest, DocumentService};
