//! # quill-store
//!
//! Persistence seam for Quill documents.
//!
//! - [`DocumentStore`]: the contract the collaboration core relies on,
//!   including an atomic compare-and-swap save on `version`
//! - [`MemoryDocumentStore`]: in-process backend built on `dashmap`
//! - [`TimedStore`]: decorator bounding every call with a timeout so no
//!   storage operation can block a session indefinitely

pub mod memory;
pub mod timed;
pub mod traits;

pub use memory::MemoryDocumentStore;
pub use timed::TimedStore;
pub use traits::DocumentStore;
