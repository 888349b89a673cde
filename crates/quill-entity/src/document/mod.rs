//! Shared document entity and edit requests.

pub mod edit;
pub mod model;

pub use edit::{EditOperation, EditRequest};
pub use model::{Document, DocumentRole};
