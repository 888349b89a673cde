//! Version-checked content edits.

pub mod coordinator;
pub mod splice;

pub use coordinator::EditCoordinator;
