//! Pub/sub topics keyed by document.

pub mod registry;
pub mod subscription;
pub mod topic;
