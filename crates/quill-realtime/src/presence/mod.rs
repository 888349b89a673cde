//! Per-document presence tracking.

pub mod registry;

pub use registry::{JoinOutcome, PresenceRegistry};
