//! Live connection tracking.

pub mod handle;
pub mod pool;
