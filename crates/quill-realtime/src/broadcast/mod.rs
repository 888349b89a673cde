//! Topic fan-out.

pub mod router;

pub use router::{BroadcastRouter, TopicPayload};
