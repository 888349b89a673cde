//! # quill-realtime
//!
//! Real-time collaboration engine for Quill. Provides:
//!
//! - Per-document presence tracking with race-safe join/leave
//! - Optimistic, version-checked content edits serialized per document
//! - Topic fan-out (`document/{id}/collaborators|content|cursors`) to live connections
//! - The session gateway that dispatches client messages to the above
//!
//! The transport (WebSocket framing, authentication) lives in `quill-api`;
//! this crate only sees resolved identities and raw text frames.

pub mod broadcast;
pub mod channel;
pub mod connection;
pub mod edit;
pub mod gateway;
pub mod message;
pub mod metrics;
pub mod presence;
pub mod server;

pub use broadcast::router::{BroadcastRouter, TopicPayload};
pub use channel::registry::TopicRegistry;
pub use channel::topic::{Topic, TopicKind};
pub use edit::coordinator::EditCoordinator;
pub use gateway::{SessionContext, SessionGateway};
pub use presence::registry::{JoinOutcome, PresenceRegistry};
pub use server::RealtimeEngine;
