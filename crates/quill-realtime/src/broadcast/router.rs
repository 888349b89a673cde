//! Publishes document events to every subscriber of a topic.

use std::sync::Arc;

use tracing::{debug, error};

use quill_core::types::id::DocumentId;
use quill_entity::document::EditRequest;
use quill_entity::presence::{CursorEvent, PresenceEvent};

use crate::channel::registry::TopicRegistry;
use crate::channel::topic::{Topic, TopicKind};
use crate::connection::pool::ConnectionPool;
use crate::message::serializer::serialize_outbound;
use crate::message::types::OutboundMessage;
use crate::metrics::EngineMetrics;
use crate::metrics::messages::record_delivery;

/// An event bound for one of a document's topics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicPayload {
    /// JOINED/LEFT.
    Presence(PresenceEvent),
    /// A persisted edit, relayed as submitted.
    Content(EditRequest),
    /// A caret position.
    Cursor(CursorEvent),
}

impl TopicPayload {
    /// Topic family this payload is published on.
    pub fn kind(&self) -> TopicKind {
        match self {
            Self::Presence(_) => TopicKind::Presence,
            Self::Content(_) => TopicKind::Content,
            Self::Cursor(_) => TopicKind::Cursor,
        }
    }
}

/// Best-effort, at-most-once fan-out to live connections.
///
/// Each publish serializes once and queues the frame on every subscriber
/// without waiting; a slow subscriber loses frames instead of stalling the
/// publisher. Frames from one publisher reach each subscriber in publish
/// order.
#[derive(Debug, Clone)]
pub struct BroadcastRouter {
    /// Topic subscriptions.
    topics: Arc<TopicRegistry>,
    /// Live connections.
    pool: Arc<ConnectionPool>,
    /// Metrics.
    metrics: Arc<EngineMetrics>,
}

impl BroadcastRouter {
    /// Creates a router.
    pub fn new(
        topics: Arc<TopicRegistry>,
        pool: Arc<ConnectionPool>,
        metrics: Arc<EngineMetrics>,
    ) -> Self {
        Self {
            topics,
            pool,
            metrics,
        }
    }

    /// Publishes `payload` on the matching topic of `document_id`.
    ///
    /// Returns the number of subscribers the frame was queued for. Never
    /// fails: delivery problems are logged and counted, not propagated.
    pub fn publish(&self, document_id: DocumentId, payload: TopicPayload) -> usize {
        let topic = Topic::new(document_id, payload.kind());
        let message = match &payload {
            TopicPayload::Presence(event) => OutboundMessage::presence(&topic, event),
            TopicPayload::Content(edit) => OutboundMessage::content(&topic, document_id, edit),
            TopicPayload::Cursor(event) => OutboundMessage::cursor(&topic, event),
        };

        let frame = match serialize_outbound(&message) {
            Ok(frame) => frame,
            Err(e) => {
                error!(topic = %topic, error = %e, "Failed to serialize topic message");
                return 0;
            }
        };

        let subscribers = self.topics.subscribers(&topic);
        let mut delivered = 0;
        for conn_id in &subscribers {
            let sent = self.pool.send_to(conn_id, frame.clone());
            record_delivery(&self.metrics, sent);
            if sent {
                delivered += 1;
            }
        }

        debug!(
            topic = %topic,
            subscribers = subscribers.len(),
            delivered,
            "Published"
        );
        delivered
    }
}
