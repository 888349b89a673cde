//! Topic registry: manages all topics and their subscribers.

use std::collections::HashSet;

use dashmap::DashMap;
use tracing::debug;

use quill_core::types::id::{ConnectionId, DocumentId};

use super::subscription::SubscriptionTracker;
use super::topic::Topic;

/// Registry of all active document topics.
#[derive(Debug, Default)]
pub struct TopicRegistry {
    /// Topic → subscribed connections.
    topics: DashMap<Topic, HashSet<ConnectionId>>,
    /// Reverse index for O(1) teardown.
    subscriptions: SubscriptionTracker,
}

impl TopicRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes a connection to a topic.
    pub fn subscribe(&self, topic: Topic, conn_id: ConnectionId) {
        self.topics.entry(topic).or_default().insert(conn_id);
        self.subscriptions.add(conn_id, topic);
    }

    /// Unsubscribes a connection from a topic.
    pub fn unsubscribe(&self, topic: &Topic, conn_id: ConnectionId) {
        self.detach(topic, conn_id);
        self.subscriptions.remove(conn_id, topic);
    }

    /// Subscribes a connection to all three topics of a document.
    pub fn subscribe_document(&self, document_id: DocumentId, conn_id: ConnectionId) {
        for topic in Topic::all_for(document_id) {
            self.subscribe(topic, conn_id);
        }
        debug!(conn_id = %conn_id, document_id = %document_id, "Subscribed to document topics");
    }

    /// Unsubscribes a connection from all three topics of a document.
    pub fn unsubscribe_document(&self, document_id: DocumentId, conn_id: ConnectionId) {
        for topic in Topic::all_for(document_id) {
            self.unsubscribe(&topic, conn_id);
        }
        debug!(conn_id = %conn_id, document_id = %document_id, "Unsubscribed from document topics");
    }

    /// Unsubscribes a connection from every topic.
    pub fn unsubscribe_all(&self, conn_id: ConnectionId) {
        for topic in self.subscriptions.remove_all(conn_id) {
            self.detach(&topic, conn_id);
        }
    }

    /// Snapshot of the connections subscribed to a topic.
    pub fn subscribers(&self, topic: &Topic) -> Vec<ConnectionId> {
        self.topics
            .get(topic)
            .map(|subs| subs.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Connections subscribed to any topic of a document, each listed once.
    pub fn document_subscribers(&self, document_id: DocumentId) -> Vec<ConnectionId> {
        let mut conns: HashSet<ConnectionId> = HashSet::new();
        for topic in Topic::all_for(document_id) {
            if let Some(subs) = self.topics.get(&topic) {
                conns.extend(subs.iter().copied());
            }
        }
        conns.into_iter().collect()
    }

    /// Whether `conn_id` is subscribed to `topic`.
    pub fn is_subscribed(&self, topic: &Topic, conn_id: ConnectionId) -> bool {
        self.topics
            .get(topic)
            .is_some_and(|subs| subs.contains(&conn_id))
    }

    /// Number of topics a connection is subscribed to.
    pub fn subscription_count(&self, conn_id: ConnectionId) -> usize {
        self.subscriptions.count(conn_id)
    }

    /// Number of topics with at least one subscriber.
    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }

    fn detach(&self, topic: &Topic, conn_id: ConnectionId) {
        if let Some(mut subs) = self.topics.get_mut(topic) {
            subs.remove(&conn_id);
            if subs.is_empty() {
                drop(subs);
                self.topics.remove_if(topic, |_, s| s.is_empty());
            }
        }
    }
}
