//! Subscription tracking: which connections are subscribed to which topics.

use std::collections::HashSet;

use dashmap::DashMap;

use quill_core::types::id::ConnectionId;

use super::topic::Topic;

/// Tracks connection-to-topic subscription mappings (reverse index).
#[derive(Debug, Default)]
pub struct SubscriptionTracker {
    /// Connection ID → set of topics.
    conn_to_topics: DashMap<ConnectionId, HashSet<Topic>>,
}

impl SubscriptionTracker {
    /// Creates a new subscription tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a subscription.
    pub fn add(&self, conn_id: ConnectionId, topic: Topic) {
        self.conn_to_topics.entry(conn_id).or_default().insert(topic);
    }

    /// Removes a subscription.
    pub fn remove(&self, conn_id: ConnectionId, topic: &Topic) {
        if let Some(mut topics) = self.conn_to_topics.get_mut(&conn_id) {
            topics.remove(topic);
            if topics.is_empty() {
                drop(topics);
                self.conn_to_topics.remove_if(&conn_id, |_, t| t.is_empty());
            }
        }
    }

    /// Returns the number of subscriptions for a connection.
    pub fn count(&self, conn_id: ConnectionId) -> usize {
        self.conn_to_topics
            .get(&conn_id)
            .map(|entry| entry.value().len())
            .unwrap_or(0)
    }

    /// Removes all subscriptions for a connection.
    pub fn remove_all(&self, conn_id: ConnectionId) -> HashSet<Topic> {
        self.conn_to_topics
            .remove(&conn_id)
            .map(|(_, topics)| topics)
            .unwrap_or_default()
    }
}
