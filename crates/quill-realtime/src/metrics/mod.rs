//! Realtime engine metrics.

pub mod connections;
pub mod messages;

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Engine-level metrics counters.
#[derive(Debug, Default)]
pub struct EngineMetrics {
    /// Total frames queued to clients
    pub messages_sent: AtomicU64,
    /// Frames dropped because a subscriber's buffer was full or closed
    pub messages_dropped: AtomicU64,
    /// Total frames received from clients
    pub messages_received: AtomicU64,
    /// Total connections established
    pub connections_total: AtomicU64,
    /// Connections currently open
    pub connections_active: AtomicU64,
    /// Edits persisted
    pub edits_applied: AtomicU64,
    /// Edits rejected for a stale version
    pub edit_conflicts: AtomicU64,
    /// Requests answered with an error
    pub errors_replied: AtomicU64,
}

impl EngineMetrics {
    /// Create new zeroed metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            messages_sent: self.messages_sent.load(Ordering::Relaxed),
            messages_dropped: self.messages_dropped.load(Ordering::Relaxed),
            messages_received: self.messages_received.load(Ordering::Relaxed),
            connections_total: self.connections_total.load(Ordering::Relaxed),
            connections_active: self.connections_active.load(Ordering::Relaxed),
            edits_applied: self.edits_applied.load(Ordering::Relaxed),
            edit_conflicts: self.edit_conflicts.load(Ordering::Relaxed),
            errors_replied: self.errors_replied.load(Ordering::Relaxed),
        }
    }
}

/// Serializable metrics snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Total frames queued to clients
    pub messages_sent: u64,
    /// Frames dropped for slow or gone subscribers
    pub messages_dropped: u64,
    /// Total frames received from clients
    pub messages_received: u64,
    /// Total connections ever established
    pub connections_total: u64,
    /// Currently active connections
    pub connections_active: u64,
    /// Edits persisted
    pub edits_applied: u64,
    /// Edits rejected for a stale version
    pub edit_conflicts: u64,
    /// Requests answered with an error
    pub errors_replied: u64,
}
