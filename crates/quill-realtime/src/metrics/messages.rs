//! Message metrics helpers.

use std::sync::atomic::Ordering;

use super::EngineMetrics;

/// Record the outcome of queueing one frame
pub fn record_delivery(metrics: &EngineMetrics, delivered: bool) {
    if delivered {
        metrics.messages_sent.fetch_add(1, Ordering::Relaxed);
    } else {
        metrics.messages_dropped.fetch_add(1, Ordering::Relaxed);
    }
}

/// Record a frame received from a client
pub fn record_received(metrics: &EngineMetrics) {
    metrics.messages_received.fetch_add(1, Ordering::Relaxed);
}

/// Record a persisted edit
pub fn record_edit(metrics: &EngineMetrics) {
    metrics.edits_applied.fetch_add(1, Ordering::Relaxed);
}

/// Record an edit rejected for a stale version
pub fn record_conflict(metrics: &EngineMetrics) {
    metrics.edit_conflicts.fetch_add(1, Ordering::Relaxed);
}

/// Record an error reply
pub fn record_error(metrics: &EngineMetrics) {
    metrics.errors_replied.fetch_add(1, Ordering::Relaxed);
}
