//! Individual connection handle.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::warn;

use quill_core::types::id::ConnectionId;
use quill_entity::user::Identity;

/// A handle to a single live connection.
///
/// Holds the sender half of the connection's outbound queue plus the identity
/// resolved when the connection was authenticated.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID.
    pub id: ConnectionId,
    /// Identity resolved at connection time.
    pub identity: Identity,
    /// Sender for serialized outbound frames.
    sender: mpsc::Sender<String>,
    /// When the connection was established.
    pub connected_at: DateTime<Utc>,
    /// Whether the connection is still alive.
    alive: AtomicBool,
}

impl ConnectionHandle {
    /// Create a new connection handle.
    pub fn new(identity: Identity, sender: mpsc::Sender<String>) -> Self {
        Self {
            id: ConnectionId::new(),
            identity,
            sender,
            connected_at: Utc::now(),
            alive: AtomicBool::new(true),
        }
    }

    /// Queue a frame without waiting. Returns `false` if the frame was dropped.
    ///
    /// A full queue drops the frame for this connection only; a closed queue
    /// marks the connection dead.
    pub fn send(&self, frame: String) -> bool {
        if !self.is_alive() {
            return false;
        }
        match self.sender.try_send(frame) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(conn_id = %self.id, "Outbound buffer full, dropping message");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_dead();
                false
            }
        }
    }

    /// Check if connection is alive.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Mark connection as dead.
    pub fn mark_dead(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use quill_core::types::id::UserId;

    #[test]
    fn full_buffer_drops_without_killing_connection() {
        let (tx, mut rx) = mpsc::channel(1);
        let handle = ConnectionHandle::new(Identity::new(UserId::new(), "alice"), tx);

        assert!(handle.send("one".to_string()));
        assert!(!handle.send("two".to_string()));
        assert!(handle.is_alive());
        assert_eq!(rx.try_recv().ok().as_deref(), Some("one"));
    }

    #[test]
    fn closed_receiver_marks_dead() {
        let (tx, rx) = mpsc::channel(4);
        let handle = ConnectionHandle::new(Identity::new(UserId::new(), "alice"), tx);
        drop(rx);

        assert!(!handle.send("lost".to_string()));
        assert!(!handle.is_alive());
    }
}
