//! Top-level real-time engine that ties together all subsystems.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tracing::info;

use quill_core::config::RealtimeConfig;
use quill_core::error::AppError;
use quill_core::types::id::{DocumentId, UserId};
use quill_entity::document::{Document, EditRequest};
use quill_entity::user::Identity;
use quill_store::traits::DocumentStore;

use crate::broadcast::router::BroadcastRouter;
use crate::channel::registry::TopicRegistry;
use crate::connection::handle::ConnectionHandle;
use crate::connection::pool::ConnectionPool;
use crate::edit::coordinator::EditCoordinator;
use crate::gateway::{SessionContext, SessionGateway};
use crate::metrics::connections::{record_connect, record_disconnect};
use crate::metrics::{EngineMetrics, MetricsSnapshot};
use crate::presence::registry::PresenceRegistry;

/// Central real-time engine. Constructed once at startup and shared by every
/// connection task.
#[derive(Debug, Clone)]
pub struct RealtimeEngine {
    /// Message dispatch.
    pub gateway: Arc<SessionGateway>,
    /// Presence registry.
    pub presence: Arc<PresenceRegistry>,
    /// Topic subscriptions.
    pub topics: Arc<TopicRegistry>,
    /// Live connections.
    pub pool: Arc<ConnectionPool>,
    /// Metrics collector.
    pub metrics: Arc<EngineMetrics>,
    /// Configuration.
    config: RealtimeConfig,
    /// Shutdown signal sender.
    shutdown_tx: broadcast::Sender<()>,
}

impl RealtimeEngine {
    /// Creates a new real-time engine with all subsystems.
    pub fn new(config: RealtimeConfig, store: Arc<dyn DocumentStore>) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        let metrics = Arc::new(EngineMetrics::new());
        let topics = Arc::new(TopicRegistry::new());
        let pool = Arc::new(ConnectionPool::new());
        let presence = Arc::new(PresenceRegistry::new());
        let editor = Arc::new(EditCoordinator::new(store.clone(), &config));
        let router = BroadcastRouter::new(topics.clone(), pool.clone(), metrics.clone());
        let gateway = Arc::new(SessionGateway::new(
            &config,
            store,
            presence.clone(),
            editor,
            router,
            topics.clone(),
            pool.clone(),
            metrics.clone(),
        ));

        info!("Real-time engine initialized");

        Self {
            gateway,
            presence,
            topics,
            pool,
            metrics,
            config,
            shutdown_tx,
        }
    }

    /// Registers an authenticated connection.
    ///
    /// Returns the session context to pass to the gateway and the receiver
    /// the transport drains to write frames to the client.
    pub fn connect(&self, identity: Identity) -> (SessionContext, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(self.config.channel_buffer_size);
        let handle = Arc::new(ConnectionHandle::new(identity, tx));
        let ctx = SessionContext {
            connection_id: handle.id,
            identity: handle.identity.clone(),
        };

        self.pool.add(handle);
        record_connect(&self.metrics);

        info!(
            conn_id = %ctx.connection_id,
            user_id = %ctx.identity.user_id,
            "Connection registered"
        );

        (ctx, rx)
    }

    /// Handles one raw inbound frame.
    pub async fn handle_frame(&self, ctx: &SessionContext, raw: &str) {
        self.gateway.handle_frame(ctx, raw).await;
    }

    /// Unregisters a connection, publishing LEFT if it was joined. Safe to
    /// call more than once for the same connection.
    pub async fn disconnect(&self, ctx: &SessionContext) {
        self.gateway.disconnect(ctx).await;

        if let Some(handle) = self.pool.remove(&ctx.connection_id) {
            handle.mark_dead();
            record_disconnect(&self.metrics);
            info!(
                conn_id = %ctx.connection_id,
                user_id = %ctx.identity.user_id,
                "Connection unregistered"
            );
        }
    }

    /// Applies an edit submitted outside a socket session (REST) and relays
    /// it to the document's live sessions.
    pub async fn submit_edit(
        &self,
        identity: &Identity,
        document_id: DocumentId,
        edit: EditRequest,
    ) -> Result<Document, AppError> {
        self.gateway.submit_edit(identity, document_id, edit).await
    }

    /// Detaches `user_id`'s sessions from a document they can no longer read.
    pub async fn revoke_access(&self, document_id: DocumentId, user_id: UserId) -> usize {
        let reason = AppError::authorization(format!(
            "Access to document {document_id} was revoked"
        ));
        self.gateway
            .evict(document_id, Some(user_id), &reason)
            .await
    }

    /// Detaches every session from a deleted document.
    pub async fn close_document(&self, document_id: DocumentId) -> usize {
        let reason = AppError::not_found(format!("Document {document_id} was deleted"));
        self.gateway.evict(document_id, None, &reason).await
    }

    /// Current metric values.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Returns a shutdown receiver for graceful shutdown coordination.
    pub fn shutdown_receiver(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Signals connection tasks to stop and disconnects every connection.
    pub async fn shutdown(&self) {
        info!(
            connections = self.pool.connection_count(),
            "Shutting down real-time engine"
        );

        // No receivers just means no connection task is running.
        let _ = self.shutdown_tx.send(());

        for handle in self.pool.all_connections() {
            let ctx = SessionContext {
                connection_id: handle.id,
                identity: handle.identity.clone(),
            };
            self.disconnect(&ctx).await;
        }

        info!("Real-time engine shut down");
    }
}
