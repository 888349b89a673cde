//! Session gateway: dispatches client messages for one live connection.

use std::sync::Arc;

use tracing::{debug, info, warn};

use quill_auth::acl::AccessPolicy;
use quill_core::config::RealtimeConfig;
use quill_core::error::{AppError, ErrorKind};
use quill_core::types::id::{ConnectionId, DocumentId, UserId};
use quill_entity::document::{Document, EditRequest};
use quill_entity::presence::CursorEvent;
use quill_entity::user::Identity;
use quill_store::traits::DocumentStore;

use crate::broadcast::router::{BroadcastRouter, TopicPayload};
use crate::channel::registry::TopicRegistry;
use crate::connection::pool::ConnectionPool;
use crate::edit::coordinator::EditCoordinator;
use crate::message::serializer::{deserialize_inbound, serialize_outbound};
use crate::message::types::{InboundMessage, OutboundMessage};
use crate::message::validator::validate_inbound;
use crate::metrics::EngineMetrics;
use crate::metrics::messages::{
    record_conflict, record_delivery, record_edit, record_error, record_received,
};
use crate::presence::registry::PresenceRegistry;

/// Per-connection context, created once when the connection is authenticated
/// and passed to every handler. The identity is never taken from client input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    /// The connection.
    pub connection_id: ConnectionId,
    /// Identity resolved at connection time.
    pub identity: Identity,
}

/// Routes the four client message kinds, plus disconnects, to presence,
/// editing, and fan-out.
///
/// Failures are answered with an `error` frame on the originating connection
/// only and never affect other sessions.
#[derive(Debug)]
pub struct SessionGateway {
    store: Arc<dyn DocumentStore>,
    presence: Arc<PresenceRegistry>,
    editor: Arc<EditCoordinator>,
    router: BroadcastRouter,
    topics: Arc<TopicRegistry>,
    pool: Arc<ConnectionPool>,
    metrics: Arc<EngineMetrics>,
    max_message_bytes: usize,
}

impl SessionGateway {
    /// Creates a gateway over the given subsystems.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: &RealtimeConfig,
        store: Arc<dyn DocumentStore>,
        presence: Arc<PresenceRegistry>,
        editor: Arc<EditCoordinator>,
        router: BroadcastRouter,
        topics: Arc<TopicRegistry>,
        pool: Arc<ConnectionPool>,
        metrics: Arc<EngineMetrics>,
    ) -> Self {
        Self {
            store,
            presence,
            editor,
            router,
            topics,
            pool,
            metrics,
            max_message_bytes: config.max_message_bytes,
        }
    }

    /// Validates, parses, and dispatches one raw text frame.
    pub async fn handle_frame(&self, ctx: &SessionContext, raw: &str) {
        record_received(&self.metrics);

        let parsed =
            validate_inbound(raw, self.max_message_bytes).and_then(|()| deserialize_inbound(raw));
        match parsed {
            Ok(msg) => self.dispatch(ctx, msg).await,
            Err(err) => self.reply_error(ctx, &err),
        }
    }

    /// Dispatches one parsed message.
    pub async fn dispatch(&self, ctx: &SessionContext, msg: InboundMessage) {
        let kind = msg.kind();
        let document_id = msg.document_id();

        let result = match msg {
            InboundMessage::Join { document_id } => self.join(ctx, document_id).await,
            InboundMessage::Leave { document_id } => {
                self.leave(ctx, Some(document_id)).await;
                Ok(())
            }
            InboundMessage::Edit {
                document_id,
                operation,
                content,
                start_position,
                end_position,
                base_version,
            } => {
                let edit = EditRequest {
                    operation,
                    content,
                    start_position,
                    end_position,
                    base_version,
                };
                self.submit_edit(&ctx.identity, document_id, edit)
                    .await
                    .map(|_| ())
            }
            InboundMessage::Cursor {
                document_id,
                line,
                column,
            } => self.cursor(ctx, document_id, line, column).await,
        };

        if let Err(err) = result {
            debug!(
                conn_id = %ctx.connection_id,
                document_id = %document_id,
                kind,
                error = %err,
                "Request failed"
            );
            self.reply_error(ctx, &err);
        }
    }

    /// Tears down the connection's session: LEFT is published if it was
    /// joined, and every subscription is dropped. Safe to call repeatedly.
    pub async fn disconnect(&self, ctx: &SessionContext) {
        self.leave(ctx, None).await;
        self.topics.unsubscribe_all(ctx.connection_id);
    }

    async fn join(&self, ctx: &SessionContext, document_id: DocumentId) -> Result<(), AppError> {
        let doc = self.load(document_id).await?;
        AccessPolicy::require_read(&doc, &ctx.identity)?;

        let conn_id = ctx.connection_id;
        self.topics.subscribe_document(document_id, conn_id);
        let outcome = self
            .presence
            .join(conn_id, document_id, ctx.identity.clone())
            .await;

        if let Some(departed) = outcome.departed {
            let previous = departed.document_id;
            self.router.publish(previous, TopicPayload::Presence(departed));
            self.topics.unsubscribe_document(previous, conn_id);
        }

        // A concurrent leave or disconnect won the race.
        if self.presence.binding(conn_id) != Some(document_id) {
            self.topics.unsubscribe_document(document_id, conn_id);
            return Ok(());
        }

        // Access may have been revoked, or the document deleted, while joining.
        let doc = match self.load(document_id).await.and_then(|doc| {
            AccessPolicy::require_read(&doc, &ctx.identity)?;
            Ok(doc)
        }) {
            Ok(doc) => doc,
            Err(err) => {
                self.topics.unsubscribe_document(document_id, conn_id);
                let left = self.presence.leave_document(conn_id, document_id).await;
                // A fresh join never announced itself; a re-join did earlier.
                if let (Some(event), None) = (left, &outcome.joined) {
                    self.router.publish(document_id, TopicPayload::Presence(event));
                }
                return Err(err);
            }
        };

        if let Some(joined) = outcome.joined {
            self.router.publish(document_id, TopicPayload::Presence(joined));
        }

        let present = self.presence.list_present(document_id).await;
        self.send(ctx, &OutboundMessage::document_state(&doc, present));
        Ok(())
    }

    /// `document_id: None` leaves whatever the session is joined to.
    async fn leave(&self, ctx: &SessionContext, document_id: Option<DocumentId>) {
        let conn_id = ctx.connection_id;
        let event = match document_id {
            Some(id) => self.presence.leave_document(conn_id, id).await,
            None => self.presence.leave(conn_id).await,
        };

        if let Some(event) = event {
            let document_id = event.document_id;
            self.router.publish(document_id, TopicPayload::Presence(event));
            self.topics.unsubscribe_document(document_id, conn_id);
        }
    }

    /// Applies an edit on behalf of `identity` and relays it on the content
    /// topic. Shared by socket sessions and REST writers; the caller is
    /// responsible for reporting the error.
    pub async fn submit_edit(
        &self,
        identity: &Identity,
        document_id: DocumentId,
        edit: EditRequest,
    ) -> Result<Document, AppError> {
        match self.editor.apply_edit(document_id, identity, &edit).await {
            Ok(saved) => {
                record_edit(&self.metrics);
                self.router.publish(document_id, TopicPayload::Content(edit));
                Ok(saved)
            }
            Err(err) => {
                if err.kind == ErrorKind::Conflict {
                    record_conflict(&self.metrics);
                }
                Err(err)
            }
        }
    }

    /// Detaches live sessions from a document after access to it is lost.
    ///
    /// With `user_id` set only that user's connections are affected,
    /// otherwise every connection on the document is. Each affected
    /// connection is left (LEFT is published to the remaining peers),
    /// unsubscribed from the document's topics, and sent `reason` as an
    /// `error` frame. Returns the number of connections evicted.
    pub async fn evict(
        &self,
        document_id: DocumentId,
        user_id: Option<UserId>,
        reason: &AppError,
    ) -> usize {
        let mut evicted = 0;
        for conn_id in self.topics.document_subscribers(document_id) {
            let Some(handle) = self.pool.get(&conn_id) else {
                self.topics.unsubscribe_document(document_id, conn_id);
                continue;
            };
            if user_id.is_some_and(|id| id != handle.identity.user_id) {
                continue;
            }

            let ctx = SessionContext {
                connection_id: conn_id,
                identity: handle.identity.clone(),
            };
            self.topics.unsubscribe_document(document_id, conn_id);
            if let Some(event) = self.presence.leave_document(conn_id, document_id).await {
                self.router.publish(document_id, TopicPayload::Presence(event));
            }
            self.reply_error(&ctx, reason);
            evicted += 1;
        }

        if evicted > 0 {
            info!(
                document_id = %document_id,
                evicted,
                reason = %reason,
                "Evicted sessions from document"
            );
        }
        evicted
    }

    async fn cursor(
        &self,
        ctx: &SessionContext,
        document_id: DocumentId,
        line: i64,
        column: i64,
    ) -> Result<(), AppError> {
        if self.presence.binding(ctx.connection_id) != Some(document_id) {
            return Err(AppError::validation(format!(
                "Join document {document_id} before sending cursor updates"
            )));
        }

        let event = CursorEvent {
            document_id,
            identity: ctx.identity.clone(),
            line,
            column,
        };
        self.router.publish(document_id, TopicPayload::Cursor(event));
        Ok(())
    }

    async fn load(&self, document_id: DocumentId) -> Result<Document, AppError> {
        self.store
            .get(document_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Document {document_id} not found")))
    }

    fn reply_error(&self, ctx: &SessionContext, err: &AppError) {
        record_error(&self.metrics);
        if err.kind == ErrorKind::Internal {
            warn!(conn_id = %ctx.connection_id, error = %err, "Internal error while handling message");
        }
        self.send(ctx, &OutboundMessage::error(err));
    }

    fn send(&self, ctx: &SessionContext, msg: &OutboundMessage) {
        match serialize_outbound(msg) {
            Ok(frame) => {
                let sent = self.pool.send_to(&ctx.connection_id, frame);
                record_delivery(&self.metrics, sent);
            }
            Err(e) => warn!(conn_id = %ctx.connection_id, error = %e, "Failed to serialize reply"),
        }
    }
}
