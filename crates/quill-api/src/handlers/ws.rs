//! WebSocket upgrade handler.

use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::{IntoResponse, Response};
use futures::{SinkExt, StreamExt};
use tracing::{info, warn};

use quill_core::error::AppError;
use quill_entity::user::Identity;

use crate::error::ApiError;
use crate::state::AppState;

/// Query parameter for WebSocket authentication.
#[derive(Debug, serde::Deserialize)]
pub struct WsQuery {
    /// Identity token.
    pub token: Option<String>,
}

/// GET /ws?token={jwt}
///
/// The token is resolved once, before the upgrade; the identity is then fixed
/// for the lifetime of the socket.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Result<Response, ApiError> {
    let token = query
        .token
        .ok_or_else(|| AppError::authentication("Missing token query parameter"))?;
    let identity = state.auth.resolve_identity(&token).await?;

    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => return Ok(rejection.into_response()),
    };

    let max_bytes = state.config.realtime.max_message_bytes;
    Ok(ws
        .max_message_size(max_bytes)
        .on_upgrade(move |socket| handle_socket(state, identity, socket)))
}

/// Drives one established socket until either side closes or the server
/// shuts down.
async fn handle_socket(state: AppState, identity: Identity, socket: WebSocket) {
    let engine = state.realtime.clone();
    let (ctx, mut outbound_rx) = engine.connect(identity);
    let conn_id = ctx.connection_id;
    let mut shutdown_rx = engine.shutdown_receiver();

    let (mut ws_tx, mut ws_rx) = socket.split();

    let outbound_task = tokio::spawn(async move {
        while let Some(frame) = outbound_rx.recv().await {
            if ws_tx.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
        let _ = ws_tx.close().await;
    });

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            next = ws_rx.next() => match next {
                Some(Ok(Message::Text(text))) => engine.handle_frame(&ctx, text.as_str()).await,
                Some(Ok(Message::Close(_))) | None => break,
                // Ping/pong are answered by axum; binary frames are not part of the protocol.
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(conn_id = %conn_id, error = %e, "WebSocket error");
                    break;
                }
            },
        }
    }

    // Dropping the pool's sender ends the outbound task once queued frames are flushed.
    engine.disconnect(&ctx).await;
    if outbound_task.await.is_err() {
        warn!(conn_id = %conn_id, "Outbound task panicked");
    }

    info!(conn_id = %conn_id, user_id = %ctx.identity.user_id, "WebSocket connection closed");
}
