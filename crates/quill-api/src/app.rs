//! Application builder: wires store, auth, services and the real-time engine
//! into shared state, and runs the HTTP server.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Router;
use tracing::{error, info, warn};

use quill_auth::provider::JwtAuthProvider;
use quill_core::config::AppConfig;
use quill_core::error::AppError;
use quill_core::result::AppResult;
use quill_realtime::server::RealtimeEngine;
use quill_service::document::DocumentService;
use quill_store::memory::MemoryDocumentStore;
use quill_store::timed::TimedStore;
use quill_store::traits::DocumentStore;

use crate::router::build_router;
use crate::state::AppState;

/// Builds the shared application state over an in-memory document store.
pub fn build_state(config: AppConfig) -> AppState {
    let memory: Arc<dyn DocumentStore> = Arc::new(MemoryDocumentStore::new());
    let store: Arc<dyn DocumentStore> = Arc::new(TimedStore::new(memory, &config.store));
    build_state_with_store(config, store)
}

/// Builds the shared application state over the given store.
pub fn build_state_with_store(config: AppConfig, store: Arc<dyn DocumentStore>) -> AppState {
    let auth = Arc::new(JwtAuthProvider::new(&config.auth));
    let documents = Arc::new(DocumentService::new(Arc::clone(&store)));
    let realtime = Arc::new(RealtimeEngine::new(config.realtime.clone(), store));

    AppState {
        config: Arc::new(config),
        auth,
        documents,
        realtime,
        started_at: Instant::now(),
    }
}

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
}

/// Runs the Quill server until Ctrl+C or SIGTERM.
///
/// On shutdown the real-time engine closes every session (publishing LEFT
/// where needed) within `server.shutdown_grace_seconds`.
pub async fn run_server(config: AppConfig) -> AppResult<()> {
    let addr = config.server.bind_address();
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);

    let state = build_state(config);
    let engine = Arc::clone(&state.realtime);
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    info!("Quill server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            info!("Shutdown signal received, closing sessions...");
            if tokio::time::timeout(grace, engine.shutdown()).await.is_err() {
                warn!(
                    grace_seconds = grace.as_secs(),
                    "Real-time engine did not shut down within the grace period"
                );
            }
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    info!("Quill server shut down gracefully");
    Ok(())
}

/// Waits for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
