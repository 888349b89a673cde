//! Application state shared across all handlers.

use std::sync::Arc;
use std::time::Instant;

use quill_auth::provider::AuthProvider;
use quill_core::config::AppConfig;
use quill_realtime::server::RealtimeEngine;
use quill_service::document::DocumentService;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Resolves bearer tokens to identities
    pub auth: Arc<dyn AuthProvider>,
    /// Document management
    pub documents: Arc<DocumentService>,
    /// Real-time collaboration engine
    pub realtime: Arc<RealtimeEngine>,
    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("documents", &self.documents)
            .field("realtime", &self.realtime)
            .finish_non_exhaustive()
    }
}
