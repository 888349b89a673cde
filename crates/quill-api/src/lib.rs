//! # quill-api
//!
//! HTTP API layer for Quill built on Axum.
//!
//! Provides the document management REST endpoints, the `/ws` upgrade that
//! binds a socket to the real-time engine, CORS and request tracing, and the
//! mapping from `AppError` to HTTP responses.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, build_state, build_state_with_store, run_server};
pub use state::AppState;
