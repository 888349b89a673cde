//! HTTP and WebSocket handlers.

pub mod document;
pub mod health;
pub mod ws;
