//! Timeout decorator for any [`DocumentStore`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use quill_core::config::StoreConfig;
use quill_core::error::AppError;
use quill_core::result::AppResult;
use quill_core::types::id::{DocumentId, UserId};
use quill_entity::document::Document;

use crate::traits::DocumentStore;

/// Wraps a store so that every call fails with a retryable `Transport`
/// error instead of hanging past the configured timeout.
#[derive(Debug, Clone)]
pub struct TimedStore {
    /// The wrapped store.
    inner: Arc<dyn DocumentStore>,
    /// Per-call upper bound.
    timeout: Duration,
}

impl TimedStore {
    /// Wraps `inner` using the timeout from `config`.
    pub fn new(inner: Arc<dyn DocumentStore>, config: &StoreConfig) -> Self {
        Self::with_timeout(inner, config.operation_timeout())
    }

    /// Wraps `inner` with an explicit timeout.
    pub fn with_timeout(inner: Arc<dyn DocumentStore>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    async fn bounded<T>(
        &self,
        op: &'static str,
        fut: impl Future<Output = AppResult<T>> + Send,
    ) -> AppResult<T> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!(op, timeout_ms = self.timeout.as_millis() as u64, "Store call timed out");
                Err(AppError::transport(format!(
                    "Document store '{op}' timed out after {}ms",
                    self.timeout.as_millis()
                )))
            }
        }
    }
}

#[async_trait]
impl DocumentStore for TimedStore {
    async fn create(&self, doc: &Document) -> AppResult<Document> {
        self.bounded("create", self.inner.create(doc)).await
    }

    async fn get(&self, id: DocumentId) -> AppResult<Option<Document>> {
        self.bounded("get", self.inner.get(id)).await
    }

    async fn compare_and_swap_save(
        &self,
        doc: &Document,
        expected_version: u64,
    ) -> AppResult<Document> {
        self.bounded(
            "compare_and_swap_save",
            self.inner.compare_and_swap_save(doc, expected_version),
        )
        .await
    }

    async fn delete(&self, id: DocumentId) -> AppResult<bool> {
        self.bounded("delete", self.inner.delete(id)).await
    }

    async fn list_for_user(&self, user_id: UserId) -> AppResult<Vec<Document>> {
        self.bounded("list_for_user", self.inner.list_for_user(user_id))
            .await
    }
}
