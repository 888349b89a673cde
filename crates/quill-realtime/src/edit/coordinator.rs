//! Serialized, version-checked edits.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info};

use quill_auth::acl::AccessPolicy;
use quill_core::config::RealtimeConfig;
use quill_core::error::{AppError, ErrorKind};
use quill_core::types::id::DocumentId;
use quill_entity::document::{Document, EditRequest};
use quill_entity::user::Identity;
use quill_store::traits::DocumentStore;

use super::splice;

/// Applies edits to stored documents.
///
/// Edits to one document run one at a time behind a per-document mutex;
/// edits to different documents never contend. The store's compare-and-swap
/// still guards every save, so writers outside this coordinator (membership
/// changes, other processes) are detected and retried.
#[derive(Debug)]
pub struct EditCoordinator {
    /// Backing store.
    store: Arc<dyn DocumentStore>,
    /// Document ID → edit lock. Entries are dropped once no edit holds them.
    locks: DashMap<DocumentId, Arc<Mutex<()>>>,
    /// Extra fetch-and-reapply rounds after a rejected save.
    max_retries: u32,
}

impl EditCoordinator {
    /// Creates a coordinator over `store`.
    pub fn new(store: Arc<dyn DocumentStore>, config: &RealtimeConfig) -> Self {
        Self {
            store,
            locks: DashMap::new(),
            max_retries: config.edit_cas_retries,
        }
    }

    /// Applies `edit` on behalf of `identity` and returns the saved document.
    ///
    /// Fails with `NotFound` if the document is absent, `Authorization` if
    /// the caller may not edit, `Conflict` if `base_version` is stale or the
    /// save keeps losing, `Validation`/`InvalidRange` for malformed payloads,
    /// and `Transport` if the store times out on the last attempt. The
    /// document is unchanged on every failure.
    pub async fn apply_edit(
        &self,
        document_id: DocumentId,
        identity: &Identity,
        edit: &EditRequest,
    ) -> Result<Document, AppError> {
        let lock = self.lock_for(document_id);
        let result = {
            let _guard = lock.lock().await;
            self.apply_locked(document_id, identity, edit).await
        };
        drop(lock);
        self.release(document_id);

        if let Ok(saved) = &result {
            info!(
                document_id = %document_id,
                user_id = %identity.user_id,
                operation = %edit.operation,
                version = saved.version,
                "Edit applied"
            );
        }
        result
    }

    /// Number of documents with a live edit lock.
    pub fn active_locks(&self) -> usize {
        self.locks.len()
    }

    async fn apply_locked(
        &self,
        document_id: DocumentId,
        identity: &Identity,
        edit: &EditRequest,
    ) -> Result<Document, AppError> {
        let mut attempt = 0;
        loop {
            let doc = self
                .store
                .get(document_id)
                .await?
                .ok_or_else(|| AppError::not_found(format!("Document {document_id} not found")))?;

            AccessPolicy::require_edit(&doc, identity)?;

            if let Some(base) = edit.base_version {
                if base != doc.version {
                    return Err(AppError::conflict(
                        format!(
                            "Edit was based on version {base} but document {document_id} is at version {}",
                            doc.version
                        ),
                        doc.version,
                    ));
                }
            }

            let mut next = doc.next_revision();
            next.content = splice::apply(&doc.content, edit)?;

            match self.store.compare_and_swap_save(&next, doc.version).await {
                Ok(saved) => return Ok(saved),
                Err(err)
                    if matches!(err.kind, ErrorKind::Conflict | ErrorKind::Transport)
                        && attempt < self.max_retries =>
                {
                    attempt += 1;
                    debug!(
                        document_id = %document_id,
                        attempt,
                        error = %err,
                        "Save rejected, retrying edit"
                    );
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn lock_for(&self, document_id: DocumentId) -> Arc<Mutex<()>> {
        Arc::clone(&self.locks.entry(document_id).or_default())
    }

    fn release(&self, document_id: DocumentId) {
        // Only the map's own reference left means nobody is waiting.
        self.locks
            .remove_if(&document_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}
