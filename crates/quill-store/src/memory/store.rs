//! In-memory document store using `dashmap`.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

use quill_core::error::AppError;
use quill_core::result::AppResult;
use quill_core::types::id::{DocumentId, UserId};
use quill_entity::document::Document;

use crate::traits::DocumentStore;

/// In-process [`DocumentStore`].
///
/// Each document lives in its own map entry, so the compare-and-swap on one
/// document never blocks writes to another. Data is lost on restart.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocumentStore {
    /// Document ID → current stored document.
    documents: Arc<DashMap<DocumentId, Document>>,
    /// Number of successful writes (create + save + delete).
    writes: Arc<AtomicU64>,
}

impl MemoryDocumentStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total successful writes since construction.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the store holds no documents.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn create(&self, doc: &Document) -> AppResult<Document> {
        match self.documents.entry(doc.id) {
            Entry::Occupied(existing) => Err(AppError::conflict(
                format!("Document {} already exists", doc.id),
                existing.get().version,
            )),
            Entry::Vacant(slot) => {
                slot.insert(doc.clone());
                self.record_write();
                debug!(document_id = %doc.id, "Document created");
                Ok(doc.clone())
            }
        }
    }

    async fn get(&self, id: DocumentId) -> AppResult<Option<Document>> {
        Ok(self.documents.get(&id).map(|entry| entry.value().clone()))
    }

    async fn compare_and_swap_save(
        &self,
        doc: &Document,
        expected_version: u64,
    ) -> AppResult<Document> {
        let mut stored = self
            .documents
            .get_mut(&doc.id)
            .ok_or_else(|| AppError::not_found(format!("Document {} not found", doc.id)))?;

        if stored.version != expected_version {
            return Err(AppError::conflict(
                format!(
                    "Document {} is at version {}, expected {}",
                    doc.id, stored.version, expected_version
                ),
                stored.version,
            ));
        }

        *stored = doc.clone();
        drop(stored);
        self.record_write();

        debug!(document_id = %doc.id, version = doc.version, "Document saved");
        Ok(doc.clone())
    }

    async fn delete(&self, id: DocumentId) -> AppResult<bool> {
        let removed = self.documents.remove(&id).is_some();
        if removed {
            self.record_write();
        }
        Ok(removed)
    }

    async fn list_for_user(&self, user_id: UserId) -> AppResult<Vec<Document>> {
        let mut docs: Vec<Document> = self
            .documents
            .iter()
            .filter(|entry| entry.owner == user_id || entry.collaborators.contains(&user_id))
            .map(|entry| entry.value().clone())
            .collect();
        docs.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
        Ok(docs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use quill_core::error::ErrorKind;

    #[tokio::test]
    async fn cas_succeeds_only_against_current_version() {
        let store = MemoryDocumentStore::new();
        let doc = store
            .create(&Document::new("t", "a", UserId::new()))
            .await
            .expect("create");

        let next = doc.next_revision();
        store
            .compare_and_swap_save(&next, doc.version)
            .await
            .expect("first save wins");

        let err = store
            .compare_and_swap_save(&doc.next_revision(), doc.version)
            .await
            .expect_err("stale save loses");
        assert_eq!(err.kind, ErrorKind::Conflict);
        assert_eq!(err.current_version, Some(1));
        assert_eq!(store.write_count(), 2);
    }

    #[tokio::test]
    async fn cas_on_deleted_document_is_not_found() {
        let store = MemoryDocumentStore::new();
        let doc = store
            .create(&Document::new("t", "", UserId::new()))
            .await
            .expect("create");
        assert!(store.delete(doc.id).await.expect("delete"));

        let err = store
            .compare_and_swap_save(&doc.next_revision(), 0)
            .await
            .expect_err("gone");
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert!(!store.delete(doc.id).await.expect("second delete"));
    }

    #[tokio::test]
    async fn list_for_user_covers_owner_and_collaborator() {
        let store = MemoryDocumentStore::new();
        let alice = UserId::new();
        let bob = UserId::new();

        let mut shared = Document::new("shared", "", alice);
        shared.collaborators.insert(bob);
        store.create(&shared).await.expect("create");
        store
            .create(&Document::new("private", "", alice))
            .await
            .expect("create");

        assert_eq!(store.list_for_user(alice).await.expect("list").len(), 2);
        let bobs = store.list_for_user(bob).await.expect("list");
        assert_eq!(bobs.len(), 1);
        assert_eq!(bobs[0].id, shared.id);
    }

    #[tokio::test]
    async fn create_rejects_duplicate_id() {
        let store = MemoryDocumentStore::new();
        let doc = Document::new("t", "", UserId::new());
        store.create(&doc).await.expect("create");
        let err = store.create(&doc).await.expect_err("duplicate");
        assert_eq!(err.kind, ErrorKind::Conflict);
    }
}
