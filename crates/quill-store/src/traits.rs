//! Document store trait for pluggable persistence backends.

use async_trait::async_trait;

use quill_core::result::AppResult;
use quill_core::types::id::{DocumentId, UserId};
use quill_entity::document::Document;

/// Durable storage for [`Document`]s.
///
/// Implementations must make `compare_and_swap_save` atomic with respect to
/// every other write of the same document: it succeeds only if the stored
/// version still equals `expected_version`.
#[async_trait]
pub trait DocumentStore: Send + Sync + std::fmt::Debug + 'static {
    /// Persist a brand-new document. Fails with a conflict if the id exists.
    async fn create(&self, doc: &Document) -> AppResult<Document>;

    /// Fetch a document by id. Returns `None` if it does not exist.
    async fn get(&self, id: DocumentId) -> AppResult<Option<Document>>;

    /// Replace the stored document with `doc` if its stored version is
    /// `expected_version`.
    ///
    /// Errors with `Conflict` (carrying the stored version) when the version
    /// moved, and `NotFound` when the document was deleted meanwhile.
    async fn compare_and_swap_save(
        &self,
        doc: &Document,
        expected_version: u64,
    ) -> AppResult<Document>;

    /// Delete a document by id. Returns `true` if something was deleted.
    async fn delete(&self, id: DocumentId) -> AppResult<bool>;

    /// All documents owned by `user_id` or shared with them.
    async fn list_for_user(&self, user_id: UserId) -> AppResult<Vec<Document>>;
}
