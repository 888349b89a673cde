//! Document CRUD and collaborator management.

use std::sync::Arc;

use tracing::info;

use quill_auth::acl::AccessPolicy;
use quill_core::error::AppError;
use quill_core::types::id::{DocumentId, UserId};
use quill_entity::document::Document;
use quill_store::traits::DocumentStore;

use crate::context::RequestContext;

/// Request to create a new document.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CreateDocumentRequest {
    /// Document title.
    pub title: String,
    /// Initial content.
    #[serde(default)]
    pub content: String,
}

/// Manages document creation, lookup, deletion, and collaborator membership.
///
/// Content edits do not go through here; they are applied by the real-time
/// edit coordinator so that peers receive them.
#[derive(Debug, Clone)]
pub struct DocumentService {
    /// Backing store.
    store: Arc<dyn DocumentStore>,
}

impl DocumentService {
    /// Creates a new document service.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Creates a document owned by the caller.
    pub async fn create_document(
        &self,
        ctx: &RequestContext,
        req: CreateDocumentRequest,
    ) -> Result<Document, AppError> {
        let title = req.title.trim();
        if title.is_empty() {
            return Err(AppError::validation("Document title must not be empty"));
        }

        let doc = Document::new(title, req.content, ctx.identity.user_id);
        let created = self.store.create(&doc).await?;

        info!(
            document_id = %created.id,
            owner = %ctx.identity.user_id,
            "Document created"
        );

        Ok(created)
    }

    /// Fetches a document the caller can read.
    pub async fn get_document(
        &self,
        ctx: &RequestContext,
        id: DocumentId,
    ) -> Result<Document, AppError> {
        let doc = self.load(id).await?;
        AccessPolicy::require_read(&doc, &ctx.identity)?;
        Ok(doc)
    }

    /// Lists documents the caller owns or collaborates on.
    pub async fn list_documents(&self, ctx: &RequestContext) -> Result<Vec<Document>, AppError> {
        self.store.list_for_user(ctx.identity.user_id).await
    }

    /// Deletes a document. Owner only.
    pub async fn delete_document(
        &self,
        ctx: &RequestContext,
        id: DocumentId,
    ) -> Result<(), AppError> {
        let doc = self.load(id).await?;
        AccessPolicy::require_manage(&doc, &ctx.identity)?;

        if !self.store.delete(id).await? {
            return Err(AppError::not_found(format!("Document {id} not found")));
        }

        info!(document_id = %id, "Document deleted");
        Ok(())
    }

    /// Grants `user_id` edit access. Owner only; adding the owner is rejected.
    pub async fn add_collaborator(
        &self,
        ctx: &RequestContext,
        id: DocumentId,
        user_id: UserId,
    ) -> Result<Document, AppError> {
        let doc = self.load(id).await?;
        AccessPolicy::require_manage(&doc, &ctx.identity)?;

        if user_id == doc.owner {
            return Err(AppError::validation(
                "The owner cannot be added as a collaborator",
            ));
        }
        if doc.collaborators.contains(&user_id) {
            return Ok(doc);
        }

        let mut next = doc.next_revision();
        next.collaborators.insert(user_id);
        let saved = self.store.compare_and_swap_save(&next, doc.version).await?;

        info!(document_id = %id, collaborator = %user_id, version = saved.version, "Collaborator added");
        Ok(saved)
    }

    /// Revokes `user_id`'s access. Owner only; removing a non-member is a no-op.
    pub async fn remove_collaborator(
        &self,
        ctx: &RequestContext,
        id: DocumentId,
        user_id: UserId,
    ) -> Result<Document, AppError> {
        let doc = self.load(id).await?;
        AccessPolicy::require_manage(&doc, &ctx.identity)?;

        if !doc.collaborators.contains(&user_id) {
            return Ok(doc);
        }

        let mut next = doc.next_revision();
        next.collaborators.remove(&user_id);
        let saved = self.store.compare_and_swap_save(&next, doc.version).await?;

        info!(document_id = %id, collaborator = %user_id, version = saved.version, "Collaborator removed");
        Ok(saved)
    }

    async fn load(&self, id: DocumentId) -> Result<Document, AppError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Document {id} not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use quill_core::error::ErrorKind;
    use quill_entity::user::Identity;
    use quill_store::memory::MemoryDocumentStore;

    fn ctx(name: &str) -> RequestContext {
        RequestContext::new(Identity::new(UserId::new(), name))
    }

    fn service() -> DocumentService {
        DocumentService::new(Arc::new(MemoryDocumentStore::new()))
    }

    async fn create(service: &DocumentService, owner: &RequestContext) -> Document {
        service
            .create_document(
                owner,
                CreateDocumentRequest {
                    title: "Plan".to_string(),
                    content: "hello".to_string(),
                },
            )
            .await
            .expect("create")
    }

    #[tokio::test]
    async fn creator_becomes_owner_at_version_zero() {
        let service = service();
        let alice = ctx("alice");
        let doc = create(&service, &alice).await;

        assert_eq!(doc.owner, alice.identity.user_id);
        assert_eq!(doc.version, 0);
        assert_eq!(service.get_document(&alice, doc.id).await.expect("get"), doc);
    }

    #[tokio::test]
    async fn blank_title_is_rejected() {
        let err = service()
            .create_document(
                &ctx("alice"),
                CreateDocumentRequest {
                    title: "   ".to_string(),
                    content: String::new(),
                },
            )
            .await
            .expect_err("blank title");
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn adding_collaborator_grants_read_and_bumps_version() {
        let service = service();
        let alice = ctx("alice");
        let bob = ctx("bob");
        let doc = create(&service, &alice).await;

        let err = service.get_document(&bob, doc.id).await.expect_err("no access yet");
        assert_eq!(err.kind, ErrorKind::Authorization);

        let updated = service
            .add_collaborator(&alice, doc.id, bob.identity.user_id)
            .await
            .expect("add");
        assert_eq!(updated.version, 1);
        assert!(service.get_document(&bob, doc.id).await.is_ok());

        let again = service
            .add_collaborator(&alice, doc.id, bob.identity.user_id)
            .await
            .expect("idempotent add");
        assert_eq!(again.version, 1);

        assert_eq!(service.list_documents(&bob).await.expect("list").len(), 1);
    }

    #[tokio::test]
    async fn only_owner_manages_membership_and_deletion() {
        let service = service();
        let alice = ctx("alice");
        let bob = ctx("bob");
        let doc = create(&service, &alice).await;
        service
            .add_collaborator(&alice, doc.id, bob.identity.user_id)
            .await
            .expect("add");

        let err = service
            .add_collaborator(&bob, doc.id, UserId::new())
            .await
            .expect_err("bob cannot manage");
        assert_eq!(err.kind, ErrorKind::Authorization);

        let err = service
            .delete_document(&bob, doc.id)
            .await
            .expect_err("bob cannot delete");
        assert_eq!(err.kind, ErrorKind::Authorization);

        service.delete_document(&alice, doc.id).await.expect("owner deletes");
        let err = service.get_document(&alice, doc.id).await.expect_err("gone");
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn owner_cannot_become_collaborator() {
        let service = service();
        let alice = ctx("alice");
        let doc = create(&service, &alice).await;

        let err = service
            .add_collaborator(&alice, doc.id, alice.identity.user_id)
            .await
            .expect_err("owner as collaborator");
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn removing_collaborator_revokes_access() {
        let service = service();
        let alice = ctx("alice");
        let bob = ctx("bob");
        let doc = create(&service, &alice).await;
        service
            .add_collaborator(&alice, doc.id, bob.identity.user_id)
            .await
            .expect("add");

        let updated = service
            .remove_collaborator(&alice, doc.id, bob.identity.user_id)
            .await
            .expect("remove");
        assert_eq!(updated.version, 2);
        assert!(service.get_document(&bob, doc.id).await.is_err());
    }
}
