//! Document management handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use quill_core::types::id::{DocumentId, UserId};
use quill_entity::document::{Document, EditRequest};
use quill_service::document::CreateDocumentRequest;

use crate::dto::request::{AddCollaboratorRequest, UpdateDocumentRequest};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/documents
pub async fn list_documents(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<Document>>>, ApiError> {
    let docs = state.documents.list_documents(&auth).await?;
    Ok(Json(ApiResponse::ok(docs)))
}

/// POST /api/documents
pub async fn create_document(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateDocumentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Document>>), ApiError> {
    let doc = state.documents.create_document(&auth, req).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(doc))))
}

/// GET /api/documents/{id}
pub async fn get_document(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DocumentId>,
) -> Result<Json<ApiResponse<Document>>, ApiError> {
    let doc = state.documents.get_document(&auth, id).await?;
    Ok(Json(ApiResponse::ok(doc)))
}

/// PUT /api/documents/{id}
///
/// Whole-content replacement. Goes through the same versioned edit path as
/// socket edits, so live sessions receive it as a REPLACE.
pub async fn update_document(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DocumentId>,
    Json(req): Json<UpdateDocumentRequest>,
) -> Result<Json<ApiResponse<Document>>, ApiError> {
    let edit = EditRequest::replace(req.content, req.base_version);
    let doc = state
        .realtime
        .submit_edit(&auth.identity, id, edit)
        .await?;
    Ok(Json(ApiResponse::ok(doc)))
}

/// DELETE /api/documents/{id}
pub async fn delete_document(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DocumentId>,
) -> Result<StatusCode, ApiError> {
    state.documents.delete_document(&auth, id).await?;
    state.realtime.close_document(id).await;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/documents/{id}/collaborators
pub async fn add_collaborator(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DocumentId>,
    Json(req): Json<AddCollaboratorRequest>,
) -> Result<Json<ApiResponse<Document>>, ApiError> {
    let doc = state
        .documents
        .add_collaborator(&auth, id, req.user_id)
        .await?;
    Ok(Json(ApiResponse::ok(doc)))
}

/// DELETE /api/documents/{id}/collaborators/{user_id}
pub async fn remove_collaborator(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, user_id)): Path<(DocumentId, UserId)>,
) -> Result<Json<ApiResponse<Document>>, ApiError> {
    let doc = state
        .documents
        .remove_collaborator(&auth, id, user_id)
        .await?;
    if doc.role_of(user_id).is_none() {
        state.realtime.revoke_access(id, user_id).await;
    }
    Ok(Json(ApiResponse::ok(doc)))
}
