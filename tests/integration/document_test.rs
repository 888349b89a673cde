//! Integration tests for the document management API.

use axum::http::StatusCode;
use serde_json::json;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new();

    let response = app.request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "ok");
    assert_eq!(response.body["data"]["connections"], 0);
}

#[tokio::test]
async fn test_list_documents_unauthenticated() {
    let app = TestApp::new();

    let response = app.request("GET", "/api/documents", None, None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "unauthenticated");
}

#[tokio::test]
async fn test_garbage_token_is_rejected() {
    let app = TestApp::new();

    let response = app
        .request("GET", "/api/documents", None, Some("not-a-jwt"))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_and_get_document() {
    let app = TestApp::new();
    let alice = app.user("alice");
    let token = app.token_for(&alice).await;

    let id = app.create_document(&token, "Plan", "hello").await;
    let response = app
        .request("GET", &format!("/api/documents/{id}"), None, Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let doc = &response.body["data"];
    assert_eq!(doc["title"], "Plan");
    assert_eq!(doc["content"], "hello");
    assert_eq!(doc["version"], 0);
    assert_eq!(doc["owner"], alice.user_id.to_string());
}

#[tokio::test]
async fn test_blank_title_is_rejected() {
    let app = TestApp::new();
    let token = app.token_for(&app.user("alice")).await;

    let response = app
        .request(
            "POST",
            "/api/documents",
            Some(json!({ "title": "   " })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "validation");
}

#[tokio::test]
async fn test_get_document_not_found() {
    let app = TestApp::new();
    let token = app.token_for(&app.user("alice")).await;

    let response = app
        .request(
            "GET",
            "/api/documents/00000000-0000-0000-0000-999999999999",
            None,
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "not_found");
}

#[tokio::test]
async fn test_stranger_cannot_read_or_delete() {
    let app = TestApp::new();
    let owner = app.token_for(&app.user("alice")).await;
    let stranger = app.token_for(&app.user("carol")).await;
    let id = app.create_document(&owner, "Private", "secret").await;

    let read = app
        .request("GET", &format!("/api/documents/{id}"), None, Some(&stranger))
        .await;
    assert_eq!(read.status, StatusCode::FORBIDDEN);
    assert_eq!(read.body["error"], "forbidden");

    let delete = app
        .request("DELETE", &format!("/api/documents/{id}"), None, Some(&stranger))
        .await;
    assert_eq!(delete.status, StatusCode::FORBIDDEN);

    let still_there = app
        .request("GET", &format!("/api/documents/{id}"), None, Some(&owner))
        .await;
    assert_eq!(still_there.status, StatusCode::OK);
}

#[tokio::test]
async fn test_collaborator_lifecycle() {
    let app = TestApp::new();
    let alice = app.user("alice");
    let bob = app.user("bob");
    let owner = app.token_for(&alice).await;
    let collaborator = app.token_for(&bob).await;
    let id = app.create_document(&owner, "Shared", "").await;

    let added = app
        .request(
            "POST",
            &format!("/api/documents/{id}/collaborators"),
            Some(json!({ "user_id": bob.user_id })),
            Some(&owner),
        )
        .await;
    assert_eq!(added.status, StatusCode::OK);
    assert_eq!(added.body["data"]["version"], 1);

    let listed = app
        .request("GET", "/api/documents", None, Some(&collaborator))
        .await;
    assert_eq!(listed.status, StatusCode::OK);
    let docs = listed.body["data"].as_array().expect("document list");
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0]["id"], id.as_str());

    // Collaborators may read but not manage membership.
    let forbidden = app
        .request(
            "DELETE",
            &format!("/api/documents/{id}/collaborators/{}", bob.user_id),
            None,
            Some(&collaborator),
        )
        .await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);

    let removed = app
        .request(
            "DELETE",
            &format!("/api/documents/{id}/collaborators/{}", bob.user_id),
            None,
            Some(&owner),
        )
        .await;
    assert_eq!(removed.status, StatusCode::OK);
    assert_eq!(removed.body["data"]["collaborators"], json!([]));

    let read = app
        .request("GET", &format!("/api/documents/{id}"), None, Some(&collaborator))
        .await;
    assert_eq!(read.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_owner_cannot_be_added_as_collaborator() {
    let app = TestApp::new();
    let alice = app.user("alice");
    let token = app.token_for(&alice).await;
    let id = app.create_document(&token, "Mine", "").await;

    let response = app
        .request(
            "POST",
            &format!("/api/documents/{id}/collaborators"),
            Some(json!({ "user_id": alice.user_id })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "validation");
}

#[tokio::test]
async fn test_owner_deletes_document() {
    let app = TestApp::new();
    let token = app.token_for(&app.user("alice")).await;
    let id = app.create_document(&token, "Scratch", "x").await;

    let deleted = app
        .request("DELETE", &format!("/api/documents/{id}"), None, Some(&token))
        .await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let gone = app
        .request("GET", &format!("/api/documents/{id}"), None, Some(&token))
        .await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_put_replaces_content_with_version_check() {
    let app = TestApp::new();
    let token = app.token_for(&app.user("alice")).await;
    let id = app.create_document(&token, "Draft", "hello").await;

    let updated = app
        .request(
            "PUT",
            &format!("/api/documents/{id}"),
            Some(json!({ "content": "goodbye", "base_version": 0 })),
            Some(&token),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["data"]["content"], "goodbye");
    assert_eq!(updated.body["data"]["version"], 1);

    let stale = app
        .request(
            "PUT",
            &format!("/api/documents/{id}"),
            Some(json!({ "content": "again", "base_version": 0 })),
            Some(&token),
        )
        .await;
    assert_eq!(stale.status, StatusCode::CONFLICT);
    assert_eq!(stale.body["error"], "conflict");
    assert_eq!(stale.body["current_version"], 1);

    let unconditional = app
        .request(
            "PUT",
            &format!("/api/documents/{id}"),
            Some(json!({ "content": "final" })),
            Some(&token),
        )
        .await;
    assert_eq!(unconditional.status, StatusCode::OK);
    assert_eq!(unconditional.body["data"]["version"], 2);
}

#[tokio::test]
async fn test_put_requires_edit_access() {
    let app = TestApp::new();
    let owner = app.token_for(&app.user("alice")).await;
    let stranger = app.token_for(&app.user("carol")).await;
    let id = app.create_document(&owner, "Private", "secret").await;

    let denied = app
        .request(
            "PUT",
            &format!("/api/documents/{id}"),
            Some(json!({ "content": "defaced" })),
            Some(&stranger),
        )
        .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    let missing = app
        .request(
            "PUT",
            "/api/documents/00000000-0000-0000-0000-999999999999",
            Some(json!({ "content": "x" })),
            Some(&owner),
        )
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    let unchanged = app
        .request("GET", &format!("/api/documents/{id}"), None, Some(&owner))
        .await;
    assert_eq!(unchanged.body["data"]["content"], "secret");
    assert_eq!(unchanged.body["data"]["version"], 0);
}
