//! Integration tests for the WebSocket endpoint.

use std::time::Duration;

use axum::http::StatusCode;
use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::helpers::TestApp;

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn connect(addr: std::net::SocketAddr, token: &str) -> Client {
    let (ws, _) = connect_async(format!("ws://{addr}/ws?token={token}"))
        .await
        .expect("WebSocket handshake failed");
    ws
}

async fn send(ws: &mut Client, msg: Value) {
    ws.send(Message::text(msg.to_string()))
        .await
        .expect("Failed to send frame");
}

/// Reads frames until one of the given `type` arrives.
async fn next_of_type(ws: &mut Client, kind: &str) -> Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .unwrap_or_else(|_| panic!("Timed out waiting for {kind}"))
            .expect("Stream ended")
            .expect("WebSocket error");
        if let Message::Text(text) = msg {
            let frame: Value = serde_json::from_str(text.as_str()).expect("Invalid JSON frame");
            if frame["type"] == kind {
                return frame;
            }
        }
    }
}

#[tokio::test]
async fn test_ws_upgrade_without_token() {
    let app = TestApp::new();

    let response = app.request("GET", "/ws", None, None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_ws_upgrade_with_bad_token() {
    let app = TestApp::new();

    let response = app.request("GET", "/ws?token=forged", None, None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "unauthenticated");
}

#[tokio::test]
async fn test_ws_valid_token_without_upgrade_headers() {
    let app = TestApp::new();
    let token = app.token_for(&app.user("alice")).await;

    let response = app
        .request("GET", &format!("/ws?token={token}"), None, None)
        .await;

    assert!(response.status.is_client_error());
    assert_ne!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_collaborative_session_end_to_end() {
    let app = TestApp::new();
    let alice = app.user("alice");
    let bob = app.user("bob");
    let alice_token = app.token_for(&alice).await;
    let bob_token = app.token_for(&bob).await;

    let id = app.create_document(&alice_token, "Notes", "hello").await;
    let added = app
        .request(
            "POST",
            &format!("/api/documents/{id}/collaborators"),
            Some(json!({ "user_id": bob.user_id })),
            Some(&alice_token),
        )
        .await;
    assert_eq!(added.status, StatusCode::OK);

    let addr = app.spawn_server().await;
    let mut alice_ws = connect(addr, &alice_token).await;
    let mut bob_ws = connect(addr, &bob_token).await;

    send(&mut alice_ws, json!({ "type": "join", "document_id": id })).await;
    let state = next_of_type(&mut alice_ws, "document_state").await;
    assert_eq!(state["content"], "hello");
    assert_eq!(state["version"], 1);

    send(&mut bob_ws, json!({ "type": "join", "document_id": id })).await;
    let joined = next_of_type(&mut alice_ws, "presence").await;
    assert_eq!(joined["status"], "JOINED");
    assert_eq!(joined["username"], "bob");

    let state = next_of_type(&mut bob_ws, "document_state").await;
    let present: Vec<&str> = state["present"]
        .as_array()
        .expect("present list")
        .iter()
        .map(|p| p["username"].as_str().expect("username"))
        .collect();
    assert_eq!(present, vec!["alice", "bob"]);

    send(
        &mut bob_ws,
        json!({
            "type": "edit",
            "document_id": id,
            "operation": "INSERT",
            "content": "!",
            "start_position": 5,
            "base_version": 1
        }),
    )
    .await;
    let relayed = next_of_type(&mut alice_ws, "content").await;
    assert_eq!(relayed["operation"], "INSERT");
    assert_eq!(relayed["content"], "!");

    let stored = app
        .request("GET", &format!("/api/documents/{id}"), None, Some(&alice_token))
        .await;
    assert_eq!(stored.body["data"]["content"], "hello!");
    assert_eq!(stored.body["data"]["version"], 2);

    // Replaying the same base version is now stale.
    send(
        &mut bob_ws,
        json!({
            "type": "edit",
            "document_id": id,
            "operation": "INSERT",
            "content": "?",
            "start_position": 0,
            "base_version": 1
        }),
    )
    .await;
    let error = next_of_type(&mut bob_ws, "error").await;
    assert_eq!(error["code"], "conflict");
    assert_eq!(error["current_version"], 2);

    bob_ws.close(None).await.expect("Failed to close");
    let left = next_of_type(&mut alice_ws, "presence").await;
    assert_eq!(left["status"], "LEFT");
    assert_eq!(left["username"], "bob");
}

#[tokio::test]
async fn test_rest_changes_reach_live_sessions() {
    let app = TestApp::new();
    let alice = app.user("alice");
    let bob = app.user("bob");
    let alice_token = app.token_for(&alice).await;
    let bob_token = app.token_for(&bob).await;

    let id = app.create_document(&alice_token, "Notes", "hello").await;
    app.request(
        "POST",
        &format!("/api/documents/{id}/collaborators"),
        Some(json!({ "user_id": bob.user_id })),
        Some(&alice_token),
    )
    .await;

    let addr = app.spawn_server().await;
    let mut alice_ws = connect(addr, &alice_token).await;
    let mut bob_ws = connect(addr, &bob_token).await;
    send(&mut alice_ws, json!({ "type": "join", "document_id": id })).await;
    next_of_type(&mut alice_ws, "document_state").await;
    send(&mut bob_ws, json!({ "type": "join", "document_id": id })).await;
    next_of_type(&mut bob_ws, "document_state").await;
    next_of_type(&mut alice_ws, "presence").await;

    let put = app
        .request(
            "PUT",
            &format!("/api/documents/{id}"),
            Some(json!({ "content": "rewritten", "base_version": 1 })),
            Some(&alice_token),
        )
        .await;
    assert_eq!(put.status, StatusCode::OK);
    let relayed = next_of_type(&mut bob_ws, "content").await;
    assert_eq!(relayed["operation"], "REPLACE");
    assert_eq!(relayed["content"], "rewritten");
    assert_eq!(relayed["base_version"], 1);

    let removed = app
        .request(
            "DELETE",
            &format!("/api/documents/{id}/collaborators/{}", bob.user_id),
            None,
            Some(&alice_token),
        )
        .await;
    assert_eq!(removed.status, StatusCode::OK);

    let evicted = next_of_type(&mut bob_ws, "error").await;
    assert_eq!(evicted["code"], "forbidden");
    let left = next_of_type(&mut alice_ws, "presence").await;
    assert_eq!(left["status"], "LEFT");
    assert_eq!(left["username"], "bob");
}
