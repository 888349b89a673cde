//! Shared test helpers for integration tests.

use std::net::SocketAddr;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use quill_api::{AppState, build_app, build_state};
use quill_core::config::AppConfig;
use quill_core::types::id::UserId;
use quill_entity::user::Identity;

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared state, for reaching the engine directly
    pub state: AppState,
}

impl TestApp {
    /// Create a new test application over a fresh in-memory store
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = "integration-test-secret".to_string();

        let state = build_state(config);
        let router = build_app(state.clone());
        Self { router, state }
    }

    /// A new identity with a random user ID
    pub fn user(&self, username: &str) -> Identity {
        Identity::new(UserId::new(), username)
    }

    /// Issue a bearer token for `identity`
    pub async fn token_for(&self, identity: &Identity) -> String {
        self.state
            .auth
            .issue_token(identity)
            .await
            .expect("Failed to issue token")
            .token
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// Create a document owned by whoever `token` belongs to and return its ID
    pub async fn create_document(&self, token: &str, title: &str, content: &str) -> String {
        let response = self
            .request(
                "POST",
                "/api/documents",
                Some(serde_json::json!({ "title": title, "content": content })),
                Some(token),
            )
            .await;
        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "Create failed: {:?}",
            response.body
        );
        response.body["data"]["id"]
            .as_str()
            .expect("No document id in response")
            .to_string()
    }

    /// Serve the app on an ephemeral local port
    pub async fn spawn_server(&self) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local addr");
        let app = self.router.clone();
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Server failed");
        });
        addr
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status
    pub status: StatusCode,
    /// Parsed JSON body, or `Null` when empty
    pub body: Value,
}
