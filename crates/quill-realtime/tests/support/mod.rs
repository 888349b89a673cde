//! Shared fixtures for engine-level tests.

#![allow(dead_code)]

use std::sync::Arc;

use serde_json::{Value, json};
use tokio::sync::mpsc;

use quill_core::config::RealtimeConfig;
use quill_core::types::id::{DocumentId, UserId};
use quill_entity::document::Document;
use quill_entity::user::Identity;
use quill_realtime::{RealtimeEngine, SessionContext};
use quill_store::memory::MemoryDocumentStore;
use quill_store::traits::DocumentStore;

/// Engine over an in-memory store holding one document:
/// `{content: "hello", version: 3, owner: alice, collaborators: {bob}}`.
pub struct Harness {
    pub engine: RealtimeEngine,
    pub store: Arc<MemoryDocumentStore>,
    pub doc_id: DocumentId,
    pub alice: Identity,
    pub bob: Identity,
    pub carol: Identity,
}

/// A connected test client.
pub struct Client {
    pub ctx: SessionContext,
    rx: mpsc::Receiver<String>,
}

impl Harness {
    pub async fn new() -> Self {
        Self::over(|store| store as Arc<dyn DocumentStore>).await
    }

    /// Seeds the memory store, then runs the engine over whatever `wrap`
    /// builds around it.
    pub async fn over(
        wrap: impl FnOnce(Arc<MemoryDocumentStore>) -> Arc<dyn DocumentStore>,
    ) -> Self {
        let store = Arc::new(MemoryDocumentStore::new());
        let alice = Identity::new(UserId::new(), "alice");
        let bob = Identity::new(UserId::new(), "bob");
        let carol = Identity::new(UserId::new(), "carol");

        let mut doc = Document::new("Plan", "hello", alice.user_id);
        doc.collaborators.insert(bob.user_id);
        doc.version = 3;
        store.create(&doc).await.expect("seed document");

        let engine = RealtimeEngine::new(RealtimeConfig::default(), wrap(store.clone()));
        Self {
            engine,
            store,
            doc_id: doc.id,
            alice,
            bob,
            carol,
        }
    }

    pub fn connect(&self, identity: &Identity) -> Client {
        let (ctx, rx) = self.engine.connect(identity.clone());
        Client { ctx, rx }
    }

    pub async fn send(&self, client: &Client, message: Value) {
        self.engine.handle_frame(&client.ctx, &message.to_string()).await;
    }

    pub async fn join(&self, client: &mut Client) {
        self.send(client, json!({"type": "join", "document_id": self.doc_id}))
            .await;
        client.drain();
    }

    pub async fn stored(&self) -> Document {
        self.store
            .get(self.doc_id)
            .await
            .expect("get")
            .expect("document exists")
    }
}

impl Client {
    /// Every frame queued so far, parsed.
    pub fn drain(&mut self) -> Vec<Value> {
        let mut frames = Vec::new();
        while let Ok(frame) = self.rx.try_recv() {
            frames.push(serde_json::from_str(&frame).expect("frame is json"));
        }
        frames
    }

    /// Queued frames of one `type`.
    pub fn drain_type(&mut self, kind: &str) -> Vec<Value> {
        self.drain()
            .into_iter()
            .filter(|frame| frame["type"] == kind)
            .collect()
    }
}
