//! Presence registry: who is joined to which document.
//!
//! Two indexes are kept. `sessions` maps each connection to the single
//! document it is bound to and is the source of truth for "is this session
//! live". `documents` maps each document to its member set, each set behind
//! its own async mutex so that presence on one document never waits on
//! another.
//!
//! A session is only ever inserted into a member set while its binding in
//! `sessions` still points at that document, checked under the set's lock.
//! `leave` removes the binding first and the set entry second. Together this
//! means a leave racing a join either sees the member (and emits LEFT after
//! JOINED) or wins before it is added (and neither event is emitted).

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::debug;

use quill_core::types::id::{ConnectionId, DocumentId};
use quill_entity::presence::PresenceEvent;
use quill_entity::user::Identity;

type Members = Arc<Mutex<HashMap<ConnectionId, Identity>>>;

/// What a connection is bound to.
#[derive(Debug, Clone)]
struct Binding {
    document_id: DocumentId,
    identity: Identity,
}

/// Result of [`PresenceRegistry::join`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinOutcome {
    /// JOINED on the new document, absent for a same-document re-join or when
    /// a concurrent leave won.
    pub joined: Option<PresenceEvent>,
    /// LEFT on the previously bound document when the session switched.
    pub departed: Option<PresenceEvent>,
}

/// Process-wide presence state.
#[derive(Debug, Default)]
pub struct PresenceRegistry {
    /// Connection → bound document and identity.
    sessions: DashMap<ConnectionId, Binding>,
    /// Document → joined connections.
    documents: DashMap<DocumentId, Members>,
}

impl PresenceRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `conn_id` to `document_id`.
    ///
    /// A connection is bound to at most one document; joining another document
    /// first leaves the current one. Re-joining the same document is a no-op.
    /// Read access must be checked by the caller.
    pub async fn join(
        &self,
        conn_id: ConnectionId,
        document_id: DocumentId,
        identity: Identity,
    ) -> JoinOutcome {
        let binding = Binding {
            document_id,
            identity: identity.clone(),
        };
        let previous = self.sessions.insert(conn_id, binding);

        let mut outcome = JoinOutcome::default();
        if let Some(previous) = previous {
            if previous.document_id == document_id {
                self.add_member(conn_id, document_id, identity).await;
                return outcome;
            }
            if self.remove_member(previous.document_id, conn_id).await {
                outcome.departed = Some(PresenceEvent::left(
                    previous.document_id,
                    previous.identity,
                ));
            }
        }

        if self.add_member(conn_id, document_id, identity.clone()).await {
            debug!(conn_id = %conn_id, document_id = %document_id, user_id = %identity.user_id, "Session joined");
            outcome.joined = Some(PresenceEvent::joined(document_id, identity));
        }
        outcome
    }

    /// Unbinds `conn_id` from whatever document it is joined to.
    ///
    /// Returns `None` when the session was already gone, so duplicate
    /// disconnect signals are harmless.
    pub async fn leave(&self, conn_id: ConnectionId) -> Option<PresenceEvent> {
        let (_, binding) = self.sessions.remove(&conn_id)?;
        self.finish_leave(conn_id, binding).await
    }

    /// Unbinds `conn_id` only if it is joined to `document_id`.
    pub async fn leave_document(
        &self,
        conn_id: ConnectionId,
        document_id: DocumentId,
    ) -> Option<PresenceEvent> {
        let (_, binding) = self
            .sessions
            .remove_if(&conn_id, |_, b| b.document_id == document_id)?;
        self.finish_leave(conn_id, binding).await
    }

    /// Identities currently joined to `document_id`, one per user, ordered by
    /// username.
    pub async fn list_present(&self, document_id: DocumentId) -> Vec<Identity> {
        let Some(members) = self.members(document_id) else {
            return Vec::new();
        };
        let guard = members.lock().await;

        let mut by_user = BTreeMap::new();
        for identity in guard.values() {
            by_user.insert(identity.user_id, identity.clone());
        }
        let mut present: Vec<Identity> = by_user.into_values().collect();
        present.sort_by(|a, b| a.username.cmp(&b.username));
        present
    }

    /// The document `conn_id` is currently joined to.
    pub fn binding(&self, conn_id: ConnectionId) -> Option<DocumentId> {
        self.sessions.get(&conn_id).map(|b| b.document_id)
    }

    /// Number of live sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Number of documents with at least one joined session.
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    async fn finish_leave(&self, conn_id: ConnectionId, binding: Binding) -> Option<PresenceEvent> {
        if self.remove_member(binding.document_id, conn_id).await {
            debug!(conn_id = %conn_id, document_id = %binding.document_id, "Session left");
            Some(PresenceEvent::left(binding.document_id, binding.identity))
        } else {
            None
        }
    }

    fn members(&self, document_id: DocumentId) -> Option<Members> {
        self.documents.get(&document_id).map(|m| Arc::clone(m.value()))
    }

    fn is_current(&self, document_id: DocumentId, members: &Members) -> bool {
        self.documents
            .get(&document_id)
            .is_some_and(|current| Arc::ptr_eq(current.value(), members))
    }

    /// Inserts the session into the document's set if it is still bound there.
    /// Returns whether it was newly added.
    async fn add_member(
        &self,
        conn_id: ConnectionId,
        document_id: DocumentId,
        identity: Identity,
    ) -> bool {
        loop {
            let members = Arc::clone(&self.documents.entry(document_id).or_default());
            let mut guard = members.lock().await;

            // The set may have been pruned while we waited for the lock.
            if !self.is_current(document_id, &members) {
                continue;
            }

            let still_bound = self
                .sessions
                .get(&conn_id)
                .is_some_and(|b| b.document_id == document_id);
            if !still_bound {
                if guard.is_empty() {
                    self.documents
                        .remove_if(&document_id, |_, m| Arc::ptr_eq(m, &members));
                }
                return false;
            }

            return guard.insert(conn_id, identity).is_none();
        }
    }

    /// Removes the session from the document's set, pruning an emptied set.
    async fn remove_member(&self, document_id: DocumentId, conn_id: ConnectionId) -> bool {
        loop {
            let Some(members) = self.members(document_id) else {
                return false;
            };
            let mut guard = members.lock().await;

            if !self.is_current(document_id, &members) {
                continue;
            }

            let removed = guard.remove(&conn_id).is_some();
            if guard.is_empty() {
                self.documents
                    .remove_if(&document_id, |_, m| Arc::ptr_eq(m, &members));
            }
            return removed;
        }
    }
}
