//! Identity provider seam used by the transport layer.

use async_trait::async_trait;

use quill_core::config::AuthConfig;
use quill_core::result::AppResult;
use quill_entity::user::Identity;

use crate::jwt::{IssuedToken, JwtDecoder, JwtEncoder};

/// Resolves and issues caller identities.
///
/// `resolve_identity` is invoked once when a connection is established; the
/// returned identity is cached for the lifetime of that connection and never
/// re-derived from client-supplied fields.
#[async_trait]
pub trait AuthProvider: Send + Sync + 'static {
    /// Validates connection credentials and returns the caller's identity.
    async fn resolve_identity(&self, credentials: &str) -> AppResult<Identity>;

    /// Issues a signed identity token.
    async fn issue_token(&self, identity: &Identity) -> AppResult<IssuedToken>;
}

/// [`AuthProvider`] backed by HS256 JWTs.
#[derive(Debug, Clone)]
pub struct JwtAuthProvider {
    /// Token signer.
    encoder: JwtEncoder,
    /// Token validator.
    decoder: JwtDecoder,
}

impl JwtAuthProvider {
    /// Creates a provider from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoder: JwtEncoder::new(config),
            decoder: JwtDecoder::new(config),
        }
    }
}

#[async_trait]
impl AuthProvider for JwtAuthProvider {
    async fn resolve_identity(&self, credentials: &str) -> AppResult<Identity> {
        let token = credentials
            .strip_prefix("Bearer ")
            .unwrap_or(credentials)
            .trim();
        Ok(self.decoder.decode(token)?.identity())
    }

    async fn issue_token(&self, identity: &Identity) -> AppResult<IssuedToken> {
        self.encoder.issue(identity)
    }
}
