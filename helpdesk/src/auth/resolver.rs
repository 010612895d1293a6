//! Credential-to-actor resolution.

use crate::types::{Actor, ActorId, Role};
use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors from identity resolution.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The credential does not map to any known actor.
    #[error("unknown credential")]
    UnknownCredential,
}

/// Resolves a caller's credential into an actor identity.
#[async_trait]
pub trait ResolveActor: Send + Sync {
    /// Resolve `credential` (the bearer token) into an [`Actor`].
    ///
    /// # Errors
    ///
    /// [`ResolveError::UnknownCredential`] if the credential is not
    /// recognized.
    async fn resolve(&self, credential: &str) -> Result<Actor, ResolveError>;
}

/// In-memory token registry: bearer token → actor.
#[derive(Debug, Default)]
pub struct TokenRegistry {
    tokens: RwLock<HashMap<String, Actor>>,
}

impl TokenRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a token for an actor.
    pub async fn register(&self, token: impl Into<String>, actor: Actor) {
        self.tokens.write().await.insert(token.into(), actor);
    }

    /// Register a token for an employee subject.
    pub async fn register_employee(&self, token: impl Into<String>, subject: impl Into<String>) {
        self.register(token, Actor::new(ActorId::new(subject), Role::Employee))
            .await;
    }

    /// Register a token for a technician subject.
    pub async fn register_technician(&self, token: impl Into<String>, subject: impl Into<String>) {
        self.register(token, Actor::new(ActorId::new(subject), Role::Technician))
            .await;
    }
}

#[async_trait]
impl ResolveActor for TokenRegistry {
    async fn resolve(&self, credential: &str) -> Result<Actor, ResolveError> {
        self.tokens
            .read()
            .await
            .get(credential)
            .cloned()
            .ok_or(ResolveError::UnknownCredential)
    }
}
