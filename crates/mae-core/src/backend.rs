//! Traits describing the remote REST backend.
//!
//! The credential is an explicit argument of every collection call; adapters
//! hold no authorization state of their own.

use async_trait::async_trait;

use crate::entry::{Entry, EntryId, Fields};
use crate::error::Result;
use crate::session::{Credential, Identity};

/// What a successful login hands back.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginGrant {
    pub credential: Credential,
    pub identity: Identity,
}

/// Authentication endpoints.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Exchanges an identifier and secret for a credential.
    ///
    /// Bad credentials yield `MaeError::Authentication`.
    async fn login(&self, identifier: &str, secret: &str) -> Result<LoginGrant>;

    /// Registers a new identity and returns the backend's message.
    async fn signup(&self, identifier: &str, secret: &str) -> Result<String>;
}

/// Per-category collection endpoints.
#[async_trait]
pub trait CollectionBackend: Send + Sync {
    async fn fetch_all(&self, endpoint: &str, credential: &Credential) -> Result<Vec<Entry>>;

    async fn insert(&self, endpoint: &str, credential: &Credential, fields: &Fields)
    -> Result<Entry>;

    async fn replace(
        &self,
        endpoint: &str,
        credential: &Credential,
        id: &EntryId,
        fields: &Fields,
    ) -> Result<()>;

    async fn remove(&self, endpoint: &str, credential: &Credential, id: &EntryId) -> Result<()>;
}
