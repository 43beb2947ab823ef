//! Durable key-value storage for the client session.

use async_trait::async_trait;

use crate::error::Result;

/// Key holding the raw bearer token.
pub const TOKEN_KEY: &str = "token";
/// Key holding the identity as JSON.
pub const USER_KEY: &str = "user";

/// Key-value store that survives restarts.
///
/// Values are opaque strings; the session context decides what they mean.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;

    /// Writes several keys, all or nothing.
    ///
    /// The default implementation writes one key at a time and restores the
    /// previous values when a write fails. Stores that can write in one step
    /// should override it.
    async fn set_all(&self, values: &[(&str, &str)]) -> Result<()> {
        let mut previous = Vec::with_capacity(values.len());
        for (key, _) in values {
            previous.push((*key, self.get(key).await?));
        }

        for (written, (key, value)) in values.iter().enumerate() {
            if let Err(e) = self.set(key, value).await {
                for (key, before) in previous[..written].iter().rev() {
                    let restored = match before {
                        Some(before) => self.set(key, before).await,
                        None => self.remove(key).await,
                    };
                    if let Err(restore_err) = restored {
                        tracing::warn!("[SessionStore] Cannot restore '{}': {}", key, restore_err);
                    }
                }
                return Err(e);
            }
        }
        Ok(())
    }
}
