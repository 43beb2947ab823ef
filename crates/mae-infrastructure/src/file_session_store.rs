//! File-backed session store.

use async_trait::async_trait;
use mae_core::session::SessionStore;
use mae_core::{MaeError, Result};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::paths::MaePaths;
use crate::storage::{AtomicJsonError, AtomicJsonFile};

type Values = BTreeMap<String, String>;

/// Session values kept in `session.json`, readable by the owner only.
///
/// Each call runs on the blocking pool so file locks never stall the runtime.
/// Reading an unparseable file is an error, but writes replace it with a
/// fresh map.
pub struct FileSessionStore {
    file: Arc<AtomicJsonFile<Values>>,
}

impl FileSessionStore {
    pub fn new(paths: &MaePaths) -> Self {
        Self::with_path(paths.session_file())
    }

    /// Creates a store at a custom path (for testing).
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            file: Arc::new(AtomicJsonFile::new(path).private()),
        }
    }

    async fn run<F, R>(&self, op: F) -> Result<R>
    where
        F: FnOnce(&AtomicJsonFile<Values>) -> std::result::Result<R, AtomicJsonError>
            + Send
            + 'static,
        R: Send + 'static,
    {
        let file = Arc::clone(&self.file);
        let path = file.path().display().to_string();
        tokio::task::spawn_blocking(move || op(&file))
            .await
            .map_err(|e| MaeError::storage(format!("Session task failed: {}", e)))?
            .map_err(|e| {
                tracing::warn!("[SessionStore] {} failed: {}", path, e);
                MaeError::storage(format!("{}: {}", path, e))
            })
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let key = key.to_string();
        self.run(move |file| Ok(file.load()?.and_then(|mut values| values.remove(&key))))
            .await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let key = key.to_string();
        let value = value.to_string();
        tracing::debug!("[SessionStore] Writing '{}'", key);
        self.run(move |file| {
            file.update_or_reset(Values::new(), |values| {
                values.insert(key, value);
            })
        })
        .await
    }

    async fn set_all(&self, values: &[(&str, &str)]) -> Result<()> {
        let pairs: Vec<(String, String)> = values
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        tracing::debug!("[SessionStore] Writing {} keys", pairs.len());
        self.run(move |file| {
            file.update_or_reset(Values::new(), |values| values.extend(pairs))
        })
        .await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let key = key.to_string();
        self.run(move |file| {
            if !file.path().exists() {
                return Ok(());
            }
            file.update_or_reset(Values::new(), |values| {
                values.remove(&key);
            })
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mae_core::session::{TOKEN_KEY, USER_KEY};
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_set_get_remove() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::with_path(dir.path().join("session.json"));

        assert_eq!(store.get(TOKEN_KEY).await.unwrap(), None);

        store.set(TOKEN_KEY, "tok-1").await.unwrap();
        store.set(USER_KEY, r#"{"id":"u1","email":"a@b"}"#).await.unwrap();
        assert_eq!(store.get(TOKEN_KEY).await.unwrap().as_deref(), Some("tok-1"));

        store.remove(TOKEN_KEY).await.unwrap();
        assert_eq!(store.get(TOKEN_KEY).await.unwrap(), None);
        assert!(store.get(USER_KEY).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_values_survive_new_instance() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");

        FileSessionStore::with_path(path.clone())
            .set(TOKEN_KEY, "persisted")
            .await
            .unwrap();

        let reopened = FileSessionStore::with_path(path);
        assert_eq!(
            reopened.get(TOKEN_KEY).await.unwrap().as_deref(),
            Some("persisted")
        );
    }

    #[tokio::test]
    async fn test_remove_without_file_is_noop() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        let store = FileSessionStore::with_path(path.clone());

        store.remove(USER_KEY).await.unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_set_all_writes_every_key() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::with_path(dir.path().join("session.json"));
        store.set(TOKEN_KEY, "old").await.unwrap();

        store
            .set_all(&[(TOKEN_KEY, "tok-2"), (USER_KEY, "{}")])
            .await
            .unwrap();
        assert_eq!(store.get(TOKEN_KEY).await.unwrap().as_deref(), Some("tok-2"));
        assert_eq!(store.get(USER_KEY).await.unwrap().as_deref(), Some("{}"));
    }

    #[tokio::test]
    async fn test_writes_replace_corrupted_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "garbage").unwrap();
        let store = FileSessionStore::with_path(path);

        store.remove(USER_KEY).await.unwrap();
        assert_eq!(store.get(USER_KEY).await.unwrap(), None);

        fs::write(dir.path().join("session.json"), "garbage").unwrap();
        store.set(TOKEN_KEY, "fresh").await.unwrap();
        assert_eq!(store.get(TOKEN_KEY).await.unwrap().as_deref(), Some("fresh"));
    }

    #[tokio::test]
    async fn test_corrupted_file_is_storage_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "not json").unwrap();

        let err = FileSessionStore::with_path(path)
            .get(TOKEN_KEY)
            .await
            .unwrap_err();
        assert!(matches!(err, MaeError::Storage(_)));
    }
}
