//! Configuration service.
//!
//! Resolves the [`ClientConfig`] from, in order of priority: an explicit
//! backend URL (command line), the `MAE_BACKEND_URL` environment variable, and
//! `config.toml`.

use mae_core::config::ClientConfig;
use mae_core::{MaeError, Result};
use std::env;
use std::path::PathBuf;

use crate::paths::MaePaths;
use crate::storage::ConfigStorage;

/// Environment variable overriding the backend URL.
pub const BACKEND_URL_ENV: &str = "MAE_BACKEND_URL";

pub struct ConfigService {
    storage: ConfigStorage,
}

impl ConfigService {
    pub fn new(paths: &MaePaths) -> Self {
        Self::with_path(paths.config_file())
    }

    /// Creates a service reading a custom file (for testing).
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            storage: ConfigStorage::new(path),
        }
    }

    /// Loads `config.toml` as is, without overrides.
    pub fn load_file(&self) -> Result<Option<ClientConfig>> {
        self.storage.load().map_err(|e| {
            MaeError::config(format!(
                "Cannot read {}: {}",
                self.storage.path().display(),
                e
            ))
        })
    }

    /// Resolves the effective configuration.
    pub fn resolve(&self, backend_url: Option<String>) -> Result<ClientConfig> {
        self.resolve_with_env(backend_url, env::var(BACKEND_URL_ENV).ok())
    }

    fn resolve_with_env(
        &self,
        backend_url: Option<String>,
        env_url: Option<String>,
    ) -> Result<ClientConfig> {
        let override_url = backend_url
            .or(env_url)
            .filter(|url| !url.trim().is_empty());

        let config = match (self.load_file()?, override_url) {
            (Some(mut config), Some(url)) => {
                config.backend_url = url;
                config
            }
            (Some(config), None) => config,
            (None, Some(url)) => ClientConfig::new(url),
            (None, None) => {
                return Err(MaeError::config(format!(
                    "No backend URL configured: set {} or run `mae config <URL>`",
                    BACKEND_URL_ENV
                )));
            }
        };

        if config.backend_url.trim().is_empty() {
            return Err(MaeError::config("backend_url is empty"));
        }
        tracing::debug!("[Config] Backend at {}", config.api_base());
        Ok(config)
    }

    /// Persists a new backend URL, keeping the other settings.
    pub fn save_backend_url(&self, backend_url: &str) -> Result<ClientConfig> {
        let config = match self.load_file()? {
            Some(mut config) => {
                config.backend_url = backend_url.to_string();
                config
            }
            None => ClientConfig::new(backend_url),
        };

        self.storage.save(&config).map_err(|e| {
            MaeError::config(format!(
                "Cannot write {}: {}",
                self.storage.path().display(),
                e
            ))
        })?;
        tracing::info!("[Config] Saved {}", self.storage.path().display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn service(dir: &TempDir) -> ConfigService {
        ConfigService::with_path(dir.path().join("config.toml"))
    }

    #[test]
    fn test_missing_everything_is_config_error() {
        let dir = TempDir::new().unwrap();
        let err = service(&dir).resolve_with_env(None, None).unwrap_err();
        assert!(matches!(err, MaeError::Config(_)));
    }

    #[test]
    fn test_env_without_file() {
        let dir = TempDir::new().unwrap();
        let config = service(&dir)
            .resolve_with_env(None, Some("http://env.example".to_string()))
            .unwrap();
        assert_eq!(config, ClientConfig::new("http://env.example"));
    }

    #[test]
    fn test_priority_flag_env_file() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("config.toml"),
            "backend_url = \"http://file.example\"\nrequest_timeout_secs = 5\n",
        )
        .unwrap();
        let service = service(&dir);

        let from_file = service.resolve_with_env(None, None).unwrap();
        assert_eq!(from_file.backend_url, "http://file.example");
        assert_eq!(from_file.request_timeout_secs, 5);

        let from_env = service
            .resolve_with_env(None, Some("http://env.example".to_string()))
            .unwrap();
        assert_eq!(from_env.backend_url, "http://env.example");
        assert_eq!(from_env.request_timeout_secs, 5);

        let from_flag = service
            .resolve_with_env(
                Some("http://flag.example".to_string()),
                Some("http://env.example".to_string()),
            )
            .unwrap();
        assert_eq!(from_flag.backend_url, "http://flag.example");
    }

    #[test]
    fn test_save_backend_url_keeps_other_settings() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("config.toml"),
            "backend_url = \"http://old.example\"\napi_prefix = \"/v2\"\n",
        )
        .unwrap();
        let service = service(&dir);

        service.save_backend_url("http://new.example").unwrap();
        let config = service.load_file().unwrap().unwrap();
        assert_eq!(config.backend_url, "http://new.example");
        assert_eq!(config.api_prefix, "/v2");
    }
}
