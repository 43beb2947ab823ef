//! Path management for Mae configuration and session files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/mae/          # dirs::config_dir() on the platform
//! ├── config.toml         # Client configuration
//! └── session.json        # Persisted token and identity (0600)
//! ```

use std::env;
use std::path::{Path, PathBuf};

/// Environment variable overriding the config directory.
pub const CONFIG_DIR_ENV: &str = "MAE_CONFIG_DIR";

const APP_DIR: &str = "mae";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaePaths {
    config_dir: PathBuf,
}

impl MaePaths {
    /// Uses `dir` as the config directory.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: dir.into(),
        }
    }

    /// Resolves the config directory.
    ///
    /// Priority: `override_dir`, then `MAE_CONFIG_DIR`, then the platform
    /// config directory.
    pub fn resolve(override_dir: Option<PathBuf>) -> Result<Self, PathError> {
        if let Some(dir) = override_dir {
            return Ok(Self::with_dir(dir));
        }
        if let Some(dir) = env::var_os(CONFIG_DIR_ENV).filter(|d| !d.is_empty()) {
            return Ok(Self::with_dir(dir));
        }
        dirs::config_dir()
            .map(|dir| Self::with_dir(dir.join(APP_DIR)))
            .ok_or(PathError::HomeDirNotFound)
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    pub fn session_file(&self) -> PathBuf {
        self.config_dir.join("session.json")
    }
}
