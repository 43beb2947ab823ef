//! Error types for the Mae client.

use thiserror::Error;

/// A shared error type for the entire Mae client.
///
/// Every failure is recoverable at the operation that produced it: callers
/// surface the message and keep their previous state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MaeError {
    /// Bad credentials, or the backend refused the bearer token.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Client-side validation failure, raised before any request is sent.
    #[error("Invalid field '{field}': {reason}")]
    Validation { field: String, reason: String },

    /// The backend answered with a non-success status.
    #[error("Backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    /// The backend could not be reached or the transfer failed.
    #[error("Network error: {0}")]
    Network(String),

    /// A protected operation was attempted without a session.
    #[error("Not authenticated")]
    Unauthenticated,

    /// The persisted session has not been restored yet.
    #[error("Session is still loading")]
    SessionNotReady,

    /// The category does not offer this operation (e.g. editing an append-only log).
    #[error("Category '{category}' does not support {operation}")]
    Unsupported {
        category: &'static str,
        operation: &'static str,
    },

    /// Random pick requested on an empty collection.
    #[error("No options available in '{category}'")]
    NoOptions { category: &'static str },

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Persisted client storage could not be read or written.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl MaeError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Validation error
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a Backend error
    pub fn backend(status: u16, message: impl Into<String>) -> Self {
        Self::Backend {
            status,
            message: message.into(),
        }
    }

    /// Creates a Network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a Storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Check if this is a transport or backend failure.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Backend { .. } | Self::Network(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for MaeError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for MaeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for MaeError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, MaeError>`.
pub type Result<T> = std::result::Result<T, MaeError>;
