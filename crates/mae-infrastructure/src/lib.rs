//! Infrastructure layer for the Mae client: file storage, configuration and
//! the REST adapter.

pub mod config_service;
pub mod file_session_store;
pub mod http_backend;
pub mod paths;
pub mod storage;

pub use config_service::{BACKEND_URL_ENV, ConfigService};
pub use file_session_store::FileSessionStore;
pub use http_backend::HttpBackend;
pub use paths::{MaePaths, PathError};
