pub mod auth;
pub mod config;
pub mod entries;
pub mod output;
pub mod prompt;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use mae_core::{Access, AuthBackend, Credential, LoginGrant, MaeError, SessionContext};
use mae_infrastructure::{ConfigService, FileSessionStore, HttpBackend, MaePaths};

/// Exit code when a command needs a session and there is none.
pub const EXIT_LOGIN_REQUIRED: u8 = 2;

pub type Session = SessionContext<dyn AuthBackend, FileSessionStore>;

/// Stands in for the backend when a command only needs the stored session.
struct Offline;

#[async_trait]
impl AuthBackend for Offline {
    async fn login(&self, _identifier: &str, _secret: &str) -> mae_core::Result<LoginGrant> {
        Err(MaeError::config("No backend configured for this command"))
    }

    async fn signup(&self, _identifier: &str, _secret: &str) -> mae_core::Result<String> {
        Err(MaeError::config("No backend configured for this command"))
    }
}

/// Resolved locations and overrides shared by every command.
pub struct App {
    paths: MaePaths,
    backend_url: Option<String>,
}

/// A restored session together with the backend it talks to.
pub struct Connected {
    pub backend: Arc<HttpBackend>,
    pub session: Session,
}

impl App {
    pub fn new(config_dir: Option<PathBuf>, backend_url: Option<String>) -> Result<Self> {
        let paths = MaePaths::resolve(config_dir).context("Cannot locate the config directory")?;
        tracing::debug!("[Cli] Config directory {}", paths.config_dir().display());
        Ok(Self { paths, backend_url })
    }

    pub fn config_service(&self) -> ConfigService {
        ConfigService::new(&self.paths)
    }

    /// Builds the backend and restores the persisted session.
    pub async fn connect(&self) -> Result<Connected> {
        let config = self.config_service().resolve(self.backend_url.clone())?;
        let backend = Arc::new(HttpBackend::new(&config)?);
        let auth: Arc<dyn AuthBackend> = backend.clone();

        let session = SessionContext::new(auth, self.session_store());
        session.restore_session().await;

        Ok(Connected { backend, session })
    }

    /// Restores the persisted session without resolving a backend URL.
    pub async fn local(&self) -> Session {
        let auth: Arc<dyn AuthBackend> = Arc::new(Offline);
        let session = SessionContext::new(auth, self.session_store());
        session.restore_session().await;
        session
    }

    fn session_store(&self) -> Arc<FileSessionStore> {
        Arc::new(FileSessionStore::new(&self.paths))
    }
}

impl Connected {
    /// Applies the session guard.
    ///
    /// `None` means there is no session; the user has been told to log in and
    /// the command should exit with [`login_required`].
    pub async fn credential(&self) -> Result<Option<Credential>> {
        match self.session.guard().await {
            Access::Granted(session) => Ok(Some(session.credential)),
            Access::RedirectToLogin => {
                output::login_required();
                Ok(None)
            }
            Access::Pending => Err(MaeError::SessionNotReady.into()),
        }
    }
}

pub fn login_required() -> ExitCode {
    ExitCode::from(EXIT_LOGIN_REQUIRED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mae_core::SessionStore;
    use mae_core::session::{TOKEN_KEY, USER_KEY};
    use tempfile::TempDir;

    async fn logged_in_app(dir: &TempDir) -> App {
        let store = FileSessionStore::new(&MaePaths::with_dir(dir.path()));
        store
            .set_all(&[
                (TOKEN_KEY, "tok-1"),
                (USER_KEY, r#"{"id":"u-1","email":"mae@example.com"}"#),
            ])
            .await
            .unwrap();
        App::new(Some(dir.path().to_path_buf()), None).unwrap()
    }

    #[tokio::test]
    async fn test_logout_without_backend_url() {
        let dir = TempDir::new().unwrap();
        let app = logged_in_app(&dir).await;

        assert_eq!(auth::logout(&app).await.unwrap(), ExitCode::SUCCESS);

        let store = FileSessionStore::new(&MaePaths::with_dir(dir.path()));
        assert_eq!(store.get(TOKEN_KEY).await.unwrap(), None);
        assert_eq!(store.get(USER_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_whoami_without_backend_url() {
        let dir = TempDir::new().unwrap();
        let app = logged_in_app(&dir).await;
        assert_eq!(auth::whoami(&app).await.unwrap(), ExitCode::SUCCESS);

        auth::logout(&app).await.unwrap();
        assert_eq!(auth::whoami(&app).await.unwrap(), login_required());
    }

    #[tokio::test]
    async fn test_offline_session_cannot_log_in() {
        let dir = TempDir::new().unwrap();
        let app = App::new(Some(dir.path().to_path_buf()), None).unwrap();

        let err = app.local().await.login("mae@example.com", "x").await.unwrap_err();
        assert!(matches!(err, MaeError::Config(_)));
    }
}
