//! Process-wide session context.
//!
//! Owns the session lifecycle: `restore_session` at start-up, `login`,
//! `logout`, and the guard consulted by every protected view. The context is
//! handed to the views that need it; nothing reads it as a global.

use std::sync::Arc;
use tokio::sync::RwLock;

use crate::backend::AuthBackend;
use crate::error::{MaeError, Result};
use crate::session::model::{Access, Credential, Identity, Session, SessionState};
use crate::session::store::{SessionStore, TOKEN_KEY, USER_KEY};

pub struct SessionContext<A: ?Sized, S: ?Sized> {
    auth: Arc<A>,
    store: Arc<S>,
    state: RwLock<SessionState>,
}

impl<A, S> SessionContext<A, S>
where
    A: AuthBackend + ?Sized,
    S: SessionStore + ?Sized,
{
    pub fn new(auth: Arc<A>, store: Arc<S>) -> Self {
        Self {
            auth,
            store,
            state: RwLock::new(SessionState::Uninitialized),
        }
    }

    pub async fn state(&self) -> SessionState {
        self.state.read().await.clone()
    }

    /// Guard for protected views.
    pub async fn guard(&self) -> Access {
        Access::from(&*self.state.read().await)
    }

    /// The credential to pass to backend calls.
    pub async fn credential(&self) -> Result<Credential> {
        match &*self.state.read().await {
            SessionState::Authenticated(session) => Ok(session.credential.clone()),
            SessionState::Unauthenticated => Err(MaeError::Unauthenticated),
            SessionState::Uninitialized | SessionState::Loading => {
                Err(MaeError::SessionNotReady)
            }
        }
    }

    /// Rehydrates the session from persisted storage.
    ///
    /// Never fails: unreadable or malformed data counts as no session. A
    /// malformed identity is removed from storage along with its token.
    /// Calling it again once the session is resolved returns the current state.
    pub async fn restore_session(&self) -> SessionState {
        {
            let mut state = self.state.write().await;
            if state.is_ready() {
                tracing::debug!("[Session] Already restored");
                return state.clone();
            }
            *state = SessionState::Loading;
        }

        let restored = self.load_persisted().await;
        let next = match restored {
            Some(session) => {
                tracing::info!("[Session] Restored session for {}", session.identity.email);
                SessionState::Authenticated(session)
            }
            None => SessionState::Unauthenticated,
        };

        let mut state = self.state.write().await;
        *state = next.clone();
        next
    }

    async fn load_persisted(&self) -> Option<Session> {
        let token = match self.store.get(TOKEN_KEY).await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!("[Session] Cannot read stored token: {}", e);
                return None;
            }
        };
        let user = match self.store.get(USER_KEY).await {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!("[Session] Cannot read stored user: {}", e);
                return None;
            }
        };

        let (Some(token), Some(user)) = (token, user) else {
            return None;
        };

        match serde_json::from_str::<Identity>(&user) {
            Ok(identity) => Some(Session {
                identity,
                credential: Credential::new(token),
            }),
            Err(e) => {
                tracing::warn!("[Session] Discarding malformed stored user: {}", e);
                self.clear_persisted().await.ok();
                None
            }
        }
    }

    async fn clear_persisted(&self) -> Result<()> {
        let token = self.store.remove(TOKEN_KEY).await;
        let user = self.store.remove(USER_KEY).await;
        if let Err(e) = token.as_ref().and(user.as_ref()) {
            tracing::warn!("[Session] Failed to clear stored session: {}", e);
        }
        token.and(user)
    }

    /// Authenticates and persists the new session.
    ///
    /// On any failure the current state is left untouched.
    pub async fn login(&self, identifier: &str, secret: &str) -> Result<Session> {
        if !self.state.read().await.is_ready() {
            return Err(MaeError::SessionNotReady);
        }

        let grant = self.auth.login(identifier, secret).await.inspect_err(|e| {
            tracing::info!("[Session] Login refused for {}: {}", identifier, e);
        })?;

        let user = serde_json::to_string(&grant.identity)?;
        self.store
            .set_all(&[(TOKEN_KEY, grant.credential.expose()), (USER_KEY, user.as_str())])
            .await
            .inspect_err(|e| {
                tracing::warn!("[Session] Cannot persist session: {}", e);
            })?;

        let session = Session {
            identity: grant.identity,
            credential: grant.credential,
        };
        *self.state.write().await = SessionState::Authenticated(session.clone());
        tracing::info!("[Session] Logged in as {}", session.identity.email);

        Ok(session)
    }

    /// Registers a new account. Does not log in.
    pub async fn signup(&self, identifier: &str, secret: &str) -> Result<String> {
        let message = self.auth.signup(identifier, secret).await?;
        tracing::info!("[Session] Signed up {}", identifier);
        Ok(message)
    }

    /// Forgets the session in memory and in storage.
    ///
    /// The in-memory state becomes `Unauthenticated` even if clearing the
    /// storage fails; the storage error is still returned.
    pub async fn logout(&self) -> Result<()> {
        *self.state.write().await = SessionState::Unauthenticated;
        tracing::info!("[Session] Logged out");
        self.clear_persisted().await
    }
}
