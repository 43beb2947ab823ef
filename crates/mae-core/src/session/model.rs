//! Session domain model.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The authenticated user as the backend describes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub email: String,
}

/// Opaque bearer token.
///
/// `Debug` and `Display` never print the token itself.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for the authorization header and persistence only.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

/// Identity plus the credential proving it.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub identity: Identity,
    pub credential: Credential,
}

/// Lifecycle of the client session.
///
/// `Uninitialized -> Loading -> {Authenticated, Unauthenticated}`; logout
/// moves to `Unauthenticated`, and only a fresh login leads back.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    #[default]
    Uninitialized,
    Loading,
    Authenticated(Session),
    Unauthenticated,
}

impl SessionState {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Authenticated(_) | Self::Unauthenticated)
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::Authenticated(session) => Some(session),
            _ => None,
        }
    }
}

/// What a protected view is allowed to do right now.
#[derive(Debug, Clone, PartialEq)]
pub enum Access {
    /// Session not restored yet: render nothing.
    Pending,
    /// No session: go to the login entry point.
    RedirectToLogin,
    Granted(Session),
}

impl From<&SessionState> for Access {
    fn from(state: &SessionState) -> Self {
        match state {
            SessionState::Uninitialized | SessionState::Loading => Access::Pending,
            SessionState::Unauthenticated => Access::RedirectToLogin,
            SessionState::Authenticated(session) => Access::Granted(session.clone()),
        }
    }
}
