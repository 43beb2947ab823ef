//! Authentication session: model, persisted store and lifecycle context.

mod context;
mod model;
mod store;

pub use context::SessionContext;
pub use model::{Access, Credential, Identity, Session, SessionState};
pub use store::{SessionStore, TOKEN_KEY, USER_KEY};
