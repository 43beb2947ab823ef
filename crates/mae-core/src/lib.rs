//! Domain layer of the Mae logbook client.
//!
//! - [`session`]: login, signup, logout and the guard for protected views.
//! - [`catalog`]: the declarative table of categories.
//! - [`resource`]: one generic CRUD resource driven by that table.
//! - [`backend`]: traits implemented by the REST adapter.

pub mod backend;
pub mod catalog;
pub mod config;
pub mod entry;
pub mod error;
pub mod resource;
pub mod session;

// Re-export common error type
pub use error::{MaeError, Result};

pub use backend::{AuthBackend, CollectionBackend, LoginGrant};
pub use catalog::CategorySchema;
pub use entry::{Entry, EntryForm, EntryId, Fields};
pub use resource::{Confirm, DeleteOutcome, Resource};
pub use session::{Access, Credential, Identity, Session, SessionContext, SessionState, SessionStore};
