//! Client-side session management for TaskPro.
//!
//! [`SessionStore`] owns the current user and bearer token, persists them
//! through a [`SessionStorage`] and publishes read-only snapshots.
//! [`RouteGuard`] uses those snapshots to gate protected views.

pub mod guard;
pub mod storage;
pub mod store;

pub use guard::{GuardOutcome, GuardState, Route, RouteGuard};
pub use storage::{
    DEFAULT_STORAGE_KEY, FileStorage, MemoryStorage, SessionStorage, StorageError, StorageResult,
};
pub use store::{PersistedSession, SessionError, SessionState, SessionStore};
