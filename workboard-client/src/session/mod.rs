//! Authentication session
//!
//! - [`SessionContext`]: shared, read-mostly view of the token, the current
//!   user and backend reachability. The API client reads the token from it
//!   on every request.
//! - [`SessionManager`]: the only writer. Performs login, signup, logout,
//!   startup restore and expiry.
//! - [`TokenStore`]: durable storage for the token and last-known profile.

pub mod manager;
pub mod store;

pub use manager::{AuthError, RestoreOutcome, SessionManager};
pub use store::{FileTokenStore, MemoryTokenStore, PersistedSession, StoreError, TokenStore};

use serde::Serialize;
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use workboard_shared::auth::token::SessionToken;
use workboard_shared::models::user::User;

/// Reachability of the backend as last observed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendStatus {
    /// A check is running or none has completed yet
    #[default]
    Checking,

    /// The backend answered
    Online,

    /// The backend could not be reached
    Offline,
}

impl fmt::Display for BackendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BackendStatus::Checking => "checking",
            BackendStatus::Online => "online",
            BackendStatus::Offline => "offline",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Default)]
struct SessionState {
    token: Option<SessionToken>,
    user: Option<User>,
    backend: BackendStatus,
}

/// Shared session state
///
/// Cloning is cheap and every clone sees the same state. Mutation is
/// restricted to this crate so that only [`SessionManager`] changes it.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    inner: Arc<RwLock<SessionState>>,
}

impl SessionContext {
    /// Creates an anonymous context
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Current token, if any
    pub fn token(&self) -> Option<SessionToken> {
        self.read().token.clone()
    }

    /// Current user, if known
    pub fn user(&self) -> Option<User> {
        self.read().user.clone()
    }

    /// Returns true when a token is held
    pub fn is_authenticated(&self) -> bool {
        self.read().token.is_some()
    }

    /// Last observed backend reachability
    pub fn backend_status(&self) -> BackendStatus {
        self.read().backend
    }

    pub(crate) fn establish(&self, token: SessionToken, user: Option<User>) {
        let mut state = self.write();
        state.token = Some(token);
        state.user = user;
    }

    pub(crate) fn set_user(&self, user: User) {
        self.write().user = Some(user);
    }

    pub(crate) fn clear(&self) {
        let mut state = self.write();
        state.token = None;
        state.user = None;
    }

    pub(crate) fn set_backend(&self, status: BackendStatus) {
        self.write().backend = status;
    }
}
