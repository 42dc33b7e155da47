//! Durable storage for the session token and last-known profile

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use workboard_shared::auth::token::SessionToken;
use workboard_shared::models::user::User;

/// What survives a restart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedSession {
    /// Session token
    pub token: SessionToken,

    /// Profile as last seen
    #[serde(default)]
    pub user: Option<User>,
}

/// Error type for session storage
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Session storage I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Session storage encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Durable key-value storage for the session
pub trait TokenStore: Send + Sync {
    /// Loads the persisted session; `None` when nothing usable is stored
    fn load(&self) -> Result<Option<PersistedSession>, StoreError>;

    /// Replaces the persisted session
    fn save(&self, session: &PersistedSession) -> Result<(), StoreError>;

    /// Removes the persisted session
    fn clear(&self) -> Result<(), StoreError>;
}

/// Session stored as a JSON file
///
/// An unreadable file is treated as no session and removed.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Creates a store backed by `path`; the file is created on first save
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the session file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<PersistedSession>, StoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&contents) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Discarding unreadable session file");
                self.clear()?;
                Ok(None)
            }
        }
    }

    fn save(&self, session: &PersistedSession) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, json)?;

        // Token file is readable by the owner only
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process store, for tests and embedding
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    session: Mutex<Option<PersistedSession>>,
}

impl MemoryTokenStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding a session
    pub fn with_session(session: PersistedSession) -> Self {
        Self {
            session: Mutex::new(Some(session)),
        }
    }

    /// Currently stored session
    pub fn snapshot(&self) -> Option<PersistedSession> {
        self.session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<PersistedSession>, StoreError> {
        Ok(self.snapshot())
    }

    fn save(&self, session: &PersistedSession) -> Result<(), StoreError> {
        *self
            .session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self
            .session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
        Ok(())
    }
}
