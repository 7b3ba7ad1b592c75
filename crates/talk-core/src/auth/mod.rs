//! Credential storage for talk-core.
//!
//! The client never touches global state. It reads and clears the session
//! credential through a [`CredentialStore`] handed to it at construction:
//! - [`MemoryStore`] for tests and embedders that manage persistence
//! - [`FileStore`] for the CLI (JSON file, mode 0600)

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fs::{self, Permissions};
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{debug, warn};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Storage key of the bearer token
pub const TOKEN_KEY: &str = "token";

/// Storage key of the cached current user
pub const USER_KEY: &str = "user";

/// Key-value storage for session credentials
pub trait CredentialStore: Send + Sync {
    /// Read a value
    fn get(&self, key: &str) -> Option<String>;

    /// Replace a value
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a value; deleting a missing key is not an error
    fn remove(&self, key: &str) -> Result<()>;

    /// The stored bearer token, if any
    fn token(&self) -> Option<String> {
        self.get(TOKEN_KEY).filter(|t| !t.is_empty())
    }

    /// Drop the token and the cached user
    fn clear_session(&self) -> Result<()> {
        self.remove(TOKEN_KEY)?;
        self.remove(USER_KEY)
    }
}

/// In-memory credential store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding a token
    pub fn with_token(token: impl Into<String>) -> Self {
        let store = Self::new();
        if let Ok(mut entries) = store.entries.write() {
            entries.insert(TOKEN_KEY.to_string(), token.into());
        }
        store
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| Error::LockPoisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| Error::LockPoisoned)?;
        entries.remove(key);
        Ok(())
    }
}

/// Credential store persisted as a JSON object on disk.
///
/// The whole file is rewritten on every change with owner-only permissions.
/// Reads are served from memory.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`, loading existing entries.
    ///
    /// A missing file is an empty store. An unreadable or corrupt file is
    /// logged and treated as empty so that a fresh login can overwrite it.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            match serde_json::from_str(&raw) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("Ignoring corrupt credential file {:?}: {}", path, e);
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if entries.is_empty() {
            if self.path.exists() {
                fs::remove_file(&self.path)?;
            }
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let encoded = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, encoded)?;
        #[cfg(unix)]
        fs::set_permissions(&self.path, Permissions::from_mode(0o600))?;
        debug!("Credentials written to {:?}", self.path);
        Ok(())
    }
}

impl CredentialStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().ok()?.get(key).cloned()
    }

    // Memory only changes once the file write has succeeded
    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| Error::LockPoisoned)?;
        let mut updated = entries.clone();
        updated.insert(key.to_string(), value.to_string());
        self.persist(&updated)?;
        *entries = updated;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| Error::LockPoisoned)?;
        if !entries.contains_key(key) {
            return Ok(());
        }
        let mut updated = entries.clone();
        updated.remove(key);
        self.persist(&updated)?;
        *entries = updated;
        Ok(())
    }
}
