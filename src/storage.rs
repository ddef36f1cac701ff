use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};

use crate::{config::AppConfig, error::StorageError, models::Area};

// 1. KeyValueStore Contract
/// KeyValueStore
///
/// The client-local key-value capability the session stores write to and the
/// guard/authenticator read from. Injected everywhere instead of being a global,
/// so tests can swap in `MemoryStore` or a failing store.
///
/// Writes are atomic per call; there is no partial-write handling.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// StorageState
///
/// The shared handle passed into the authenticator, guard and session stores.
pub type StorageState = Arc<dyn KeyValueStore>;

// 2. In-Memory Implementation
/// MemoryStore
///
/// Ephemeral storage. Used by tests and by clients that don't persist sessions.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
    /// When true, every operation fails as if storage were blocked.
    should_fail: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            entries: RwLock::default(),
            should_fail: true,
        }
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.should_fail {
            return Err(StorageError::Unavailable(
                "Mock Storage Error: Simulation requested".to_string(),
            ));
        }
        Ok(())
    }
}

fn poisoned() -> StorageError {
    StorageError::Unavailable("storage lock poisoned".to_string())
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check()?;
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check()?;
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.check()?;
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.remove(key);
        Ok(())
    }
}

// 3. File-Backed Implementation
/// FileStore
///
/// Persists all entries as a single JSON object. Reads are served from memory;
/// every write rewrites the file through a sibling temp file and a rename, so a
/// reader never observes a half-written document.
pub struct FileStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl FileStore {
    /// open
    ///
    /// Loads existing entries from `path`. A missing file is an empty store; it
    /// is created on first write.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            if raw.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&raw)?
            }
        } else {
            BTreeMap::new()
        };

        tracing::debug!(path = %path.display(), keys = entries.len(), "Opened session file");

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        let previous = entries.insert(key.to_string(), value.to_string());
        if let Err(e) = self.persist(&entries) {
            // Keep memory and disk in agreement when the write fails.
            match previous {
                Some(old) => entries.insert(key.to_string(), old),
                None => entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        if let Some(old) = entries.remove(key) {
            if let Err(e) = self.persist(&entries) {
                entries.insert(key.to_string(), old);
                return Err(e);
            }
        }
        Ok(())
    }
}

/// open_storage
///
/// Picks the storage backend from configuration: a `FileStore` when
/// `session_store_path` is set, otherwise an in-memory store.
pub fn open_storage(config: &AppConfig) -> Result<StorageState, StorageError> {
    match &config.session_store_path {
        Some(path) => Ok(Arc::new(FileStore::open(path)?) as StorageState),
        None => Ok(Arc::new(MemoryStore::new()) as StorageState),
    }
}

/// read_token
///
/// The credential lookup shared by the guard and the authenticator. Storage
/// failures and empty strings both count as "no credential".
pub fn read_token(store: &dyn KeyValueStore, area: Area) -> Option<String> {
    match store.get(&area.token_key()) {
        Ok(Some(token)) if !token.is_empty() => Some(token),
        Ok(_) => None,
        Err(e) => {
            tracing::warn!(%area, error = %e, "Credential storage unreadable, treating as signed out");
            None
        }
    }
}
