//! Local key-value persistence.
//!
//! The cart and the session token survive restarts through a small
//! synchronous string store, one value per fixed key. `FileStorage` keeps
//! one file per key under the configured data directory; `MemoryStorage`
//! backs tests.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use thiserror::Error;

/// Storage key for the serialized cart.
pub const CART_KEY: &str = "cart";

/// Storage key for the authentication session token.
pub const TOKEN_KEY: &str = "auth_token";

/// Errors from local persistence.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying I/O failure.
    #[error("storage io error: {0}")]
    Io(#[from] io::Error),

    /// Key contains characters unusable as a file name.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),
}

/// Synchronous string key-value storage.
///
/// Mirrors the contract of browser local storage: get, set, remove, no
/// iteration. Implementations must be usable behind a shared reference.
pub trait KeyValueStorage: Send + Sync {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing medium fails.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing medium fails.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing medium fails.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// File-backed storage: one file per key under a data directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Create a file storage rooted at `dir`, creating the directory if
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the directory cannot be created.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        // Keys are fixed constants; reject anything that could escape the dir.
        if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(StorageError::InvalidKey(key.to_owned()));
        }
        Ok(self.dir.join(key))
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        std::fs::write(&path, value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// In-memory storage for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create an empty in-memory storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.remove(key);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_round_trip() {
        let storage = MemoryStorage::new();
        assert!(storage.get(CART_KEY).unwrap().is_none());

        storage.set(CART_KEY, "[]").unwrap();
        assert_eq!(storage.get(CART_KEY).unwrap().as_deref(), Some("[]"));

        storage.remove(CART_KEY).unwrap();
        assert!(storage.get(CART_KEY).unwrap().is_none());
    }

    #[test]
    fn test_file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        assert!(storage.get(TOKEN_KEY).unwrap().is_none());
        storage.set(TOKEN_KEY, "tok-123").unwrap();
        assert_eq!(storage.get(TOKEN_KEY).unwrap().as_deref(), Some("tok-123"));

        // A fresh handle over the same directory sees the value.
        let reopened = FileStorage::new(dir.path()).unwrap();
        assert_eq!(reopened.get(TOKEN_KEY).unwrap().as_deref(), Some("tok-123"));

        storage.remove(TOKEN_KEY).unwrap();
        assert!(storage.get(TOKEN_KEY).unwrap().is_none());
        // Removing an absent key is a no-op.
        storage.remove(TOKEN_KEY).unwrap();
    }

    #[test]
    fn test_file_storage_rejects_path_traversal_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        assert!(matches!(
            storage.get("../escape"),
            Err(StorageError::InvalidKey(_))
        ));
    }
}
