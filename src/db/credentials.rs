// SPDX-License-Identifier: MIT

//! Credential storage seam.
//!
//! On the device the store is backed by the platform's secure storage; this
//! crate only depends on the trait. The file-backed implementation stands in
//! for it on desktop, the in-memory one in tests.

use crate::error::{AppError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

/// Key-value store for the Steam API key, Steam ID and username.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn set(&self, key: &str, value: &str) -> Result<()>;
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn remove(&self, key: &str) -> Result<()>;
}

/// In-memory credential store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryCredentialStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .map_err(|_| AppError::Storage("credential store lock poisoned".to_string()))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .entries
            .lock()
            .map_err(|_| AppError::Storage("credential store lock poisoned".to_string()))?
            .get(key)
            .cloned())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries
            .lock()
            .map_err(|_| AppError::Storage("credential store lock poisoned".to_string()))?
            .remove(key);
        Ok(())
    }
}

/// Credential store persisting a small JSON map to disk.
///
/// Each operation re-reads the file so concurrent processes see each other's
/// writes; the blob is a handful of keys, so this stays cheap.
pub struct FileCredentialStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    io_lock: Mutex<()>,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            io_lock: Mutex::new(()),
        }
    }

    fn load(&self) -> Result<HashMap<String, String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => serde_json::from_str(&contents)
                .map_err(|e| AppError::Storage(format!("corrupt credential file: {}", e))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(AppError::Storage(format!(
                "failed to read credential file: {}",
                e
            ))),
        }
    }

    fn save(&self, entries: &HashMap<String, String>) -> Result<()> {
        let contents = serde_json::to_string_pretty(entries)
            .map_err(|e| AppError::Storage(format!("failed to encode credentials: {}", e)))?;
        std::fs::write(&self.path, contents)
            .map_err(|e| AppError::Storage(format!("failed to write credential file: {}", e)))
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self
            .io_lock
            .lock()
            .map_err(|_| AppError::Storage("credential store lock poisoned".to_string()))?;
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self
            .io_lock
            .lock()
            .map_err(|_| AppError::Storage("credential store lock poisoned".to_string()))?;
        Ok(self.load()?.get(key).cloned())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let _guard = self
            .io_lock
            .lock()
            .map_err(|_| AppError::Storage("credential store lock poisoned".to_string()))?;
        let mut entries = self.load()?;
        entries.remove(key);
        self.save(&entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::keys;

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemoryCredentialStore::new();
        store.set(keys::API_KEY, "abc123").await.unwrap();

        assert_eq!(
            store.get(keys::API_KEY).await.unwrap().as_deref(),
            Some("abc123")
        );

        store.remove(keys::API_KEY).await.unwrap();
        assert_eq!(store.get(keys::API_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_store_missing_key_is_none() {
        let store = MemoryCredentialStore::new();
        assert_eq!(store.get(keys::STEAM_ID).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");

        {
            let store = FileCredentialStore::new(&path);
            store.set(keys::STEAM_ID, "76561198000000000").await.unwrap();
        }

        let store = FileCredentialStore::new(&path);
        assert_eq!(
            store.get(keys::STEAM_ID).await.unwrap().as_deref(),
            Some("76561198000000000")
        );
    }

    #[tokio::test]
    async fn test_file_store_remove_missing_key_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("credentials.json"));
        store.remove(keys::USERNAME).await.unwrap();
    }
}
