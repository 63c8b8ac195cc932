//! Blob storage backends for persisted state
//!
//! A blob store maps a key to one JSON value. The file-based implementation
//! writes one `<key>.json` file per key under a state directory.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::fs;
use tracing::debug;

use super::types::PersistedState;
use crate::error::{CodemateError, CodemateResult};

/// Key under which the session list is stored
pub const STATE_KEY: &str = "codemate.sessions";

/// Opaque key/value storage for JSON blobs
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Read the value for a key
    async fn get(&self, key: &str) -> CodemateResult<Option<Value>>;

    /// Write the value for a key
    async fn put(&self, key: &str, value: Value) -> CodemateResult<()>;

    /// Load the persisted session state, if any
    async fn load_state(&self) -> CodemateResult<Option<PersistedState>> {
        match self.get(STATE_KEY).await? {
            Some(value) => serde_json::from_value(value).map(Some).map_err(|e| {
                CodemateError::storage(format!("Failed to deserialize state: {}", e))
            }),
            None => Ok(None),
        }
    }

    /// Persist the session state
    async fn save_state(&self, state: &PersistedState) -> CodemateResult<()> {
        let value = serde_json::to_value(state)?;
        self.put(STATE_KEY, value).await
    }
}

/// File-based blob storage
pub struct FileBlobStore {
    base_path: PathBuf,
}

impl FileBlobStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Storage under the platform data directory (`<data>/codemate`)
    pub fn default_path() -> CodemateResult<Self> {
        let base = dirs::data_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| CodemateError::config("Could not determine a data directory"))?;
        Ok(Self::new(base.join("codemate")))
    }

    pub fn base_path(&self) -> &PathBuf {
        &self.base_path
    }

    fn blob_path(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.base_path.join(format!("{}.json", safe))
    }
}

#[async_trait]
impl BlobStore for FileBlobStore {
    async fn get(&self, key: &str) -> CodemateResult<Option<Value>> {
        let path = self.blob_path(key);
        let json = match fs::read_to_string(&path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(CodemateError::io_with_path(
                    format!("Failed to read blob: {}", e),
                    path.display().to_string(),
                ));
            }
        };

        let value = serde_json::from_str(&json)
            .map_err(|e| CodemateError::storage(format!("Corrupt blob {}: {}", key, e)))?;
        debug!(key, path = %path.display(), "loaded blob");
        Ok(Some(value))
    }

    async fn put(&self, key: &str, value: Value) -> CodemateResult<()> {
        fs::create_dir_all(&self.base_path).await.map_err(|e| {
            CodemateError::io_with_path(
                format!("Failed to create state directory: {}", e),
                self.base_path.display().to_string(),
            )
        })?;

        let path = self.blob_path(key);
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(&value)?;
        fs::write(&tmp, json).await?;
        fs::rename(&tmp, &path).await?;

        debug!(key, path = %path.display(), "saved blob");
        Ok(())
    }
}

/// In-memory blob storage
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, Value>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn get(&self, key: &str) -> CodemateResult<Option<Value>> {
        Ok(self.blobs.read().get(key).cloned())
    }

    async fn put(&self, key: &str, value: Value) -> CodemateResult<()> {
        self.blobs.write().insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Message, SessionStore};

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryBlobStore::new();
        assert!(store.get("k").await.unwrap().is_none());

        store.put("k", serde_json::json!({"a": 1})).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().unwrap()["a"], 1);
    }

    #[tokio::test]
    async fn test_file_store_persists_state() {
        let dir = tempfile::tempdir().unwrap();
        let blobs = FileBlobStore::new(dir.path().join("state"));
        assert!(blobs.load_state().await.unwrap().is_none());

        let mut sessions = SessionStore::new();
        sessions.append(Message::user("remember me"));
        blobs.save_state(&sessions.to_state()).await.unwrap();

        let reopened = FileBlobStore::new(dir.path().join("state"));
        let state = reopened.load_state().await.unwrap().unwrap();
        assert_eq!(state, sessions.to_state());
        assert!(dir.path().join("state").join("codemate.sessions.json").exists());
    }

    #[tokio::test]
    async fn test_file_store_corrupt_blob() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.json"), "{not json").unwrap();

        let blobs = FileBlobStore::new(dir.path());
        let err = blobs.get("bad").await.unwrap_err();
        assert_eq!(err.error_code(), "CODEMATE_STORAGE");
    }
}
