//! Provides the key-value persistence used by the non-music commands.
//! Every key maps to one JSON document on disk; reads and writes always
//! replace the whole document.

use serde_json::Value;
use serenity::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Errors that can occur while loading or saving a document
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage I/O error for key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Document for key '{key}' is not valid JSON: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid storage key '{0}'")]
    InvalidKey(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Whole-document persistence. No partial updates, no transactions.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Load the document stored under `key`, or `None` if nothing was saved yet.
    async fn load(&self, key: &str) -> StorageResult<Option<Value>>;

    /// Replace the document stored under `key`.
    async fn save(&self, key: &str, value: &Value) -> StorageResult<()>;
}

/// Stores each key as `<dir>/<key>.json`.
pub struct JsonFileStore {
    dir: PathBuf,
    // Serializes writers so two saves never race on the temporary file
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> StorageResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn load(&self, key: &str) -> StorageResult<Option<Value>> {
        let path = self.path_for(key)?;

        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No document at {:?}, starting empty", path);
                return Ok(None);
            }
            Err(source) => {
                return Err(StorageError::Io {
                    key: key.to_string(),
                    source,
                });
            }
        };

        if content.trim().is_empty() {
            return Ok(None);
        }

        let value = serde_json::from_str(&content).map_err(|source| StorageError::Corrupt {
            key: key.to_string(),
            source,
        })?;
        Ok(Some(value))
    }

    async fn save(&self, key: &str, value: &Value) -> StorageResult<()> {
        let path = self.path_for(key)?;
        let io_err = |source| StorageError::Io {
            key: key.to_string(),
            source,
        };

        let serialized = serde_json::to_string_pretty(value).map_err(|source| {
            StorageError::Corrupt {
                key: key.to_string(),
                source,
            }
        })?;

        let _guard = self.write_lock.lock().await;

        if fs::metadata(&self.dir).await.is_err() {
            fs::create_dir_all(&self.dir).await.map_err(io_err)?;
            info!("Created data directory: {:?}", self.dir);
        }

        // Write next to the target and rename so readers never see a half-written file
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, serialized).await.map_err(io_err)?;
        fs::rename(&tmp_path, &path).await.map_err(io_err)?;

        debug!("Saved document '{}' to {:?}", key, path);
        Ok(())
    }
}
