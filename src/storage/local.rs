//! Local filesystem storage implementation.
//!
//! Stores the whole registry as one pretty-printed JSON document. Writes
//! are atomic (temp file + rename) so a crash mid-write never leaves a
//! truncated registry behind.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::Registry;
use crate::storage::{SettingsStore, StorageData};

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    /// Create a new store writing to the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Ensure the parent directory exists.
    async fn ensure_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        self.ensure_dir().await?;

        let tmp = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    /// Read bytes, returning None if the file doesn't exist.
    async fn read_bytes(&self) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }
}

#[async_trait]
impl SettingsStore for LocalStore {
    async fn load(&self) -> Result<Registry> {
        match self.read_bytes().await? {
            Some(bytes) => {
                let data: StorageData = serde_json::from_slice(&bytes)?;
                Ok(data.groups)
            }
            None => {
                log::info!("No registry found at {}, starting empty", self.path.display());
                Ok(Registry::new())
            }
        }
    }

    async fn save(&self, registry: &Registry) -> Result<()> {
        let data = StorageData::new(registry.clone());
        let bytes = serde_json::to_vec_pretty(&data)
            .map_err(|e| AppError::persistence(format!("registry encode failed: {e}")))?;
        self.write_bytes(&bytes)
            .await
            .map_err(|e| AppError::persistence(format!("registry write failed: {e}")))
    }
}
