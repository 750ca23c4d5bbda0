/// Local-filesystem storage backend
use crate::{
    error::{AppError, AppResult},
    storage::StorageBackend,
};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;
use tracing::debug;

/// Disk storage backend
///
/// Stores originals as flat files under a configured upload directory.
/// Keys all share one generated prefix, so directory sharding would not
/// spread them; a flat layout keeps the directory inspectable.
#[derive(Clone)]
pub struct DiskBackend {
    upload_dir: PathBuf,
}

impl DiskBackend {
    /// Create a new disk storage backend
    pub fn new(upload_dir: PathBuf) -> Self {
        Self { upload_dir }
    }

    /// Resolve the file path for a key, rejecting anything that could
    /// escape the upload directory
    fn blob_path(&self, key: &str) -> Option<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.contains("..") {
            return None;
        }
        Some(self.upload_dir.join(key))
    }
}

#[async_trait]
impl StorageBackend for DiskBackend {
    async fn save(&self, data: Vec<u8>, key: &str) -> AppResult<String> {
        let path = self
            .blob_path(key)
            .ok_or_else(|| AppError::Storage(format!("Invalid storage key: {}", key)))?;

        fs::create_dir_all(&self.upload_dir).await.map_err(|e| {
            AppError::Storage(format!("Failed to create upload directory: {}", e))
        })?;

        fs::write(&path, data)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write {}: {}", key, e)))?;

        debug!("Saved original to {}", path.display());
        Ok(path.display().to_string())
    }

    async fn read(&self, key: &str) -> AppResult<Option<Vec<u8>>> {
        let Some(path) = self.blob_path(key) else {
            return Ok(None);
        };

        match fs::read(&path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Storage(format!("Failed to read {}: {}", key, e))),
        }
    }
}
