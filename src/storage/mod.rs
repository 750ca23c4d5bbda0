/// Key-addressed blob storage for uploaded originals
///
/// Supports multiple backend implementations (local disk, S3-compatible
/// object storage). The backend is selected once at startup and shared
/// across request handlers.

pub mod disk;
pub mod s3;

pub use disk::DiskBackend;
pub use s3::S3Backend;

use crate::error::AppResult;
use async_trait::async_trait;

/// Storage backend trait
///
/// Read-after-write consistent for a single key: the view path may read a
/// key immediately after the upload path wrote it.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Store a blob under a key and return a backend-specific locator
    async fn save(&self, data: Vec<u8>, key: &str) -> AppResult<String>;

    /// Retrieve a blob by key; `Ok(None)` means the key does not exist,
    /// as opposed to a backend failure
    async fn read(&self, key: &str) -> AppResult<Option<Vec<u8>>>;
}
