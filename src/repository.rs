/// Original-image repository
///
/// Assigns a collision-resistant key to each uploaded blob and stores it
/// unmodified. Originals are create-once, read-many; they are never
/// updated or deleted.
use crate::{error::AppResult, storage::StorageBackend};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

pub struct OriginalImageRepository {
    storage: Arc<dyn StorageBackend>,
}

impl OriginalImageRepository {
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self { storage }
    }

    /// Store an uploaded original and return its generated key.
    ///
    /// Only the sanitized extension of the client-supplied filename
    /// survives into the key; the rest is replaced by a random identifier.
    pub async fn store(&self, data: Vec<u8>, original_filename: &str) -> AppResult<String> {
        let ext = sanitized_extension(original_filename);
        let key = format!("original-image-{}{}", Uuid::new_v4(), ext);

        self.storage.save(data, &key).await?;
        info!("Stored original image as {}", key);

        Ok(key)
    }
}

/// Extract a safe extension (including the leading dot) from a
/// client-supplied filename, or an empty string if none survives.
///
/// Strips path components and keeps only ASCII alphanumerics so the
/// extension can never smuggle separators or control characters into a
/// storage key.
fn sanitized_extension(filename: &str) -> String {
    let basename = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    match basename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => {
            let cleaned: String = ext
                .chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .take(16)
                .collect();
            if cleaned.is_empty() {
                String::new()
            } else {
                format!(".{}", cleaned)
            }
        }
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::DiskBackend;
    use tempfile::tempdir;

    #[test]
    fn test_sanitized_extension() {
        assert_eq!(sanitized_extension("photo.png"), ".png");
        assert_eq!(sanitized_extension("photo.JPEG"), ".JPEG");
        assert_eq!(sanitized_extension("archive.tar.gz"), ".gz");
        assert_eq!(sanitized_extension("../../etc/passwd.png"), ".png");
        assert_eq!(sanitized_extension("C:\\temp\\shot.bmp"), ".bmp");
        assert_eq!(sanitized_extension("noextension"), "");
        assert_eq!(sanitized_extension(".hidden"), "");
        assert_eq!(sanitized_extension("weird.p/ng"), "");
        assert_eq!(sanitized_extension(""), "");
    }

    #[tokio::test]
    async fn test_store_round_trip() {
        let dir = tempdir().unwrap();
        let storage: Arc<dyn StorageBackend> =
            Arc::new(DiskBackend::new(dir.path().to_path_buf()));
        let repo = OriginalImageRepository::new(Arc::clone(&storage));

        let data = b"original bytes".to_vec();
        let key = repo.store(data.clone(), "cat.png").await.unwrap();

        assert!(key.starts_with("original-image-"));
        assert!(key.ends_with(".png"));

        // read-after-write: the key resolves to the unmodified bytes
        let read_back = storage.read(&key).await.unwrap();
        assert_eq!(read_back, Some(data));
    }

    #[tokio::test]
    async fn test_store_generates_unique_keys() {
        let dir = tempdir().unwrap();
        let storage: Arc<dyn StorageBackend> =
            Arc::new(DiskBackend::new(dir.path().to_path_buf()));
        let repo = OriginalImageRepository::new(storage);

        let a = repo.store(b"a".to_vec(), "x.png").await.unwrap();
        let b = repo.store(b"b".to_vec(), "x.png").await.unwrap();
        assert_ne!(a, b);
    }
}
