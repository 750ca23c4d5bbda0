/// Application context and dependency injection
///
/// All shared services are constructed once at startup and handed to the
/// router as cloneable state; nothing is mutated after init.
use crate::{
    config::{ServerConfig, StorageProvider},
    error::AppResult,
    repository::OriginalImageRepository,
    storage::{s3::S3Config, DiskBackend, S3Backend, StorageBackend},
};
use std::sync::Arc;
use tracing::info;

/// Application context holding all shared services
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub storage: Arc<dyn StorageBackend>,
    pub originals: Arc<OriginalImageRepository>,
}

impl AppContext {
    /// Build the context, selecting the storage backend from config
    pub async fn new(config: ServerConfig) -> AppResult<Self> {
        let storage: Arc<dyn StorageBackend> = match &config.storage.provider {
            StorageProvider::Local { upload_dir } => {
                info!("Selected storage provider: local ({})", upload_dir.display());
                Arc::new(DiskBackend::new(upload_dir.clone()))
            }
            StorageProvider::S3 {
                bucket,
                region,
                access_key_id,
                secret_access_key,
                endpoint,
            } => {
                info!("Selected storage provider: s3 (bucket {})", bucket);
                Arc::new(
                    S3Backend::new(S3Config {
                        bucket: bucket.clone(),
                        region: region.clone(),
                        endpoint: endpoint.clone(),
                        access_key_id: access_key_id.clone(),
                        secret_access_key: secret_access_key.clone(),
                    })
                    .await?,
                )
            }
        };

        let originals = Arc::new(OriginalImageRepository::new(Arc::clone(&storage)));

        Ok(Self {
            config: Arc::new(config),
            storage,
            originals,
        })
    }
}
