/// S3-compatible storage backend
use crate::{
    error::{AppError, AppResult},
    storage::StorageBackend,
};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::config::Builder as S3ConfigBuilder;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use std::sync::Arc;
use tracing::{debug, error, info};

/// S3 storage backend
///
/// Supports AWS S3 and S3-compatible storage providers (MinIO,
/// DigitalOcean Spaces, etc.)
#[derive(Clone)]
pub struct S3Backend {
    client: Arc<Client>,
    bucket: String,
}

/// Configuration for S3 storage
#[derive(Debug, Clone)]
pub struct S3Config {
    /// S3 bucket name
    pub bucket: String,

    /// AWS region (e.g., "us-east-1")
    pub region: String,

    /// Custom endpoint for S3-compatible services
    /// Example: "https://nyc3.digitaloceanspaces.com" or "http://localhost:9000"
    pub endpoint: Option<String>,

    /// AWS access key ID
    pub access_key_id: String,

    /// AWS secret access key
    pub secret_access_key: String,
}

impl S3Backend {
    /// Create a new S3 storage backend
    pub async fn new(config: S3Config) -> AppResult<Self> {
        info!(
            "Initializing S3 storage (bucket: {}, region: {})",
            config.bucket, config.region
        );

        let credentials = Credentials::from_keys(
            &config.access_key_id,
            &config.secret_access_key,
            None, // session token
        );

        let aws_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .load()
            .await;

        let mut s3_config_builder = S3ConfigBuilder::from(&aws_config);

        if let Some(endpoint) = &config.endpoint {
            debug!("Using custom S3 endpoint: {}", endpoint);
            s3_config_builder = s3_config_builder
                .endpoint_url(endpoint)
                .force_path_style(true); // Required for MinIO and some S3-compatible services
        }

        let client = Client::from_conf(s3_config_builder.build());

        Ok(Self {
            client: Arc::new(client),
            bucket: config.bucket,
        })
    }

    /// Get the S3 object key for an original-image key
    fn object_key(key: &str) -> String {
        format!("uploads/{}", key)
    }
}

#[async_trait]
impl StorageBackend for S3Backend {
    async fn save(&self, data: Vec<u8>, key: &str) -> AppResult<String> {
        let object_key = Self::object_key(key);

        debug!("Uploading original to S3: {} ({} bytes)", object_key, data.len());

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&object_key)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| {
                error!("Failed to upload original to S3: {}", e);
                AppError::Storage(format!("S3 upload failed: {}", e))
            })?;

        Ok(format!("s3://{}/{}", self.bucket, object_key))
    }

    async fn read(&self, key: &str) -> AppResult<Option<Vec<u8>>> {
        let object_key = Self::object_key(key);

        debug!("Downloading original from S3: {}", object_key);

        match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&object_key)
            .send()
            .await
        {
            Ok(response) => {
                let data = response
                    .body
                    .collect()
                    .await
                    .map_err(|e| {
                        error!("Failed to read S3 object body: {}", e);
                        AppError::Storage(format!("Failed to read S3 object: {}", e))
                    })?
                    .into_bytes()
                    .to_vec();

                Ok(Some(data))
            }
            Err(e) => {
                // Absent keys are a normal outcome on the view path
                let error_msg = format!("{:?}", e);
                if error_msg.contains("NoSuchKey") || error_msg.contains("NotFound") {
                    debug!("Original not found in S3: {}", object_key);
                    Ok(None)
                } else {
                    error!("Failed to download original from S3: {}", e);
                    Err(AppError::Storage(format!("S3 download failed: {}", e)))
                }
            }
        }
    }
}
