/// Configuration management for the image service
use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub hostname: String,
    pub port: u16,
    /// Maximum accepted upload size in bytes
    pub upload_limit: usize,
    /// Maximum decoded pixel count (width * height) per view request
    pub max_pixels: u64,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub provider: StorageProvider,
}

/// Storage provider selection, fixed at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StorageProvider {
    Local {
        upload_dir: PathBuf,
    },
    S3 {
        bucket: String,
        region: String,
        access_key_id: String,
        secret_access_key: String,
        endpoint: Option<String>,
    },
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> AppResult<Self> {
        dotenv::dotenv().ok();

        let hostname = env::var("PRISM_HOSTNAME").unwrap_or_else(|_| "localhost".to_string());
        let port = env::var("PRISM_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| AppError::Validation("Invalid port number".to_string()))?;

        let upload_limit = env::var("PRISM_UPLOAD_LIMIT")
            .unwrap_or_else(|_| "10485760".to_string())
            .parse()
            .unwrap_or(10 * 1024 * 1024);
        let max_pixels = env::var("PRISM_MAX_PIXELS")
            .unwrap_or_else(|_| "50000000".to_string())
            .parse()
            .unwrap_or(50_000_000);

        let provider = match env::var("PRISM_STORAGE_PROVIDER")
            .unwrap_or_else(|_| "local".to_string())
            .as_str()
        {
            "s3" => StorageProvider::S3 {
                bucket: env::var("PRISM_S3_BUCKET")
                    .map_err(|_| AppError::Validation("S3 bucket required".to_string()))?,
                region: env::var("PRISM_S3_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
                access_key_id: env::var("PRISM_S3_ACCESS_KEY_ID")
                    .map_err(|_| AppError::Validation("S3 access key required".to_string()))?,
                secret_access_key: env::var("PRISM_S3_SECRET_ACCESS_KEY")
                    .map_err(|_| AppError::Validation("S3 secret key required".to_string()))?,
                endpoint: env::var("PRISM_S3_ENDPOINT").ok(),
            },
            _ => StorageProvider::Local {
                upload_dir: env::var("PRISM_UPLOAD_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("./local_uploads")),
            },
        };

        Ok(ServerConfig {
            service: ServiceConfig {
                hostname,
                port,
                upload_limit,
                max_pixels,
            },
            storage: StorageConfig { provider },
        })
    }
}
