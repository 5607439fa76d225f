//! Local filesystem blob store.
//!
//! Blobs live under a configured root directory, one file per storage key.
//! Presigned URLs are emulated with an HMAC-SHA256 signature over
//! `key:expiry`; the front proxy serving `public_base_url` is expected to
//! verify the signature before handing out bytes.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use futures::stream::StreamExt;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tokio::fs;
use tokio_util::io::ReaderStream;
use tracing::debug;

use verso_core::config::storage::LocalStorageConfig;
use verso_core::error::{AppError, ErrorKind};
use verso_core::result::AppResult;
use verso_core::traits::blob_store::{BlobStore, ByteStream};

type HmacSha256 = Hmac<Sha256>;

/// Local filesystem blob store.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    /// Root directory for all stored blobs.
    root: PathBuf,
    /// Base URL prepended to signed read URLs.
    public_base_url: String,
    /// Secret used to sign read URLs.
    presign_secret: String,
}

impl LocalBlobStore {
    /// Create a new local blob store rooted at the configured path.
    pub async fn new(config: &LocalStorageConfig) -> AppResult<Self> {
        let root = PathBuf::from(&config.root_path);
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self {
            root,
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
            presign_secret: config.presign_secret.clone(),
        })
    }

    /// Resolve a storage key to an absolute path within the root.
    fn resolve(&self, key: &str) -> PathBuf {
        let clean = key.trim_start_matches('/');
        self.root.join(clean)
    }

    /// Ensure the parent directory of a path exists.
    async fn ensure_parent(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create parent directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }

    /// HMAC-SHA256 signature over `key:expiry`, hex encoded.
    fn sign(&self, key: &str, expires_unix: i64) -> AppResult<String> {
        let mut mac = HmacSha256::new_from_slice(self.presign_secret.as_bytes())
            .map_err(|e| AppError::internal(format!("Invalid presign secret: {e}")))?;
        mac.update(key.as_bytes());
        mac.update(b":");
        mac.update(expires_unix.to_string().as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(self.root.exists() && self.root.is_dir())
    }

    async fn put(&self, key: &str, data: Bytes, _content_type: &str) -> AppResult<()> {
        let full_path = self.resolve(key);
        self.ensure_parent(&full_path).await?;

        fs::write(&full_path, &data).await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, format!("Failed to write blob: {key}"), e)
        })?;

        debug!(key, bytes = data.len(), "Wrote blob");
        Ok(())
    }

    async fn get(&self, key: &str) -> AppResult<ByteStream> {
        let full_path = self.resolve(key);
        let file = fs::File::open(&full_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("Blob not found: {key}"))
            } else {
                AppError::with_source(ErrorKind::Storage, format!("Failed to open blob: {key}"), e)
            }
        })?;

        let stream = ReaderStream::new(file);
        Ok(Box::pin(stream.map(|r| r.map(|b| b.into()))))
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let full_path = self.resolve(key);
        fs::remove_file(&full_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("Blob not found: {key}"))
            } else {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to delete blob: {key}"),
                    e,
                )
            }
        })?;
        debug!(key, "Deleted blob");
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        let full_path = self.resolve(key);
        fs::try_exists(&full_path).await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, format!("Failed to stat blob: {key}"), e)
        })
    }

    async fn presign(&self, key: &str, ttl_seconds: u64) -> AppResult<String> {
        let expires = Utc::now().timestamp() + ttl_seconds as i64;
        let signature = self.sign(key, expires)?;
        Ok(format!(
            "{}/{}?expires={}&sig={}",
            self.public_base_url, key, expires, signature
        ))
    }
}
