//! # verso-storage
//!
//! Blob store implementations for Verso: S3-compatible object storage and
//! a local-filesystem provider for development. Exactly one provider is
//! activated per process, selected from configuration at startup.

pub mod providers;

use std::sync::Arc;

use verso_core::config::storage::StorageConfig;
use verso_core::error::AppError;
use verso_core::result::AppResult;
use verso_core::traits::BlobStore;

use providers::LocalBlobStore;
#[cfg(feature = "s3")]
use providers::S3BlobStore;

/// Construct the blob store named by `storage.provider`.
pub async fn connect(config: &StorageConfig) -> AppResult<Arc<dyn BlobStore>> {
    match config.provider.as_str() {
        "local" => {
            let provider = LocalBlobStore::new(&config.local).await?;
            Ok(Arc::new(provider))
        }
        #[cfg(feature = "s3")]
        "s3" => {
            let provider = S3BlobStore::new(&config.s3).await?;
            Ok(Arc::new(provider))
        }
        other => Err(AppError::configuration(format!(
            "Unknown storage provider '{other}'"
        ))),
    }
}
