//! Blob store trait for pluggable object-storage backends.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

use crate::result::AppResult;

/// A byte stream type used for reading blob contents.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Trait for object-storage backends holding file version blobs.
///
/// Blobs are write-once: a storage key is never overwritten, and keys are
/// derived from `(file_id, version_number)` so they never collide across
/// versions or files. Implementations exist for S3-compatible stores and
/// the local filesystem; the [`BlobStore`] trait is defined here in
/// `verso-core` and implemented in `verso-storage`.
#[async_trait]
pub trait BlobStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local", "s3").
    fn provider_type(&self) -> &str;

    /// Check whether the provider is healthy and reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Write a blob under the given storage key.
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> AppResult<()>;

    /// Read a blob as a byte stream.
    async fn get(&self, key: &str) -> AppResult<ByteStream>;

    /// Delete the blob at the given storage key.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Check whether a blob exists at the given storage key.
    async fn exists(&self, key: &str) -> AppResult<bool>;

    /// Produce a time-limited, credential-free read URL for a blob.
    async fn presign(&self, key: &str, ttl_seconds: u64) -> AppResult<String>;
}
