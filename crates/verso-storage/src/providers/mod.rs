//! Blob store provider implementations.

pub mod local;
#[cfg(feature = "s3")]
pub mod s3;

pub use local::LocalBlobStore;
#[cfg(feature = "s3")]
pub use s3::S3BlobStore;
