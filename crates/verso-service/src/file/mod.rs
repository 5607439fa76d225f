//! File services: upload, restore, presigned access, deletion, queries.

pub mod access;
pub mod allocator;
pub mod delete;
pub mod restore;
pub mod service;
pub mod upload;

pub use access::AccessService;
pub use allocator::VersionAllocator;
pub use delete::DeletionService;
pub use restore::RestoreService;
pub use service::FileService;
pub use upload::{UploadRequest, UploadService};
