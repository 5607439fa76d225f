//! # verso-service
//!
//! Business logic service layer for Verso. Each service orchestrates the
//! metadata repositories, the blob store, and the event sink to implement
//! one application-level operation.
//!
//! Services follow constructor injection — all dependencies are provided
//! at construction time as `Arc<dyn Trait>` capability references, with
//! the concrete backends chosen from configuration at startup.

pub mod file;
pub mod testing;

pub use file::{
    AccessService, DeletionService, FileService, RestoreService, UploadRequest, UploadService,
    VersionAllocator,
};
