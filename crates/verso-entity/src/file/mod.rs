//! File domain entities and repository contracts.

pub mod model;
pub mod repository;
pub mod version;

pub use model::FileEntry;
pub use repository::{FileEntryRepository, FileVersionRepository};
pub use version::FileVersion;
