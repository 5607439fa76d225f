//! Metadata repository contracts for file entries and versions.

use async_trait::async_trait;

use verso_core::result::AppResult;
use verso_core::types::{FileId, FileVersionId, OwnerId};

use crate::file::model::FileEntry;
use crate::file::version::FileVersion;

/// Persistence contract for [`FileEntry`] rows.
///
/// Implementations must enforce uniqueness of `(owner_id, name)` among
/// non-deleted entries and surface violations as
/// [`ErrorKind::Conflict`](verso_core::error::ErrorKind::Conflict) so the
/// upload coordinator can retry.
#[async_trait]
pub trait FileEntryRepository: Send + Sync + std::fmt::Debug + 'static {
    /// Insert or update an entry, returning the persisted row.
    async fn save(&self, entry: &FileEntry) -> AppResult<FileEntry>;

    /// Find an entry by ID (deleted entries included).
    async fn find_by_id(&self, id: FileId) -> AppResult<Option<FileEntry>>;

    /// Find the non-deleted entry for `(owner_id, name)`, if any.
    async fn find_by_owner_and_name(
        &self,
        owner_id: OwnerId,
        name: &str,
    ) -> AppResult<Option<FileEntry>>;

    /// List all non-deleted entries for an owner.
    async fn find_by_owner(&self, owner_id: OwnerId) -> AppResult<Vec<FileEntry>>;
}

/// Persistence contract for [`FileVersion`] rows.
///
/// Version rows are append-only. Implementations must enforce uniqueness
/// of `(file_id, version_number)` and surface violations as
/// [`ErrorKind::Conflict`](verso_core::error::ErrorKind::Conflict); this
/// constraint is what serializes concurrent version-number allocation.
#[async_trait]
pub trait FileVersionRepository: Send + Sync + std::fmt::Debug + 'static {
    /// Insert a new version row, returning the persisted row.
    async fn save(&self, version: &FileVersion) -> AppResult<FileVersion>;

    /// Find a version by its own ID.
    async fn find_by_id(&self, id: FileVersionId) -> AppResult<Option<FileVersion>>;

    /// List all versions of a file, newest first.
    async fn find_by_file_id(&self, file_id: FileId) -> AppResult<Vec<FileVersion>>;

    /// Highest committed version number for a file, or `None` if the file
    /// has no versions yet.
    async fn find_max_version_number(&self, file_id: FileId) -> AppResult<Option<i32>>;
}
