//! File version entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use verso_core::types::{FileId, FileVersionId, OwnerId};

/// One committed version of a file. Immutable once created; versions are
/// never renumbered or deleted, even when the owning entry is soft-deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FileVersion {
    /// Unique version identifier.
    pub id: FileVersionId,
    /// The file this version belongs to.
    pub file_id: FileId,
    /// Sequential version number, starting at 1, unique per file.
    pub version_number: i32,
    /// Filename snapshot at upload time.
    pub name: String,
    /// MIME type snapshot.
    pub content_type: String,
    /// Size in bytes.
    pub size: i64,
    /// Key under which this version's blob is stored.
    pub storage_key: String,
    /// When this version was committed.
    pub created_at: DateTime<Utc>,
    /// Who uploaded this version.
    pub created_by: OwnerId,
}

impl FileVersion {
    /// Create a new version record with its storage key derived from
    /// `(file_id, version_number)`.
    pub fn create(
        file_id: FileId,
        version_number: i32,
        name: String,
        content_type: String,
        size: i64,
        created_by: OwnerId,
    ) -> Self {
        Self {
            id: FileVersionId::new(),
            file_id,
            version_number,
            name,
            content_type,
            size,
            storage_key: Self::storage_key_for(file_id, version_number),
            created_at: Utc::now(),
            created_by,
        }
    }

    /// Deterministic storage key for a version's blob. Keys never collide
    /// across versions or files and are never reused.
    pub fn storage_key_for(file_id: FileId, version_number: i32) -> String {
        format!("{file_id}/v{version_number}")
    }
}
