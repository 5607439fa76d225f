//! File entry entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use verso_core::types::{FileId, OwnerId};

/// A logical file: the aggregate root over its version history.
///
/// `name`, `content_type`, and `size` mirror the version identified by
/// `current_version`. At most one non-deleted entry exists per
/// `(owner_id, name)`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FileEntry {
    /// Unique file identifier, assigned at creation and never reused.
    pub id: FileId,
    /// The owning tenant/user.
    pub owner_id: OwnerId,
    /// Logical filename.
    pub name: String,
    /// MIME type of the current version.
    pub content_type: String,
    /// Size in bytes of the current version.
    pub size: i64,
    /// Version number of the most recently committed version.
    pub current_version: i32,
    /// Soft-delete flag; history and blobs survive deletion.
    pub deleted: bool,
    /// When the file was first created.
    pub created_at: DateTime<Utc>,
    /// When the file last changed state.
    pub updated_at: DateTime<Utc>,
}

impl FileEntry {
    /// Create a new file entry for a first upload. The caller commits
    /// version 1 alongside it.
    pub fn create(owner_id: OwnerId, name: String, content_type: String, size: i64) -> Self {
        let now = Utc::now();
        Self {
            id: FileId::new(),
            owner_id,
            name,
            content_type,
            size,
            current_version: 1,
            deleted: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Repoint the entry at a (new or restored) version's snapshot.
    pub fn update_to_version(
        mut self,
        name: String,
        content_type: String,
        size: i64,
        version_number: i32,
    ) -> Self {
        self.name = name;
        self.content_type = content_type;
        self.size = size;
        self.current_version = version_number;
        self.updated_at = Utc::now();
        self
    }

    /// Soft-delete the entry.
    pub fn mark_deleted(mut self) -> Self {
        self.deleted = true;
        self.updated_at = Utc::now();
        self
    }
}
