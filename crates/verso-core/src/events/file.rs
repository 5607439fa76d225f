//! File-related domain events.

use serde::{Deserialize, Serialize};

use crate::types::{FileId, FileVersionId, OwnerId};

/// Events related to file operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FileEvent {
    /// A file was uploaded (new file or new version made current).
    Uploaded {
        /// The file ID.
        file_id: FileId,
        /// The owning tenant/user.
        owner_id: OwnerId,
        /// The version the upload committed.
        version_id: FileVersionId,
        /// The file size in bytes.
        size: i64,
        /// The MIME type.
        content_type: String,
    },
    /// A new file version was committed.
    VersionUploaded {
        /// The file ID.
        file_id: FileId,
        /// The new version's ID.
        version_id: FileVersionId,
        /// The new version number.
        version_number: i32,
        /// Who uploaded the version.
        created_by: OwnerId,
        /// The filename at upload time.
        name: String,
        /// The MIME type.
        content_type: String,
        /// Size in bytes.
        size: i64,
    },
    /// A file was soft-deleted.
    Deleted {
        /// The file ID.
        file_id: FileId,
        /// Why the file was deleted.
        reason: String,
    },
}

impl FileEvent {
    /// The file this event concerns.
    pub fn file_id(&self) -> FileId {
        match self {
            Self::Uploaded { file_id, .. }
            | Self::VersionUploaded { file_id, .. }
            | Self::Deleted { file_id, .. } => *file_id,
        }
    }
}
