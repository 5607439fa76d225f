//! File restore service — reinstates an older version as current state.

use std::sync::Arc;

use tracing::info;

use verso_core::error::AppError;
use verso_core::result::AppResult;
use verso_core::types::FileId;
use verso_entity::file::{FileEntry, FileEntryRepository, FileVersionRepository};

/// Restores a file to one of its historical versions.
///
/// Restore repoints the entry: the target version's snapshot is copied
/// onto the entry and `current_version` is set to the target number. No
/// version row is created and no blob is written; subsequent reads of
/// "current" resolve through the target version's existing storage key.
#[derive(Debug, Clone)]
pub struct RestoreService {
    entries: Arc<dyn FileEntryRepository>,
    versions: Arc<dyn FileVersionRepository>,
}

impl RestoreService {
    /// Creates a new restore service.
    pub fn new(
        entries: Arc<dyn FileEntryRepository>,
        versions: Arc<dyn FileVersionRepository>,
    ) -> Self {
        Self { entries, versions }
    }

    /// Restore `file_id` to `target_version_number`.
    pub async fn restore(
        &self,
        file_id: FileId,
        target_version_number: i32,
    ) -> AppResult<FileEntry> {
        let entry = self
            .entries
            .find_by_id(file_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File not found: {file_id}")))?;

        let versions = self.versions.find_by_file_id(file_id).await?;
        let target = versions
            .into_iter()
            .find(|v| v.version_number == target_version_number)
            .ok_or_else(|| {
                AppError::not_found(format!("Version not found: {target_version_number}"))
            })?;

        let updated = entry.update_to_version(
            target.name,
            target.content_type,
            target.size,
            target.version_number,
        );
        let saved = self.entries.save(&updated).await?;

        info!(
            file_id = %file_id,
            version = target_version_number,
            "Restored file to version"
        );
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::upload::{UploadRequest, UploadService};
    use crate::testing::{
        CapturingEventSink, InMemoryBlobStore, InMemoryFileEntryRepository,
        InMemoryFileVersionRepository,
    };
    use bytes::Bytes;
    use verso_core::error::ErrorKind;
    use verso_core::types::OwnerId;

    struct Harness {
        entries: Arc<InMemoryFileEntryRepository>,
        versions: Arc<InMemoryFileVersionRepository>,
        upload: UploadService,
        restore: RestoreService,
    }

    fn harness() -> Harness {
        let entries = Arc::new(InMemoryFileEntryRepository::new());
        let versions = Arc::new(InMemoryFileVersionRepository::new());
        let blobs = Arc::new(InMemoryBlobStore::new());
        let events = Arc::new(CapturingEventSink::new());
        let upload = UploadService::new(
            entries.clone(),
            versions.clone(),
            blobs,
            events,
            1024 * 1024,
        );
        let restore = RestoreService::new(entries.clone(), versions.clone());
        Harness {
            entries,
            versions,
            upload,
            restore,
        }
    }

    async fn upload(h: &Harness, owner: OwnerId, body: &'static str) -> FileEntry {
        h.upload
            .upload(UploadRequest {
                owner_id: owner,
                name: "a.txt".into(),
                content_type: "text/plain".into(),
                size: body.len() as i64,
                data: Bytes::from_static(body.as_bytes()),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_restore_repoints_without_new_version() {
        let h = harness();
        let owner = OwnerId::new();
        upload(&h, owner, "0123456789").await;
        let entry = upload(&h, owner, "01234567890123456789").await;
        assert_eq!(entry.current_version, 2);

        let restored = h.restore.restore(entry.id, 1).await.unwrap();
        assert_eq!(restored.current_version, 1);
        assert_eq!(restored.size, 10);

        // History unchanged: still exactly two version rows.
        let versions = h.versions.find_by_file_id(entry.id).await.unwrap();
        assert_eq!(versions.len(), 2);
    }

    #[tokio::test]
    async fn test_restore_unknown_version_leaves_entry_unchanged() {
        let h = harness();
        let owner = OwnerId::new();
        let entry = upload(&h, owner, "0123456789").await;

        let err = h.restore.restore(entry.id, 7).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);

        let unchanged = h.entries.find_by_id(entry.id).await.unwrap().unwrap();
        assert_eq!(unchanged.current_version, 1);
        assert_eq!(unchanged.size, 10);
        assert_eq!(unchanged.updated_at, entry.updated_at);
    }

    #[tokio::test]
    async fn test_restore_unknown_file_is_not_found() {
        let h = harness();
        let err = h.restore.restore(FileId::new(), 1).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
