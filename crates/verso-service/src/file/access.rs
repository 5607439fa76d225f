//! Presigned read access to current and historical blobs.

use std::sync::Arc;

use verso_core::error::AppError;
use verso_core::result::AppResult;
use verso_core::traits::BlobStore;
use verso_core::types::{FileId, FileVersionId};
use verso_entity::file::{FileEntryRepository, FileVersionRepository};

/// TTL applied to every presigned read URL.
const PRESIGN_TTL_SECS: u64 = 3_600;

/// Issues time-bounded read URLs for file blobs.
///
/// Ownership checks are not enforced here; authorization happens in the
/// calling layer. Historical versions stay presignable after the owning
/// entry is soft-deleted. Only "current" reads require a live entry.
#[derive(Debug, Clone)]
pub struct AccessService {
    entries: Arc<dyn FileEntryRepository>,
    versions: Arc<dyn FileVersionRepository>,
    blobs: Arc<dyn BlobStore>,
}

impl AccessService {
    /// Creates a new access service.
    pub fn new(
        entries: Arc<dyn FileEntryRepository>,
        versions: Arc<dyn FileVersionRepository>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            entries,
            versions,
            blobs,
        }
    }

    /// Presign the blob behind a live file's current version.
    pub async fn presign_current(&self, file_id: FileId) -> AppResult<String> {
        let entry = self
            .entries
            .find_by_id(file_id)
            .await?
            .filter(|e| !e.deleted)
            .ok_or_else(|| AppError::not_found(format!("File not found: {file_id}")))?;

        let versions = self.versions.find_by_file_id(file_id).await?;
        let current = versions
            .into_iter()
            .find(|v| v.version_number == entry.current_version)
            .ok_or_else(|| {
                AppError::not_found(format!(
                    "Version {} not found for file {file_id}",
                    entry.current_version
                ))
            })?;

        self.blobs.presign(&current.storage_key, PRESIGN_TTL_SECS).await
    }

    /// Presign a specific historical version's blob.
    pub async fn presign_version(&self, version_id: FileVersionId) -> AppResult<String> {
        let version = self
            .versions
            .find_by_id(version_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File version not found: {version_id}")))?;

        self.blobs.presign(&version.storage_key, PRESIGN_TTL_SECS).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::delete::DeletionService;
    use crate::file::upload::{UploadRequest, UploadService};
    use crate::testing::{
        CapturingEventSink, InMemoryBlobStore, InMemoryFileEntryRepository,
        InMemoryFileVersionRepository,
    };
    use bytes::Bytes;
    use verso_core::error::ErrorKind;
    use verso_core::types::OwnerId;
    use verso_entity::file::FileEntry;

    struct Harness {
        versions: Arc<InMemoryFileVersionRepository>,
        upload: UploadService,
        access: AccessService,
        delete: DeletionService,
    }

    fn harness() -> Harness {
        let entries = Arc::new(InMemoryFileEntryRepository::new());
        let versions = Arc::new(InMemoryFileVersionRepository::new());
        let blobs = Arc::new(InMemoryBlobStore::new());
        let events = Arc::new(CapturingEventSink::new());
        let upload = UploadService::new(
            entries.clone(),
            versions.clone(),
            blobs.clone(),
            events.clone(),
            1024 * 1024,
        );
        let access = AccessService::new(entries.clone(), versions.clone(), blobs);
        let delete = DeletionService::new(entries, events);
        Harness {
            versions,
            upload,
            access,
            delete,
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
    async fn test_presign_current_targets_current_version_key() {
        let h = harness();
        let owner = OwnerId::new();
        upload(&h, owner, "v1").await;
        let entry = upload(&h, owner, "v2-longer").await;

        let url = h.access.presign_current(entry.id).await.unwrap();
        assert!(url.contains(&format!("{}/v2", entry.id)));
    }

    #[tokio::test]
    async fn test_presign_current_is_stable_for_unchanged_file() {
        let h = harness();
        let entry = upload(&h, OwnerId::new(), "v1").await;

        let first = h.access.presign_current(entry.id).await.unwrap();
        let second = h.access.presign_current(entry.id).await.unwrap();
        // URLs may differ in expiry but must target the same storage key.
        let key = format!("{}/v1", entry.id);
        assert!(first.contains(&key));
        assert!(second.contains(&key));
    }

    #[tokio::test]
    async fn test_presign_current_unknown_file_is_not_found() {
        let h = harness();
        let err = h.access.presign_current(FileId::new()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_soft_delete_blocks_current_but_not_versions() {
        let h = harness();
        let owner = OwnerId::new();
        upload(&h, owner, "v1").await;
        let entry = upload(&h, owner, "v2-longer").await;

        h.delete.delete(entry.id).await.unwrap();

        let err = h.access.presign_current(entry.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);

        // Every historical version is still presignable.
        for version in h.versions.find_by_file_id(entry.id).await.unwrap() {
            let url = h.access.presign_version(version.id).await.unwrap();
            assert!(url.contains(&version.storage_key));
        }
    }

    #[tokio::test]
    async fn test_presign_unknown_version_is_not_found() {
        let h = harness();
        let err = h
            .access
            .presign_version(FileVersionId::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
