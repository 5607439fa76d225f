//! File metadata queries.

use std::sync::Arc;

use verso_core::error::AppError;
use verso_core::result::AppResult;
use verso_core::types::{FileId, FileVersionId, OwnerId};
use verso_entity::file::{FileEntry, FileEntryRepository, FileVersion, FileVersionRepository};

/// Read-only metadata queries over files and their version history.
#[derive(Debug, Clone)]
pub struct FileService {
    entries: Arc<dyn FileEntryRepository>,
    versions: Arc<dyn FileVersionRepository>,
}

impl FileService {
    /// Creates a new file query service.
    pub fn new(
        entries: Arc<dyn FileEntryRepository>,
        versions: Arc<dyn FileVersionRepository>,
    ) -> Self {
        Self { entries, versions }
    }

    /// Fetch a live file's metadata. Soft-deleted files read as absent.
    pub async fn get_file(&self, file_id: FileId) -> AppResult<FileEntry> {
        self.entries
            .find_by_id(file_id)
            .await?
            .filter(|e| !e.deleted)
            .ok_or_else(|| AppError::not_found(format!("File not found: {file_id}")))
    }

    /// List an owner's live files.
    pub async fn list_files(&self, owner_id: OwnerId) -> AppResult<Vec<FileEntry>> {
        self.entries.find_by_owner(owner_id).await
    }

    /// List a file's versions, newest first. History remains listable
    /// after the file is soft-deleted.
    pub async fn list_versions(&self, file_id: FileId) -> AppResult<Vec<FileVersion>> {
        self.entries
            .find_by_id(file_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File not found: {file_id}")))?;
        self.versions.find_by_file_id(file_id).await
    }

    /// Fetch a single version's metadata by its own id.
    pub async fn get_version(&self, version_id: FileVersionId) -> AppResult<FileVersion> {
        self.versions
            .find_by_id(version_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File version not found: {version_id}")))
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

    struct Harness {
        upload: UploadService,
        delete: DeletionService,
        files: FileService,
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
            events.clone(),
            1024 * 1024,
        );
        let delete = DeletionService::new(entries.clone(), events);
        let files = FileService::new(entries, versions);
        Harness {
            upload,
            delete,
            files,
        }
    }

    async fn upload(h: &Harness, owner: OwnerId, name: &str, body: &'static str) -> FileEntry {
        h.upload
            .upload(UploadRequest {
                owner_id: owner,
                name: name.to_string(),
                content_type: "text/plain".into(),
                size: body.len() as i64,
                data: Bytes::from_static(body.as_bytes()),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_get_file_hides_soft_deleted() {
        let h = harness();
        let entry = upload(&h, OwnerId::new(), "a.txt", "x").await;

        assert_eq!(h.files.get_file(entry.id).await.unwrap().id, entry.id);

        h.delete.delete(entry.id).await.unwrap();
        let err = h.files.get_file(entry.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_list_files_excludes_deleted_and_other_owners() {
        let h = harness();
        let owner = OwnerId::new();
        let kept = upload(&h, owner, "a.txt", "x").await;
        let removed = upload(&h, owner, "b.txt", "x").await;
        upload(&h, OwnerId::new(), "c.txt", "x").await;

        h.delete.delete(removed.id).await.unwrap();

        let listed = h.files.list_files(owner).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, kept.id);
    }

    #[tokio::test]
    async fn test_list_versions_newest_first_and_survives_delete() {
        let h = harness();
        let owner = OwnerId::new();
        upload(&h, owner, "a.txt", "v1").await;
        let entry = upload(&h, owner, "a.txt", "v2-longer").await;

        h.delete.delete(entry.id).await.unwrap();

        let versions = h.files.list_versions(entry.id).await.unwrap();
        let numbers: Vec<i32> = versions.iter().map(|v| v.version_number).collect();
        assert_eq!(numbers, vec![2, 1]);
    }

    #[tokio::test]
    async fn test_get_version_by_id() {
        let h = harness();
        let entry = upload(&h, OwnerId::new(), "a.txt", "x").await;
        let version = h.files.list_versions(entry.id).await.unwrap().remove(0);

        let fetched = h.files.get_version(version.id).await.unwrap();
        assert_eq!(fetched.id, version.id);
        assert_eq!(fetched.storage_key, version.storage_key);

        let err = h.files.get_version(FileVersionId::new()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
