//! File upload service — creates a new file or commits a new version of an
//! existing one.
//!
//! Write order within one upload: blob first, then metadata, then events.
//! A blob whose metadata never committed is deleted best-effort and is
//! never surfaced as a readable version. Conflicting writes from
//! concurrent uploads surface as `Conflict` at the repository boundary
//! and are resolved by re-running the lookup/allocate/write sequence.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{info, warn};

use verso_core::error::AppError;
use verso_core::events::{DomainEvent, FileEvent};
use verso_core::result::AppResult;
use verso_core::traits::{BlobStore, EventSink};
use verso_core::types::OwnerId;
use verso_entity::file::{FileEntry, FileEntryRepository, FileVersion, FileVersionRepository};

use crate::file::allocator::VersionAllocator;

/// Attempts before a persistent write conflict is surfaced to the caller.
const UPLOAD_MAX_ATTEMPTS: u32 = 3;

/// Parameters for a single-request upload.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// The owning tenant/user.
    pub owner_id: OwnerId,
    /// Logical filename.
    pub name: String,
    /// MIME type.
    pub content_type: String,
    /// Declared content size in bytes; must match `data.len()`.
    pub size: i64,
    /// File content.
    pub data: Bytes,
}

/// Coordinates a single upload into either a new file or a new version of
/// an existing file.
#[derive(Clone)]
pub struct UploadService {
    entries: Arc<dyn FileEntryRepository>,
    versions: Arc<dyn FileVersionRepository>,
    blobs: Arc<dyn BlobStore>,
    events: Arc<dyn EventSink>,
    allocator: VersionAllocator,
    max_upload_size_bytes: u64,
}

impl std::fmt::Debug for UploadService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadService").finish()
    }
}

impl UploadService {
    /// Creates a new upload service.
    pub fn new(
        entries: Arc<dyn FileEntryRepository>,
        versions: Arc<dyn FileVersionRepository>,
        blobs: Arc<dyn BlobStore>,
        events: Arc<dyn EventSink>,
        max_upload_size_bytes: u64,
    ) -> Self {
        let allocator = VersionAllocator::new(versions.clone());
        Self {
            entries,
            versions,
            blobs,
            events,
            allocator,
            max_upload_size_bytes,
        }
    }

    /// Uploads content as a new file, or as the next version when a
    /// non-deleted file with the same `(owner, name)` already exists.
    pub async fn upload(&self, request: UploadRequest) -> AppResult<FileEntry> {
        self.validate(&request)?;

        let mut last_conflict = None;
        for _attempt in 0..UPLOAD_MAX_ATTEMPTS {
            let existing = self
                .entries
                .find_by_owner_and_name(request.owner_id, &request.name)
                .await?;

            let outcome = match existing {
                Some(entry) => self.upload_new_version(&request, entry).await,
                None => self.upload_new_file(&request).await,
            };

            match outcome {
                Ok(entry) => return Ok(entry),
                Err(e) if e.is_conflict() => {
                    warn!(
                        owner_id = %request.owner_id,
                        name = %request.name,
                        "Upload lost a write race, retrying"
                    );
                    last_conflict = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_conflict
            .unwrap_or_else(|| AppError::conflict("Upload retries exhausted")))
    }

    fn validate(&self, request: &UploadRequest) -> AppResult<()> {
        if request.name.trim().is_empty() {
            return Err(AppError::validation("File name must not be blank"));
        }
        if request.size < 0 {
            return Err(AppError::validation("File size must not be negative"));
        }
        if request.size != request.data.len() as i64 {
            return Err(AppError::validation(format!(
                "Declared size {} does not match content length {}",
                request.size,
                request.data.len()
            )));
        }
        if request.data.len() as u64 > self.max_upload_size_bytes {
            return Err(AppError::validation(format!(
                "File exceeds maximum upload size of {} bytes",
                self.max_upload_size_bytes
            )));
        }
        Ok(())
    }

    /// First upload for this `(owner, name)`: create the entry and commit
    /// version 1.
    async fn upload_new_file(&self, request: &UploadRequest) -> AppResult<FileEntry> {
        let entry = FileEntry::create(
            request.owner_id,
            request.name.clone(),
            request.content_type.clone(),
            request.size,
        );
        let storage_key = FileVersion::storage_key_for(entry.id, 1);

        self.blobs
            .put(&storage_key, request.data.clone(), &request.content_type)
            .await?;

        let saved_entry = match self.entries.save(&entry).await {
            Ok(saved) => saved,
            Err(e) => {
                // Nothing references this blob yet (the key carries our
                // fresh file id), so it is safe to reclaim.
                self.cleanup_orphan_blob(&storage_key).await;
                return Err(e);
            }
        };

        let version = FileVersion::create(
            saved_entry.id,
            1,
            request.name.clone(),
            request.content_type.clone(),
            request.size,
            request.owner_id,
        );
        let saved_version = match self.versions.save(&version).await {
            Ok(saved) => saved,
            Err(e) => {
                // The entry committed but its version did not; the next
                // upload for this name will allocate version 1 again and
                // repair the entry.
                self.cleanup_orphan_blob(&storage_key).await;
                return Err(e);
            }
        };

        info!(
            owner_id = %request.owner_id,
            file_id = %saved_entry.id,
            name = %saved_entry.name,
            size = saved_entry.size,
            "Created file at version 1"
        );

        self.emit_uploaded(&saved_entry, &saved_version).await;
        Ok(saved_entry)
    }

    /// Subsequent upload for an existing entry: commit the next version
    /// and repoint the entry at it.
    async fn upload_new_version(
        &self,
        request: &UploadRequest,
        entry: FileEntry,
    ) -> AppResult<FileEntry> {
        let next_version = self.allocator.next(entry.id).await?;
        let storage_key = FileVersion::storage_key_for(entry.id, next_version);

        self.blobs
            .put(&storage_key, request.data.clone(), &request.content_type)
            .await?;

        let version = FileVersion::create(
            entry.id,
            next_version,
            request.name.clone(),
            request.content_type.clone(),
            request.size,
            request.owner_id,
        );
        let saved_version = match self.versions.save(&version).await {
            Ok(saved) => saved,
            Err(e) if e.is_conflict() => {
                // A concurrent upload claimed this version number, and
                // with it this storage key. The blob must stay: the
                // winner's committed row references it.
                return Err(e);
            }
            Err(e) => {
                self.cleanup_orphan_blob(&storage_key).await;
                return Err(e);
            }
        };

        let updated = entry.update_to_version(
            request.name.clone(),
            request.content_type.clone(),
            request.size,
            next_version,
        );
        // The version row committed; its blob is referenced history now
        // even if this pointer update fails.
        let saved_entry = self.entries.save(&updated).await?;

        info!(
            owner_id = %request.owner_id,
            file_id = %saved_entry.id,
            name = %saved_entry.name,
            version = next_version,
            size = saved_entry.size,
            "Committed new file version"
        );

        self.emit_uploaded(&saved_entry, &saved_version).await;
        Ok(saved_entry)
    }

    /// Best-effort removal of a blob whose metadata never committed. A
    /// failure here leaves the orphan for the out-of-band sweep; nothing
    /// references it, so it can never be read back.
    async fn cleanup_orphan_blob(&self, storage_key: &str) {
        if let Err(e) = self.blobs.delete(storage_key).await {
            warn!(
                storage_key,
                error = %e,
                "Failed to clean up orphaned blob after aborted upload"
            );
        }
    }

    async fn emit_uploaded(&self, entry: &FileEntry, version: &FileVersion) {
        self.events
            .publish(DomainEvent::new(FileEvent::VersionUploaded {
                file_id: version.file_id,
                version_id: version.id,
                version_number: version.version_number,
                created_by: version.created_by,
                name: version.name.clone(),
                content_type: version.content_type.clone(),
                size: version.size,
            }))
            .await;
        self.events
            .publish(DomainEvent::new(FileEvent::Uploaded {
                file_id: entry.id,
                owner_id: entry.owner_id,
                version_id: version.id,
                size: entry.size,
                content_type: entry.content_type.clone(),
            }))
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        CapturingEventSink, InMemoryBlobStore, InMemoryFileEntryRepository,
        InMemoryFileVersionRepository,
    };
    use verso_core::error::ErrorKind;

    const MAX_UPLOAD: u64 = 1024 * 1024;

    struct Harness {
        entries: Arc<InMemoryFileEntryRepository>,
        versions: Arc<InMemoryFileVersionRepository>,
        blobs: Arc<InMemoryBlobStore>,
        events: Arc<CapturingEventSink>,
        service: UploadService,
    }

    fn harness() -> Harness {
        let entries = Arc::new(InMemoryFileEntryRepository::new());
        let versions = Arc::new(InMemoryFileVersionRepository::new());
        let blobs = Arc::new(InMemoryBlobStore::new());
        let events = Arc::new(CapturingEventSink::new());
        let service = UploadService::new(
            entries.clone(),
            versions.clone(),
            blobs.clone(),
            events.clone(),
            MAX_UPLOAD,
        );
        Harness {
            entries,
            versions,
            blobs,
            events,
            service,
        }
    }

    fn request(owner_id: OwnerId, name: &str, body: &'static str) -> UploadRequest {
        UploadRequest {
            owner_id,
            name: name.to_string(),
            content_type: "text/plain".to_string(),
            size: body.len() as i64,
            data: Bytes::from_static(body.as_bytes()),
        }
    }

    #[tokio::test]
    async fn test_first_upload_creates_entry_and_version_one() {
        let h = harness();
        let owner = OwnerId::new();

        let entry = h.service.upload(request(owner, "a.txt", "0123456789")).await.unwrap();

        assert_eq!(entry.current_version, 1);
        assert_eq!(entry.size, 10);
        assert!(!entry.deleted);

        let versions = h.versions.find_by_file_id(entry.id).await.unwrap();
        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].version_number, 1);
        assert_eq!(versions[0].storage_key, format!("{}/v1", entry.id));
        assert!(h.blobs.exists(&versions[0].storage_key).await.unwrap());
    }

    #[tokio::test]
    async fn test_second_upload_commits_version_two() {
        let h = harness();
        let owner = OwnerId::new();

        let first = h.service.upload(request(owner, "a.txt", "0123456789")).await.unwrap();
        let second = h
            .service
            .upload(request(owner, "a.txt", "01234567890123456789"))
            .await
            .unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.current_version, 2);
        assert_eq!(second.size, 20);

        let versions = h.versions.find_by_file_id(first.id).await.unwrap();
        let numbers: Vec<i32> = versions.iter().map(|v| v.version_number).collect();
        assert_eq!(numbers, vec![2, 1]);
        assert!(h.blobs.exists(&format!("{}/v1", first.id)).await.unwrap());
        assert!(h.blobs.exists(&format!("{}/v2", first.id)).await.unwrap());
    }

    #[tokio::test]
    async fn test_version_numbers_are_gapless() {
        let h = harness();
        let owner = OwnerId::new();

        let mut entry = None;
        for _ in 0..5 {
            entry = Some(h.service.upload(request(owner, "a.txt", "x")).await.unwrap());
        }
        let entry = entry.unwrap();
        assert_eq!(entry.current_version, 5);

        let mut numbers: Vec<i32> = h
            .versions
            .find_by_file_id(entry.id)
            .await
            .unwrap()
            .iter()
            .map(|v| v.version_number)
            .collect();
        numbers.sort();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_blank_name_is_rejected() {
        let h = harness();
        let err = h
            .service
            .upload(request(OwnerId::new(), "   ", "x"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_size_mismatch_is_rejected() {
        let h = harness();
        let mut req = request(OwnerId::new(), "a.txt", "0123456789");
        req.size = 5;
        let err = h.service.upload(req).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_oversized_upload_is_rejected() {
        let entries = Arc::new(InMemoryFileEntryRepository::new());
        let versions = Arc::new(InMemoryFileVersionRepository::new());
        let blobs = Arc::new(InMemoryBlobStore::new());
        let events = Arc::new(CapturingEventSink::new());
        let service = UploadService::new(entries, versions, blobs.clone(), events, 4);

        let err = service
            .upload(request(OwnerId::new(), "a.txt", "0123456789"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(blobs.keys().is_empty());
    }

    #[tokio::test]
    async fn test_blob_failure_aborts_before_metadata() {
        let h = harness();
        h.blobs.fail_next_put();

        let err = h
            .service
            .upload(request(OwnerId::new(), "a.txt", "x"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Storage);
        assert!(h.entries.all().is_empty());
        assert!(h.events.published().is_empty());
    }

    #[tokio::test]
    async fn test_metadata_failure_after_blob_write_reclaims_orphan() {
        let h = harness();
        let owner = OwnerId::new();
        let entry = h.service.upload(request(owner, "a.txt", "0123456789")).await.unwrap();

        h.versions.fail_next_save(AppError::database("connection reset"));
        let err = h
            .service
            .upload(request(owner, "a.txt", "01234567890123456789"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Database);

        // The orphaned v2 blob was reclaimed; the entry still points at v1.
        assert!(!h.blobs.exists(&format!("{}/v2", entry.id)).await.unwrap());
        let current = h.entries.find_by_id(entry.id).await.unwrap().unwrap();
        assert_eq!(current.current_version, 1);
        assert_eq!(current.size, 10);
    }

    #[tokio::test]
    async fn test_events_emitted_in_order_on_success() {
        let h = harness();
        let entry = h
            .service
            .upload(request(OwnerId::new(), "a.txt", "0123456789"))
            .await
            .unwrap();

        let published = h.events.published();
        assert_eq!(published.len(), 2);
        match &published[0].payload {
            FileEvent::VersionUploaded {
                file_id,
                version_number,
                ..
            } => {
                assert_eq!(*file_id, entry.id);
                assert_eq!(*version_number, 1);
            }
            other => panic!("expected VersionUploaded, got {other:?}"),
        }
        match &published[1].payload {
            FileEvent::Uploaded { file_id, size, .. } => {
                assert_eq!(*file_id, entry.id);
                assert_eq!(*size, 10);
            }
            other => panic!("expected Uploaded, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_version_conflict_retries_with_reallocation() {
        let h = harness();
        let owner = OwnerId::new();
        h.service.upload(request(owner, "a.txt", "x")).await.unwrap();

        // Simulate a competing upload claiming the allocated number
        // between allocation and insert.
        h.versions.conflict_next_save();

        let entry = h.service.upload(request(owner, "a.txt", "xy")).await.unwrap();
        assert_eq!(entry.current_version, 2);

        let mut numbers: Vec<i32> = h
            .versions
            .find_by_file_id(entry.id)
            .await
            .unwrap()
            .iter()
            .map(|v| v.version_number)
            .collect();
        numbers.sort();
        assert_eq!(numbers, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_concurrent_new_file_uploads_converge_on_one_entry() {
        let h = harness();
        let owner = OwnerId::new();

        let (a, b) = tokio::join!(
            h.service.upload(request(owner, "a.txt", "first")),
            h.service.upload(request(owner, "a.txt", "second")),
        );
        let a = a.unwrap();
        let b = b.unwrap();

        // Exactly one logical file, with versions 1 and 2 in some order.
        assert_eq!(a.id, b.id);
        assert_eq!(h.entries.all().len(), 1);

        let mut numbers: Vec<i32> = h
            .versions
            .find_by_file_id(a.id)
            .await
            .unwrap()
            .iter()
            .map(|v| v.version_number)
            .collect();
        numbers.sort();
        assert_eq!(numbers, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_upload_after_soft_delete_creates_fresh_entry() {
        let h = harness();
        let owner = OwnerId::new();

        let first = h.service.upload(request(owner, "a.txt", "x")).await.unwrap();
        let deleted = h
            .entries
            .save(&h.entries.find_by_id(first.id).await.unwrap().unwrap().mark_deleted())
            .await
            .unwrap();
        assert!(deleted.deleted);

        let second = h.service.upload(request(owner, "a.txt", "xy")).await.unwrap();
        assert_ne!(second.id, first.id);
        assert_eq!(second.current_version, 1);
        assert_eq!(h.entries.all().len(), 2);
    }

    #[tokio::test]
    async fn test_allocator_failure_aborts_before_blob_write() {
        let h = harness();
        let owner = OwnerId::new();
        h.service.upload(request(owner, "a.txt", "x")).await.unwrap();

        let blob_count = h.blobs.keys().len();
        h.versions.fail_next_max_query(AppError::database("timeout"));

        let err = h.service.upload(request(owner, "a.txt", "xy")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Database);
        assert_eq!(h.blobs.keys().len(), blob_count);
    }

    #[tokio::test]
    async fn test_storage_keys_disjoint_across_files() {
        let h = harness();
        let owner = OwnerId::new();
        let a = h.service.upload(request(owner, "a.txt", "x")).await.unwrap();
        let b = h.service.upload(request(owner, "b.txt", "x")).await.unwrap();
        assert_ne!(a.id, b.id);
        assert_ne!(
            FileVersion::storage_key_for(a.id, 1),
            FileVersion::storage_key_for(b.id, 1)
        );
    }
}
