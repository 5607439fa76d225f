//! In-memory implementations of the capability traits for tests.
//!
//! The fakes enforce the same uniqueness rules as the real backends (one
//! live entry per `(owner, name)`, one row per `(file_id, version_number)`)
//! and surface violations as `Conflict`, so coordinator retry behavior
//! can be exercised without a database. One-shot failure injection hooks
//! simulate backend outages at specific steps.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;

use verso_core::error::AppError;
use verso_core::events::DomainEvent;
use verso_core::result::AppResult;
use verso_core::traits::blob_store::{BlobStore, ByteStream};
use verso_core::traits::EventSink;
use verso_core::types::{FileId, FileVersionId, OwnerId};
use verso_entity::file::{FileEntry, FileEntryRepository, FileVersion, FileVersionRepository};

/// In-memory [`FileEntryRepository`].
#[derive(Debug, Default)]
pub struct InMemoryFileEntryRepository {
    rows: Mutex<HashMap<FileId, FileEntry>>,
    fail_next_save: Mutex<Option<AppError>>,
}

impl InMemoryFileEntryRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored row, deleted entries included.
    pub fn all(&self) -> Vec<FileEntry> {
        self.rows.lock().unwrap().values().cloned().collect()
    }

    /// Make the next `save` call fail with the given error.
    pub fn fail_next_save(&self, error: AppError) {
        *self.fail_next_save.lock().unwrap() = Some(error);
    }
}

#[async_trait]
impl FileEntryRepository for InMemoryFileEntryRepository {
    async fn save(&self, entry: &FileEntry) -> AppResult<FileEntry> {
        if let Some(error) = self.fail_next_save.lock().unwrap().take() {
            return Err(error);
        }

        let mut rows = self.rows.lock().unwrap();
        if !entry.deleted {
            let duplicate = rows.values().any(|other| {
                other.id != entry.id
                    && !other.deleted
                    && other.owner_id == entry.owner_id
                    && other.name == entry.name
            });
            if duplicate {
                return Err(AppError::conflict(format!(
                    "File '{}' already exists for this owner",
                    entry.name
                )));
            }
        }
        rows.insert(entry.id, entry.clone());
        Ok(entry.clone())
    }

    async fn find_by_id(&self, id: FileId) -> AppResult<Option<FileEntry>> {
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_owner_and_name(
        &self,
        owner_id: OwnerId,
        name: &str,
    ) -> AppResult<Option<FileEntry>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .find(|e| e.owner_id == owner_id && e.name == name && !e.deleted)
            .cloned())
    }

    async fn find_by_owner(&self, owner_id: OwnerId) -> AppResult<Vec<FileEntry>> {
        let mut entries: Vec<FileEntry> = self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|e| e.owner_id == owner_id && !e.deleted)
            .cloned()
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}

/// In-memory [`FileVersionRepository`].
#[derive(Debug, Default)]
pub struct InMemoryFileVersionRepository {
    rows: Mutex<Vec<FileVersion>>,
    fail_next_save: Mutex<Option<AppError>>,
    conflict_next_save: Mutex<bool>,
    fail_next_max_query: Mutex<Option<AppError>>,
}

impl InMemoryFileVersionRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `save` call fail with the given error.
    pub fn fail_next_save(&self, error: AppError) {
        *self.fail_next_save.lock().unwrap() = Some(error);
    }

    /// Make the next `save` call fail as if a concurrent upload had
    /// claimed the version number.
    pub fn conflict_next_save(&self) {
        *self.conflict_next_save.lock().unwrap() = true;
    }

    /// Make the next `find_max_version_number` call fail.
    pub fn fail_next_max_query(&self, error: AppError) {
        *self.fail_next_max_query.lock().unwrap() = Some(error);
    }
}

#[async_trait]
impl FileVersionRepository for InMemoryFileVersionRepository {
    async fn save(&self, version: &FileVersion) -> AppResult<FileVersion> {
        if let Some(error) = self.fail_next_save.lock().unwrap().take() {
            return Err(error);
        }
        if std::mem::take(&mut *self.conflict_next_save.lock().unwrap()) {
            return Err(AppError::conflict(format!(
                "Version {} of file {} was claimed by a concurrent upload",
                version.version_number, version.file_id
            )));
        }

        let mut rows = self.rows.lock().unwrap();
        let duplicate = rows
            .iter()
            .any(|v| v.file_id == version.file_id && v.version_number == version.version_number);
        if duplicate {
            return Err(AppError::conflict(format!(
                "Version {} of file {} was claimed by a concurrent upload",
                version.version_number, version.file_id
            )));
        }
        rows.push(version.clone());
        Ok(version.clone())
    }

    async fn find_by_id(&self, id: FileVersionId) -> AppResult<Option<FileVersion>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|v| v.id == id)
            .cloned())
    }

    async fn find_by_file_id(&self, file_id: FileId) -> AppResult<Vec<FileVersion>> {
        let mut versions: Vec<FileVersion> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|v| v.file_id == file_id)
            .cloned()
            .collect();
        versions.sort_by(|a, b| b.version_number.cmp(&a.version_number));
        Ok(versions)
    }

    async fn find_max_version_number(&self, file_id: FileId) -> AppResult<Option<i32>> {
        if let Some(error) = self.fail_next_max_query.lock().unwrap().take() {
            return Err(error);
        }
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|v| v.file_id == file_id)
            .map(|v| v.version_number)
            .max())
    }
}

/// In-memory [`BlobStore`].
#[derive(Debug, Default)]
pub struct InMemoryBlobStore {
    blobs: Mutex<HashMap<String, Bytes>>,
    fail_next_put: Mutex<bool>,
}

impl InMemoryBlobStore {
    /// Create an empty blob store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `put` call fail with a storage error.
    pub fn fail_next_put(&self) {
        *self.fail_next_put.lock().unwrap() = true;
    }

    /// Every stored key.
    pub fn keys(&self) -> Vec<String> {
        self.blobs.lock().unwrap().keys().cloned().collect()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn put(&self, key: &str, data: Bytes, _content_type: &str) -> AppResult<()> {
        if std::mem::take(&mut *self.fail_next_put.lock().unwrap()) {
            return Err(AppError::storage(format!("Injected put failure: {key}")));
        }
        self.blobs.lock().unwrap().insert(key.to_string(), data);
        Ok(())
    }

    async fn get(&self, key: &str) -> AppResult<ByteStream> {
        let data = self
            .blobs
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Blob not found: {key}")))?;
        Ok(Box::pin(futures::stream::iter([Ok(data)])))
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.blobs
            .lock()
            .unwrap()
            .remove(key)
            .ok_or_else(|| AppError::not_found(format!("Blob not found: {key}")))?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.blobs.lock().unwrap().contains_key(key))
    }

    async fn presign(&self, key: &str, ttl_seconds: u64) -> AppResult<String> {
        Ok(format!("memory://{key}?ttl={ttl_seconds}"))
    }
}

/// Event sink that records everything it is asked to publish.
#[derive(Debug, Default)]
pub struct CapturingEventSink {
    published: Mutex<Vec<DomainEvent>>,
}

impl CapturingEventSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every event published so far, in publication order.
    pub fn published(&self) -> Vec<DomainEvent> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventSink for CapturingEventSink {
    fn sink_type(&self) -> &str {
        "capturing"
    }

    async fn publish(&self, event: DomainEvent) {
        self.published.lock().unwrap().push(event);
    }
}
