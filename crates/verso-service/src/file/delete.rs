//! File deletion service — soft delete only.

use std::sync::Arc;

use tracing::info;

use verso_core::error::AppError;
use verso_core::events::{DomainEvent, FileEvent};
use verso_core::result::AppResult;
use verso_core::traits::EventSink;
use verso_core::types::FileId;
use verso_entity::file::FileEntryRepository;

/// Reason recorded on the deletion event.
const DELETE_REASON: &str = "deleted-by-user";

/// Soft-deletes files. Version rows and blobs are never touched; history
/// stays readable through presigned version URLs after deletion.
#[derive(Debug, Clone)]
pub struct DeletionService {
    entries: Arc<dyn FileEntryRepository>,
    events: Arc<dyn EventSink>,
}

impl DeletionService {
    /// Creates a new deletion service.
    pub fn new(entries: Arc<dyn FileEntryRepository>, events: Arc<dyn EventSink>) -> Self {
        Self { entries, events }
    }

    /// Soft-delete `file_id`.
    pub async fn delete(&self, file_id: FileId) -> AppResult<()> {
        let entry = self
            .entries
            .find_by_id(file_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File not found: {file_id}")))?;

        self.entries.save(&entry.mark_deleted()).await?;

        info!(file_id = %file_id, "Soft-deleted file");

        self.events
            .publish(DomainEvent::new(FileEvent::Deleted {
                file_id,
                reason: DELETE_REASON.to_string(),
            }))
            .await;
        Ok(())
    }
}
