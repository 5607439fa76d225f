//! File entry repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use verso_core::error::{AppError, ErrorKind};
use verso_core::result::AppResult;
use verso_core::types::{FileId, OwnerId};
use verso_entity::file::model::FileEntry;
use verso_entity::file::repository::FileEntryRepository;

/// Name of the partial unique index guarding one live entry per
/// `(owner_id, name)`. Violations are surfaced as `Conflict` so the upload
/// coordinator can retry against the winning entry.
const OWNER_NAME_INDEX: &str = "file_entries_owner_live_name_idx";

/// PostgreSQL-backed [`FileEntryRepository`].
#[derive(Debug, Clone)]
pub struct PgFileEntryRepository {
    pool: PgPool,
}

impl PgFileEntryRepository {
    /// Create a new file entry repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FileEntryRepository for PgFileEntryRepository {
    async fn save(&self, entry: &FileEntry) -> AppResult<FileEntry> {
        sqlx::query_as::<_, FileEntry>(
            "INSERT INTO file_entries \
             (id, owner_id, name, content_type, size, current_version, deleted, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             ON CONFLICT (id) DO UPDATE SET \
             name = EXCLUDED.name, content_type = EXCLUDED.content_type, \
             size = EXCLUDED.size, current_version = EXCLUDED.current_version, \
             deleted = EXCLUDED.deleted, updated_at = EXCLUDED.updated_at \
             RETURNING *",
        )
        .bind(entry.id)
        .bind(entry.owner_id)
        .bind(&entry.name)
        .bind(&entry.content_type)
        .bind(entry.size)
        .bind(entry.current_version)
        .bind(entry.deleted)
        .bind(entry.created_at)
        .bind(entry.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.constraint() == Some(OWNER_NAME_INDEX) => {
                AppError::conflict(format!(
                    "File '{}' already exists for this owner",
                    entry.name
                ))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to save file entry", e),
        })
    }

    async fn find_by_id(&self, id: FileId) -> AppResult<Option<FileEntry>> {
        sqlx::query_as::<_, FileEntry>("SELECT * FROM file_entries WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find file entry", e)
            })
    }

    async fn find_by_owner_and_name(
        &self,
        owner_id: OwnerId,
        name: &str,
    ) -> AppResult<Option<FileEntry>> {
        sqlx::query_as::<_, FileEntry>(
            "SELECT * FROM file_entries WHERE owner_id = $1 AND name = $2 AND NOT deleted",
        )
        .bind(owner_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find file entry by name", e)
        })
    }

    async fn find_by_owner(&self, owner_id: OwnerId) -> AppResult<Vec<FileEntry>> {
        sqlx::query_as::<_, FileEntry>(
            "SELECT * FROM file_entries WHERE owner_id = $1 AND NOT deleted ORDER BY name ASC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list file entries", e))
    }
}
