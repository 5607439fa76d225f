//! File version repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use verso_core::error::{AppError, ErrorKind};
use verso_core::result::AppResult;
use verso_core::types::{FileId, FileVersionId};
use verso_entity::file::repository::FileVersionRepository;
use verso_entity::file::version::FileVersion;

/// Unique constraint serializing version-number allocation per file.
const FILE_VERSION_NUMBER_KEY: &str = "file_versions_file_id_version_number_key";

/// PostgreSQL-backed [`FileVersionRepository`].
#[derive(Debug, Clone)]
pub struct PgFileVersionRepository {
    pool: PgPool,
}

impl PgFileVersionRepository {
    /// Create a new file version repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FileVersionRepository for PgFileVersionRepository {
    async fn save(&self, version: &FileVersion) -> AppResult<FileVersion> {
        sqlx::query_as::<_, FileVersion>(
            "INSERT INTO file_versions \
             (id, file_id, version_number, name, content_type, size, storage_key, created_at, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *",
        )
        .bind(version.id)
        .bind(version.file_id)
        .bind(version.version_number)
        .bind(&version.name)
        .bind(&version.content_type)
        .bind(version.size)
        .bind(&version.storage_key)
        .bind(version.created_at)
        .bind(version.created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some(FILE_VERSION_NUMBER_KEY) =>
            {
                AppError::conflict(format!(
                    "Version {} of file {} was claimed by a concurrent upload",
                    version.version_number, version.file_id
                ))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to save file version", e),
        })
    }

    async fn find_by_id(&self, id: FileVersionId) -> AppResult<Option<FileVersion>> {
        sqlx::query_as::<_, FileVersion>("SELECT * FROM file_versions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find file version", e)
            })
    }

    async fn find_by_file_id(&self, file_id: FileId) -> AppResult<Vec<FileVersion>> {
        sqlx::query_as::<_, FileVersion>(
            "SELECT * FROM file_versions WHERE file_id = $1 ORDER BY version_number DESC",
        )
        .bind(file_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list file versions", e))
    }

    async fn find_max_version_number(&self, file_id: FileId) -> AppResult<Option<i32>> {
        sqlx::query_scalar::<_, Option<i32>>(
            "SELECT MAX(version_number) FROM file_versions WHERE file_id = $1",
        )
        .bind(file_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find max version number", e)
        })
    }
}
