//! Version number allocation.

use std::sync::Arc;

use verso_core::result::AppResult;
use verso_core::types::FileId;
use verso_entity::file::FileVersionRepository;

/// Computes the next version number for a file.
///
/// Allocation reads the current maximum and adds one; it is not atomic on
/// its own. Two concurrent uploads can allocate the same number. The
/// unique `(file_id, version_number)` constraint at the repository
/// boundary rejects the loser, and the upload coordinator re-allocates.
#[derive(Debug, Clone)]
pub struct VersionAllocator {
    versions: Arc<dyn FileVersionRepository>,
}

impl VersionAllocator {
    /// Creates a new allocator over the given version repository.
    pub fn new(versions: Arc<dyn FileVersionRepository>) -> Self {
        Self { versions }
    }

    /// Next version number to assign for `file_id`: one past the highest
    /// committed version, or 1 when the file has no versions yet.
    ///
    /// A repository failure here aborts the enclosing upload before any
    /// blob is written.
    pub async fn next(&self, file_id: FileId) -> AppResult<i32> {
        let max = self.versions.find_max_version_number(file_id).await?;
        Ok(max.map_or(1, |n| n + 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryFileVersionRepository;
    use verso_core::types::OwnerId;
    use verso_entity::file::FileVersion;

    #[tokio::test]
    async fn test_first_version_is_one() {
        let versions = Arc::new(InMemoryFileVersionRepository::new());
        let allocator = VersionAllocator::new(versions);
        assert_eq!(allocator.next(FileId::new()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_next_is_max_plus_one() {
        let versions = Arc::new(InMemoryFileVersionRepository::new());
        let file_id = FileId::new();
        for number in 1..=3 {
            versions
                .save(&FileVersion::create(
                    file_id,
                    number,
                    "a.txt".into(),
                    "text/plain".into(),
                    10,
                    OwnerId::new(),
                ))
                .await
                .unwrap();
        }

        let allocator = VersionAllocator::new(versions);
        assert_eq!(allocator.next(file_id).await.unwrap(), 4);
    }
}
