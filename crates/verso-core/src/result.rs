//! Application result alias.

use crate::error::AppError;

/// Convenience result type used throughout Verso.
pub type AppResult<T> = Result<T, AppError>;
