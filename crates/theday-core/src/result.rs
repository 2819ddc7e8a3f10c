//! Convenience result type alias for TheDay.

use crate::error::AppError;

/// A specialized `Result` type for TheDay operations.
pub type AppResult<T> = Result<T, AppError>;
