//! Convenience result type alias for BeautyDesk.

use crate::error::AppError;

/// A specialized `Result` type for BeautyDesk operations.
pub type AppResult<T> = Result<T, AppError>;
