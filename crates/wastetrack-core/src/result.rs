//! Convenience result type alias for WasteTrack.

use crate::error::AppError;

/// A specialized `Result` type for WasteTrack operations.
pub type AppResult<T> = Result<T, AppError>;
