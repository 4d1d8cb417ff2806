//! Error types for pagemend
//!
//! Provides standardized error handling across the crate. Module execution
//! failures are deliberately *not* part of [`PagemendError`]: the dispatcher
//! contains them per module (see [`crate::dispatch`]) and they never
//! propagate to callers.

use thiserror::Error;

/// Errors that can occur in pagemend
#[derive(Debug, Error)]
pub enum PagemendError {
    /// Settings-related errors
    #[error("Settings error: {0}")]
    Settings(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing errors
    #[error("Settings parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

/// Result type alias for pagemend operations
pub type PagemendResult<T> = Result<T, PagemendError>;
