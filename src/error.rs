//! Error types for the search page.

use archive_search::SearchError;

/// Top-level error type for the search page.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Malformed route or query string.
    #[error("route error: {0}")]
    Route(String),

    /// Search orchestration error.
    #[error(transparent)]
    Search(#[from] SearchError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, AppError>;
