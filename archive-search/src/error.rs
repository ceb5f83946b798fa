//! Error types for the archive-search crate.
//!
//! Messages are stable strings suitable for display. Search keywords never
//! appear in error messages.

/// Errors that can occur while talking to the search backend.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The HTTP request failed or the backend answered with a non-2xx status.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The backend did not answer within the configured timeout.
    #[error("search timed out: {0}")]
    Timeout(String),

    /// The backend response could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid search configuration.
    #[error("config error: {0}")]
    Config(String),
}

impl SearchError {
    /// Classify a [`reqwest::Error`], keeping timeouts distinct from other failures.
    pub(crate) fn from_reqwest(context: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(format!("{context}: {err}"))
        } else {
            Self::Http(format!("{context}: {err}"))
        }
    }
}

/// Convenience type alias for archive-search results.
pub type Result<T> = std::result::Result<T, SearchError>;
