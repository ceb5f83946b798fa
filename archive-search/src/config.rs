//! Backend configuration with sensible defaults.
//!
//! [`SearchConfig`] controls where the advanced search endpoint lives, page
//! size, timeouts, caching, and suggestion lookup behaviour.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::SearchError;

/// Configuration for the archive.org search backend.
///
/// Use [`Default::default()`] for sensible defaults, or construct with
/// field overrides for custom behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Backend base URL, including the trailing slash.
    pub base_url: String,
    /// Endpoint path appended to `base_url`.
    pub endpoint: String,
    /// Number of documents requested per page.
    pub rows: usize,
    /// HTTP request timeout in seconds.
    pub timeout_seconds: u64,
    /// How long to cache backend responses in seconds. Set to 0 to disable caching.
    pub cache_ttl_seconds: u64,
    /// Custom User-Agent string. If `None`, the crate's own identifier is sent.
    pub user_agent: Option<String>,
    /// Maximum number of suggestions returned for one input.
    pub suggestion_count: usize,
    /// Inputs shorter than this (in characters) get no suggestions.
    pub min_suggestion_chars: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://archive.org/".into(),
            endpoint: "advancedsearch.php".into(),
            rows: 20,
            timeout_seconds: 8,
            cache_ttl_seconds: 300,
            user_agent: None,
            suggestion_count: 5,
            min_suggestion_chars: 2,
        }
    }
}

impl SearchConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `rows` must be greater than 0
    /// - `timeout_seconds` must be greater than 0
    /// - `suggestion_count` must be greater than 0
    /// - `base_url` joined with `endpoint` must be a valid URL
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.rows == 0 {
            return Err(SearchError::Config("rows must be greater than 0".into()));
        }
        if self.timeout_seconds == 0 {
            return Err(SearchError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.suggestion_count == 0 {
            return Err(SearchError::Config(
                "suggestion_count must be greater than 0".into(),
            ));
        }
        self.endpoint_url().map(|_| ())
    }

    /// The full endpoint URL (`base_url` + `endpoint`).
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if the base URL is empty or not a valid URL.
    pub fn endpoint_url(&self) -> Result<Url, SearchError> {
        if self.base_url.trim().is_empty() {
            return Err(SearchError::Config("base_url must not be empty".into()));
        }
        let base = Url::parse(&self.base_url)
            .map_err(|e| SearchError::Config(format!("invalid base_url: {e}")))?;
        base.join(&self.endpoint)
            .map_err(|e| SearchError::Config(format!("invalid endpoint: {e}")))
    }
}
