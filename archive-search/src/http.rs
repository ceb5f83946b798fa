//! Shared HTTP client for backend requests.

use crate::config::SearchConfig;
use crate::error::SearchError;
use std::time::Duration;

/// User-Agent sent when the configuration does not override it.
pub const DEFAULT_USER_AGENT: &str = concat!("archive-search/", env!("CARGO_PKG_VERSION"));

/// Build a [`reqwest::Client`] for the advanced search endpoint.
///
/// The client has:
/// - Timeout from config
/// - The configured User-Agent, or [`DEFAULT_USER_AGENT`]
/// - Brotli and gzip decompression
///
/// # Errors
///
/// Returns [`SearchError::Http`] if the client cannot be constructed.
pub fn build_client(config: &SearchConfig) -> Result<reqwest::Client, SearchError> {
    let ua = config
        .user_agent
        .clone()
        .unwrap_or_else(|| DEFAULT_USER_AGENT.to_owned());

    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(ua)
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .map_err(|e| SearchError::Http(format!("failed to build HTTP client: {e}")))
}
