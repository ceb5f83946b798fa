//! Trait definition for pluggable search backends.
//!
//! The archive.org client implements [`SearchBackend`]; tests substitute
//! in-memory backends.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::SearchError;
use crate::query::SearchRequest;
use crate::types::{Highlighting, RawDocument};

/// A facet value count as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetCount {
    pub value: String,
    pub count: u64,
}

/// Everything one backend round trip produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackendResponse {
    pub docs: Vec<RawDocument>,
    pub num_found: u64,
    /// Backend query time in milliseconds.
    pub time_taken_ms: u64,
    /// Facet field → value counts, in backend order.
    pub facet_counts: HashMap<String, Vec<FacetCount>>,
    pub highlighting: Highlighting,
    /// Spell-check collations ("did you mean" keywords).
    pub alternative_keywords: Vec<String>,
}

/// A pluggable search backend.
///
/// All implementations must be `Send + Sync` so a service can be shared.
pub trait SearchBackend: Send + Sync {
    /// Execute one request against the backend.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] if the request fails, times out, or the
    /// response cannot be parsed.
    fn query(
        &self,
        request: &SearchRequest,
    ) -> impl std::future::Future<Output = Result<BackendResponse, SearchError>> + Send;

    /// Short backend name used in log fields.
    fn name(&self) -> &'static str;
}
