//! archive.org advanced search backend.
//!
//! Talks to `advancedsearch.php` with `output=json`, which answers with a
//! Solr-style envelope: `responseHeader`, `response.docs`, and optionally
//! `facet_counts`, `highlighting` and `spellcheck`.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::config::SearchConfig;
use crate::engine::{BackendResponse, FacetCount, SearchBackend};
use crate::error::SearchError;
use crate::http;
use crate::query::SearchRequest;
use crate::types::{Highlighting, RawDocument};

/// HTTP client for archive.org's advanced search endpoint.
pub struct ArchiveOrgBackend {
    client: reqwest::Client,
    endpoint: Url,
}

impl ArchiveOrgBackend {
    /// Create a backend for the endpoint named in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] for an invalid endpoint URL, or
    /// [`SearchError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        let endpoint = config.endpoint_url()?;
        let client = http::build_client(config)?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl SearchBackend for ArchiveOrgBackend {
    async fn query(&self, request: &SearchRequest) -> Result<BackendResponse, SearchError> {
        tracing::trace!(query = %request.query, page = request.page, "archive.org search");

        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&request.to_params())
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| SearchError::from_reqwest("archive.org request failed", e))?
            .error_for_status()
            .map_err(|e| SearchError::Http(format!("archive.org HTTP error: {e}")))?;

        let body = response
            .text()
            .await
            .map_err(|e| SearchError::from_reqwest("archive.org response read failed", e))?;

        tracing::trace!(bytes = body.len(), "archive.org response received");

        parse_advanced_search_json(&body)
    }

    fn name(&self) -> &'static str {
        "archive.org"
    }
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "responseHeader", default)]
    header: ResponseHeader,
    response: ResponseBody,
    #[serde(default)]
    facet_counts: Option<FacetCounts>,
    #[serde(default)]
    highlighting: Option<Highlighting>,
    #[serde(default)]
    spellcheck: Option<Spellcheck>,
}

#[derive(Default, Deserialize)]
struct ResponseHeader {
    #[serde(rename = "QTime", default)]
    qtime: u64,
}

#[derive(Deserialize)]
struct ResponseBody {
    #[serde(rename = "numFound", default)]
    num_found: u64,
    #[serde(default)]
    docs: Vec<RawDocument>,
}

#[derive(Deserialize)]
struct FacetCounts {
    #[serde(default)]
    facet_fields: HashMap<String, Vec<Value>>,
}

#[derive(Deserialize)]
struct Spellcheck {
    #[serde(default)]
    collations: Vec<Value>,
}

/// Parse an advanced search JSON body.
///
/// Extracted as a separate function for testability with canned responses.
pub(crate) fn parse_advanced_search_json(body: &str) -> Result<BackendResponse, SearchError> {
    let envelope: Envelope = serde_json::from_str(body)
        .map_err(|e| SearchError::Parse(format!("invalid advanced search response: {e}")))?;

    let facet_counts = envelope
        .facet_counts
        .map(|fc| {
            fc.facet_fields
                .into_iter()
                .map(|(field, flat)| (field, pair_facet_counts(&flat)))
                .collect()
        })
        .unwrap_or_default();

    let alternative_keywords = envelope
        .spellcheck
        .map(|sc| collation_keywords(&sc.collations))
        .unwrap_or_default();

    Ok(BackendResponse {
        docs: envelope.response.docs,
        num_found: envelope.response.num_found,
        time_taken_ms: envelope.header.qtime,
        facet_counts,
        highlighting: envelope.highlighting.unwrap_or_default(),
        alternative_keywords,
    })
}

/// Solr sends facet counts as a flat `[value, count, value, count, ...]` list.
fn pair_facet_counts(flat: &[Value]) -> Vec<FacetCount> {
    flat.chunks_exact(2)
        .filter_map(|pair| {
            let value = match &pair[0] {
                Value::String(s) if !s.is_empty() => s.clone(),
                Value::Number(n) => n.to_string(),
                _ => return None,
            };
            let count = pair[1].as_u64()?;
            Some(FacetCount { value, count })
        })
        .collect()
}

/// Collations are either `["collation", "text", ...]` or
/// `[{"collationQuery": "text", ...}, ...]` depending on the response writer.
fn collation_keywords(collations: &[Value]) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    for item in collations {
        let candidate = match item {
            Value::String(s) if s != "collation" => Some(s.clone()),
            Value::Object(map) => map
                .get("collationQuery")
                .and_then(Value::as_str)
                .map(str::to_string),
            _ => None,
        };
        if let Some(keyword) = candidate {
            if !keyword.is_empty() && !keywords.contains(&keyword) {
                keywords.push(keyword);
            }
        }
    }
    keywords
}
