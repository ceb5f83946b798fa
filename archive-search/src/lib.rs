//! # archive-search
//!
//! Search orchestration for archive.org's advanced search API.
//!
//! This crate owns everything between a search page and the backend: query
//! construction from a keyword and selected facets, the HTTP client for
//! `advancedsearch.php`, the mapping of archive.org documents to generic
//! result entries, and a session store whose observables the page renders.
//!
//! ## Design
//!
//! - [`SearchService`] is composed from a [`SearchBackend`], a
//!   [`DocumentMapper`] and a [`ResultTypesConfig`]; nothing is inherited
//! - Results, facets, metadata and did-you-mean data are published through
//!   [`Observable`] streams on the [`SessionStore`]
//! - Backend responses are cached per request with a configurable TTL
//! - Missing or oddly shaped document fields degrade to empty values
//!
//! ## Logging
//!
//! Search keywords are logged only at trace level.

pub mod cache;
pub mod config;
pub mod engine;
pub mod engines;
pub mod error;
pub mod http;
pub mod mapper;
pub mod observable;
pub mod orchestrator;
pub mod query;
pub mod result_types;
pub mod store;
pub mod types;

pub use config::SearchConfig;
pub use engine::{BackendResponse, SearchBackend};
pub use engines::ArchiveOrgBackend;
pub use error::{Result, SearchError};
pub use mapper::{details_link, map_archive_documents, DocumentMapper};
pub use observable::{Observable, Subscription};
pub use orchestrator::{SearchOrchestration, SearchService};
pub use result_types::{FilterTab, ResultTypesConfig, SortingOption, DEFAULT_CATEGORY};
pub use store::SessionStore;
pub use types::{Facet, ResultEntry, SearchResultMeta, SelectedFacet, SubAttribute};

/// Run one archive.org search for `keyword` with default configuration and
/// return the mapped entries.
///
/// Convenience wrapper for one-off lookups; pages should hold a
/// [`SearchService`] and render its store instead.
///
/// # Errors
///
/// Returns [`SearchError`] if the request fails or the response cannot be parsed.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> archive_search::Result<()> {
/// let entries = archive_search::search_default("jazz").await?;
/// for entry in &entries {
///     println!("{}: {}", entry.title, archive_search::details_link(&entry.id));
/// }
/// # Ok(())
/// # }
/// ```
pub async fn search_default(keyword: &str) -> Result<Vec<ResultEntry>> {
    let service = SearchService::archive_org(SearchConfig::default())?;
    service.search(keyword).await?;
    Ok(service.store().results().get())
}
