//! Search orchestration: the contract a search page talks to, and the
//! backend-driven implementation of it.
//!
//! The page never queries the backend itself. It mutates the
//! [`SessionStore`] selection and asks a [`SearchOrchestration`] to search;
//! results, facets and metadata come back through the store's observables.

pub mod service;

pub use service::SearchService;

use crate::error::SearchError;
use crate::result_types::{FilterTab, SortingOption};
use crate::store::SessionStore;

/// Operations a search page delegates to.
pub trait SearchOrchestration: Send + Sync {
    /// Run a first-page search for `keyword` with the store's selected facets
    /// and publish the outcome to the store.
    fn search(
        &self,
        keyword: &str,
    ) -> impl std::future::Future<Output = Result<(), SearchError>> + Send;

    /// Fetch the next page for `keyword` and append it to the published results.
    fn load_more(
        &self,
        keyword: &str,
    ) -> impl std::future::Future<Output = Result<(), SearchError>> + Send;

    /// Switch the active filter category and reset paging.
    fn adjust_params_to_changed_filter(&self, category: &str);

    /// Sorting options offered for `category`.
    fn sorting_options(&self, category: &str) -> Vec<SortingOption>;

    /// Filter tabs for the result view.
    fn filters_for_view(&self) -> Vec<FilterTab>;

    /// Keyword suggestions for a partially typed input.
    fn suggestions(
        &self,
        input: &str,
    ) -> impl std::future::Future<Output = Result<Vec<String>, SearchError>> + Send;

    /// Public detail page of the item with `id`.
    fn details_link(&self, id: &str) -> String;

    /// The session store this orchestrator publishes to.
    fn store(&self) -> &SessionStore;
}
