//! Per-session search state shared between the orchestrator and the page.

use crate::observable::Observable;
use crate::types::{Facet, ResultEntry, SearchResultMeta, SelectedFacet};

/// Selected facets plus the observable outputs of the last search.
#[derive(Default)]
pub struct SessionStore {
    selected_facets: Observable<Vec<SelectedFacet>>,
    facets: Observable<Vec<Facet>>,
    results: Observable<Vec<ResultEntry>>,
    result_meta: Observable<SearchResultMeta>,
    alternative_keywords: Observable<Vec<String>>,
    alternative_results: Observable<Vec<ResultEntry>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_facets(&self) -> Vec<SelectedFacet> {
        self.selected_facets.get()
    }

    /// Replace the selection. Duplicate pairs are dropped, first occurrence wins.
    pub fn set_selected_facets(&self, facets: Vec<SelectedFacet>) {
        let mut unique: Vec<SelectedFacet> = Vec::with_capacity(facets.len());
        for facet in facets {
            if !unique.contains(&facet) {
                unique.push(facet);
            }
        }
        self.selected_facets.emit(unique);
    }

    /// Add `facet` if absent, remove it if present.
    ///
    /// Returns whether the facet is selected afterwards.
    pub fn toggle_selected_facet(&self, facet: &SelectedFacet) -> bool {
        let mut current = self.selected_facets.get();
        let selected = match current.iter().position(|f| f == facet) {
            Some(index) => {
                current.remove(index);
                false
            }
            None => {
                current.push(facet.clone());
                true
            }
        };
        self.selected_facets.emit(current);
        selected
    }

    pub fn clear_selected_facets(&self) {
        self.selected_facets.emit(Vec::new());
    }

    pub fn selected_facets_stream(&self) -> &Observable<Vec<SelectedFacet>> {
        &self.selected_facets
    }

    pub fn facets(&self) -> &Observable<Vec<Facet>> {
        &self.facets
    }

    pub fn results(&self) -> &Observable<Vec<ResultEntry>> {
        &self.results
    }

    pub fn result_meta(&self) -> &Observable<SearchResultMeta> {
        &self.result_meta
    }

    pub fn alternative_keywords(&self) -> &Observable<Vec<String>> {
        &self.alternative_keywords
    }

    pub fn alternative_results(&self) -> &Observable<Vec<ResultEntry>> {
        &self.alternative_results
    }
}
