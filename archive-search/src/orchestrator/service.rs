//! Backend-driven search orchestrator.
//!
//! [`SearchService`] is composed from a backend, a document mapper and the
//! filter-category configuration. It builds requests from the session store's
//! selection, goes through the response cache, maps documents to entries and
//! publishes everything back to the store.

use std::sync::{Mutex, MutexGuard};

use crate::cache::{CacheKey, ResponseCache};
use crate::config::SearchConfig;
use crate::engine::{BackendResponse, SearchBackend};
use crate::engines::ArchiveOrgBackend;
use crate::error::SearchError;
use crate::mapper::{self, map_archive_documents, DocumentMapper};
use crate::query::{build_query, build_suggestion_query, SearchRequest};
use crate::result_types::{
    FacetConfig, FilterTab, ResultTypeConfig, ResultTypesConfig, SortingOption, DEFAULT_CATEGORY,
};
use crate::store::SessionStore;
use crate::types::{Facet, FacetValue, ResultEntry, SearchResultMeta};

use super::SearchOrchestration;

/// Sort used for suggestion lookups, so popular titles come first.
const SUGGESTION_SORT: &str = "downloads desc";

struct PagingState {
    category: String,
    /// Last page fetched for the current search.
    page: usize,
}

/// Search orchestrator over a [`SearchBackend`].
pub struct SearchService<B> {
    backend: B,
    mapper: DocumentMapper,
    result_types: ResultTypesConfig,
    config: SearchConfig,
    cache: ResponseCache,
    store: SessionStore,
    state: Mutex<PagingState>,
}

impl SearchService<ArchiveOrgBackend> {
    /// The archive.org setup: advanced search backend, archive document
    /// mapper and the single `all` category.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if `config` is invalid.
    pub fn archive_org(config: SearchConfig) -> Result<Self, SearchError> {
        config.validate()?;
        let backend = ArchiveOrgBackend::new(&config)?;
        Ok(Self::new(
            backend,
            map_archive_documents,
            ResultTypesConfig::archive_org(),
            config,
        ))
    }
}

impl<B: SearchBackend> SearchService<B> {
    pub fn new(
        backend: B,
        mapper: DocumentMapper,
        result_types: ResultTypesConfig,
        config: SearchConfig,
    ) -> Self {
        let category = result_types
            .resolve(DEFAULT_CATEGORY)
            .map(|t| t.id.clone())
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
        Self {
            backend,
            mapper,
            cache: ResponseCache::new(config.cache_ttl_seconds),
            result_types,
            config,
            store: SessionStore::new(),
            state: Mutex::new(PagingState { category, page: 1 }),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn active_category(&self) -> String {
        self.lock_state().category.clone()
    }

    /// Last page fetched for the current search (1 after a fresh search).
    pub fn current_page(&self) -> usize {
        self.lock_state().page
    }

    fn lock_state(&self) -> MutexGuard<'_, PagingState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn active_type(&self) -> Option<&ResultTypeConfig> {
        let category = self.active_category();
        self.result_types.resolve(&category)
    }

    fn build_request(&self, keyword: &str, page: usize) -> SearchRequest {
        let selected = self.store.selected_facets();
        let active = self.active_type();
        let criteria = active.map(|t| t.type_criteria.as_slice()).unwrap_or(&[]);

        let mut request = SearchRequest::new(build_query(keyword, &selected, criteria), self.config.rows);
        request.page = page;
        request.sort = active
            .and_then(|t| t.sorting_options.first())
            .map(SortingOption::sort_param);
        request.facets = active.map(|t| t.facets.clone()).unwrap_or_default();
        request
    }

    async fn fetch(&self, request: &SearchRequest) -> Result<BackendResponse, SearchError> {
        let key = CacheKey::new(request);
        if let Some(hit) = self.cache.get(&key).await {
            tracing::trace!(page = request.page, "response cache hit");
            return Ok(hit);
        }

        let response = self.backend.query(request).await.map_err(|err| {
            tracing::warn!(backend = self.backend.name(), error = %err, "backend query failed");
            err
        })?;
        self.cache.insert(key, response.clone()).await;
        Ok(response)
    }

    fn facets_from(&self, response: &BackendResponse, configs: &[FacetConfig]) -> Vec<Facet> {
        let selected = self.store.selected_facets();
        configs
            .iter()
            .map(|config| {
                let is_selected = |value: &str| {
                    selected
                        .iter()
                        .any(|s| s.name == config.field && s.value == value)
                };
                let mut values: Vec<FacetValue> = response
                    .facet_counts
                    .get(&config.field)
                    .map(|counts| {
                        counts
                            .iter()
                            .map(|c| FacetValue {
                                value: c.value.clone(),
                                count: c.count,
                                selected: is_selected(&c.value),
                            })
                            .collect()
                    })
                    .unwrap_or_default();

                // Selected values stay visible so they can be deselected.
                for s in selected.iter().filter(|s| s.name == config.field) {
                    if !values.iter().any(|v| v.value == s.value) {
                        values.push(FacetValue {
                            value: s.value.clone(),
                            count: 0,
                            selected: true,
                        });
                    }
                }

                Facet {
                    id: config.id.clone(),
                    name: config.field.clone(),
                    label: config.label.clone(),
                    facet_type: config.facet_type,
                    values,
                }
            })
            .collect()
    }

    /// First page for a did-you-mean keyword, without facets. Failures are
    /// logged and yield no alternative results.
    async fn alternative_results(&self, keyword: &str) -> Vec<ResultEntry> {
        let active = self.active_type();
        let criteria = active.map(|t| t.type_criteria.as_slice()).unwrap_or(&[]);
        let mut request = SearchRequest::new(build_query(keyword, &[], criteria), self.config.rows);
        request.sort = active
            .and_then(|t| t.sorting_options.first())
            .map(SortingOption::sort_param);

        match self.fetch(&request).await {
            Ok(response) => (self.mapper)(&response.docs, &response.highlighting),
            Err(err) => {
                tracing::warn!(error = %err, "alternative keyword search failed");
                Vec::new()
            }
        }
    }
}

fn as_count(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

impl<B: SearchBackend> SearchOrchestration for SearchService<B> {
    async fn search(&self, keyword: &str) -> Result<(), SearchError> {
        tracing::trace!(keyword, "search requested");
        let request = self.build_request(keyword, 1);
        let response = self.fetch(&request).await?;

        let entries = (self.mapper)(&response.docs, &response.highlighting);
        let facet_configs = self.active_type().map(|t| t.facets.clone()).unwrap_or_default();
        let facets = self.facets_from(&response, &facet_configs);
        self.lock_state().page = 1;

        let shown = entries.len();
        let no_results = entries.is_empty();
        self.store.facets().emit(facets);
        self.store.result_meta().emit(SearchResultMeta {
            num_found: as_count(response.num_found),
            keyword: keyword.to_string(),
            time_taken: as_count(response.time_taken_ms),
            num_showed: as_count(shown as u64),
        });
        self.store.results().emit(entries);
        self.store
            .alternative_keywords()
            .emit(response.alternative_keywords.clone());

        let alternatives = match response.alternative_keywords.first() {
            Some(alternative) if no_results => self.alternative_results(alternative).await,
            _ => Vec::new(),
        };
        self.store.alternative_results().emit(alternatives);

        tracing::debug!(num_found = response.num_found, shown, "search results published");
        Ok(())
    }

    async fn load_more(&self, keyword: &str) -> Result<(), SearchError> {
        let page = self.current_page() + 1;
        let request = self.build_request(keyword, page);
        let response = self.fetch(&request).await?;

        let entries = (self.mapper)(&response.docs, &response.highlighting);
        let added = entries.len();
        let mut results = self.store.results().get();
        results.extend(entries);
        self.lock_state().page = page;

        let mut meta = self.store.result_meta().get();
        meta.num_found = as_count(response.num_found);
        meta.keyword = keyword.to_string();
        meta.num_showed = as_count(results.len() as u64);
        self.store.results().emit(results);
        self.store.result_meta().emit(meta);

        tracing::debug!(page, added, "next page appended");
        Ok(())
    }

    fn adjust_params_to_changed_filter(&self, category: &str) {
        let resolved = self
            .result_types
            .resolve(category)
            .map(|t| t.id.clone())
            .unwrap_or_else(|| category.to_string());
        let mut state = self.lock_state();
        state.category = resolved;
        state.page = 1;
        tracing::debug!(category = %state.category, "filter category changed");
    }

    fn sorting_options(&self, category: &str) -> Vec<SortingOption> {
        self.result_types
            .resolve(category)
            .map(|t| t.sorting_options.clone())
            .unwrap_or_default()
    }

    fn filters_for_view(&self) -> Vec<FilterTab> {
        self.result_types.filter_tabs()
    }

    async fn suggestions(&self, input: &str) -> Result<Vec<String>, SearchError> {
        let input = input.trim();
        if input.chars().count() < self.config.min_suggestion_chars.max(1) {
            return Ok(Vec::new());
        }

        let limit = self.config.suggestion_count;
        let mut request = SearchRequest::new(build_suggestion_query(input), limit * 2);
        request.fields = vec!["title".to_string()];
        request.sort = Some(SUGGESTION_SORT.to_string());
        let response = self.fetch(&request).await?;

        let mut titles: Vec<String> = Vec::with_capacity(limit);
        for title in response.docs.into_iter().filter_map(|d| d.title) {
            let title = title.trim().to_string();
            if !title.is_empty() && !titles.contains(&title) {
                titles.push(title);
            }
            if titles.len() == limit {
                break;
            }
        }
        Ok(titles)
    }

    fn details_link(&self, id: &str) -> String {
        mapper::details_link(id)
    }

    fn store(&self) -> &SessionStore {
        &self.store
    }
}
