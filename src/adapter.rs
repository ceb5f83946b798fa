//! The search page's state holder.
//!
//! [`SearchStateAdapter`] reconciles the route's query parameters with the
//! session store, turns user interactions into searches and keeps the view
//! records ([`SearchFieldConfig`], [`ResultViewConfig`], [`NoResultsConfig`])
//! current. Every mutating operation triggers exactly one search through the
//! [`SearchOrchestration`] collaborator.
//!
//! Route handling is one-shot: the first route carrying a keyword starts a
//! search, and any user mutation before that releases the route
//! subscription so a late route emission cannot overwrite what the user did.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use archive_search::{
    FilterTab, ResultEntry, SearchOrchestration, SelectedFacet, Subscription, DEFAULT_CATEGORY,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::config::UiConfig;
use crate::error::Result;
use crate::route::{
    params_to_selected_facets, reset_to_query_param, selected_facets_to_params, Navigator,
    QueryParams, KEYWORD_PARAM,
};
use crate::view::{
    BreakpointState, NoResultsConfig, ResultViewConfig, SearchFieldConfig, Viewport,
};

/// Route emissions the initial subscription looks at before it gives up.
const ROUTE_EMISSION_LIMIT: usize = 2;

#[derive(Debug)]
struct PageState {
    keyword: String,
    did_you_mean_value: String,
    search_field: SearchFieldConfig,
    result_view: ResultViewConfig,
}

/// State and event handlers of one search page instance.
pub struct SearchStateAdapter<S, N> {
    service: Arc<S>,
    navigator: Arc<N>,
    viewport: Viewport,
    page: Mutex<PageState>,
    no_results: Arc<Mutex<NoResultsConfig>>,
    breakpoints: Arc<Mutex<BreakpointState>>,
    teardown: CancellationToken,
    initialized: AtomicBool,
    /// Set once route state has started a search or the user has taken over.
    route_consumed: AtomicBool,
    route_subscription: Mutex<Option<Subscription>>,
    route_tx: mpsc::UnboundedSender<QueryParams>,
    route_rx: Mutex<mpsc::UnboundedReceiver<QueryParams>>,
}

impl<S: SearchOrchestration, N: Navigator> SearchStateAdapter<S, N> {
    pub fn new(service: Arc<S>, navigator: Arc<N>, viewport: Viewport, ui: &UiConfig) -> Self {
        let result_view = ResultViewConfig::new(
            service.sorting_options(DEFAULT_CATEGORY),
            service.filters_for_view(),
            ui,
        );
        let (route_tx, route_rx) = mpsc::unbounded_channel();
        Self {
            service,
            navigator,
            viewport,
            page: Mutex::new(PageState {
                keyword: String::new(),
                did_you_mean_value: String::new(),
                search_field: SearchFieldConfig {
                    value: String::new(),
                    placeholder_label: ui.placeholder_label.clone(),
                },
                result_view,
            }),
            no_results: Arc::new(Mutex::new(NoResultsConfig::new(ui))),
            breakpoints: Arc::new(Mutex::new(BreakpointState::default())),
            teardown: CancellationToken::new(),
            initialized: AtomicBool::new(false),
            route_consumed: AtomicBool::new(false),
            route_subscription: Mutex::new(None),
            route_tx,
            route_rx: Mutex::new(route_rx),
        }
    }

    /// Wire the page to its streams and act on the current route.
    ///
    /// Subscribes to alternative keywords, alternative results and viewport
    /// breakpoints for the adapter's lifetime, and to the route parameters
    /// for at most two emissions. The current route is processed before this
    /// returns. Calling `init` again is a no-op.
    ///
    /// # Errors
    ///
    /// Propagates the error of a search started from the route.
    pub async fn init(&self) -> Result<()> {
        if self.initialized.swap(true, Ordering::SeqCst) || self.teardown.is_cancelled() {
            return Ok(());
        }

        let store = self.service.store();
        let no_results = Arc::clone(&self.no_results);
        store
            .alternative_keywords()
            .subscribe_until(&self.teardown, move |keywords: &Vec<String>| {
                lock(&no_results).alternative_keywords = keywords.clone();
            });
        let no_results = Arc::clone(&self.no_results);
        store
            .alternative_results()
            .subscribe_until(&self.teardown, move |results: &Vec<ResultEntry>| {
                lock(&no_results).alternative_results = results.clone();
            });
        let breakpoints = Arc::clone(&self.breakpoints);
        self.viewport
            .breakpoints()
            .subscribe_until(&self.teardown, move |state: &BreakpointState| {
                *lock(&breakpoints) = *state;
            });

        let tx = self.route_tx.clone();
        let subscription = self.navigator.query_params().subscribe_bounded(
            ROUTE_EMISSION_LIMIT,
            &self.teardown,
            move |params: &QueryParams| {
                let _ = tx.send(params.clone());
            },
        );
        *lock(&self.route_subscription) = Some(subscription);

        self.pump_route_params().await
    }

    /// Process route emissions received since the last call.
    ///
    /// Empty routes are skipped. A route with a non-empty `q` sets the
    /// keyword, rebuilds the selected facets from its other parameters and
    /// triggers one search; after that the route is no longer followed.
    ///
    /// # Errors
    ///
    /// Propagates the error of the triggered search.
    pub async fn pump_route_params(&self) -> Result<()> {
        let pending = self.drain_route();
        for params in pending {
            if self.route_consumed.load(Ordering::SeqCst) || self.teardown.is_cancelled() {
                break;
            }
            if params.is_empty() {
                tracing::debug!("route has no parameters, skipping initial search");
                continue;
            }

            let keyword = params.keyword().to_string();
            self.page().keyword = keyword.clone();
            if keyword.is_empty() {
                tracing::debug!(params = params.len(), "route has no keyword, skipping initial search");
                continue;
            }

            self.release_route();
            let facets = params_to_selected_facets(&params);
            tracing::debug!(facets = facets.len(), "starting search from route");
            tracing::trace!(%keyword, "route keyword");
            self.service.store().set_selected_facets(facets);
            self.service.search(&keyword).await?;
        }
        Ok(())
    }

    /// Toggle `facet` in the selection, mirror it into the URL and search again
    /// with the current keyword.
    ///
    /// # Errors
    ///
    /// Propagates the search error.
    pub async fn facet_changed(&self, facet: &SelectedFacet) -> Result<()> {
        self.release_route();
        let store = self.service.store();
        let selected = store.toggle_selected_facet(facet);
        tracing::debug!(facet = %facet, selected, "facet toggled");

        let keyword = self.keyword();
        self.navigator
            .replace_query_params(selected_facets_to_params(&keyword, &store.selected_facets()));
        self.service.search(&keyword).await?;
        Ok(())
    }

    /// A new keyword from the search field: clears the selection and
    /// the did-you-mean value, then searches.
    ///
    /// # Errors
    ///
    /// Propagates the search error.
    pub async fn handle_search_event(&self, keyword: &str) -> Result<()> {
        self.start_new_search(keyword, "").await
    }

    /// Search for a did-you-mean suggestion and show it in the search field.
    ///
    /// # Errors
    ///
    /// Propagates the search error.
    pub async fn did_you_mean_search(&self, value: &str) -> Result<()> {
        self.start_new_search(value, value).await
    }

    /// Clear the selection, reset the URL to only `q` and search again.
    ///
    /// # Errors
    ///
    /// Propagates the search error.
    pub async fn reset_selected_facets(&self) -> Result<()> {
        self.release_route();
        self.service.store().clear_selected_facets();
        let keyword = self.keyword();
        self.navigator
            .replace_query_params(reset_to_query_param(KEYWORD_PARAM, &keyword));
        self.service.search(&keyword).await?;
        Ok(())
    }

    /// Switch the filter category, refresh its sorting options, then reset
    /// the selection.
    ///
    /// # Errors
    ///
    /// Propagates the search error.
    pub async fn handle_filter_change(&self, category: &str) -> Result<()> {
        self.release_route();
        tracing::debug!(category, "filter category changed");
        self.service.adjust_params_to_changed_filter(category);
        let sorting_options = self.service.sorting_options(category);
        self.page().result_view.sorting_options = sorting_options;
        self.reset_selected_facets().await
    }

    /// Append the next result page for the current keyword.
    ///
    /// # Errors
    ///
    /// Propagates the search error.
    pub async fn handle_load_more(&self) -> Result<()> {
        let keyword = self.keyword();
        self.service.load_more(&keyword).await?;
        Ok(())
    }

    /// Number of selected facets, shown on the filter button.
    pub fn badge_number(&self) -> usize {
        self.service.store().selected_facets().len()
    }

    /// Suggestions for the search field's partially typed `input`.
    ///
    /// # Errors
    ///
    /// Propagates the lookup error.
    pub async fn suggestions(&self, input: &str) -> Result<Vec<String>> {
        Ok(self.service.suggestions(input).await?)
    }

    /// Detail page to open for a clicked entry, if the entry has an id.
    pub fn on_result_entry_clicked(&self, entry: &ResultEntry) -> Option<String> {
        if entry.id.is_empty() {
            tracing::debug!("clicked entry has no id");
            return None;
        }
        tracing::debug!(id = %entry.id, "opening result entry");
        Some(self.service.details_link(&entry.id))
    }

    pub fn filter_tabs(&self) -> Vec<FilterTab> {
        self.service.filters_for_view()
    }

    pub fn keyword(&self) -> String {
        self.page().keyword.clone()
    }

    pub fn did_you_mean_value(&self) -> String {
        self.page().did_you_mean_value.clone()
    }

    pub fn search_field(&self) -> SearchFieldConfig {
        self.page().search_field.clone()
    }

    pub fn result_view(&self) -> ResultViewConfig {
        self.page().result_view.clone()
    }

    pub fn no_results(&self) -> NoResultsConfig {
        lock(&self.no_results).clone()
    }

    pub fn breakpoints(&self) -> BreakpointState {
        *lock(&self.breakpoints)
    }

    pub fn service(&self) -> &Arc<S> {
        &self.service
    }

    pub fn navigator(&self) -> &Arc<N> {
        &self.navigator
    }

    /// Whether the route is still being followed.
    pub fn follows_route(&self) -> bool {
        !self.route_consumed.load(Ordering::SeqCst)
            && lock(&self.route_subscription)
                .as_ref()
                .is_some_and(|s| !s.is_cancelled())
    }

    async fn start_new_search(&self, keyword: &str, did_you_mean: &str) -> Result<()> {
        self.release_route();
        {
            let mut page = self.page();
            page.keyword = keyword.to_string();
            page.did_you_mean_value = did_you_mean.to_string();
            page.search_field.value = keyword.to_string();
        }
        {
            let mut no_results = lock(&self.no_results);
            no_results.search_keyword = keyword.to_string();
            no_results.did_you_mean_value = did_you_mean.to_string();
        }
        self.service.store().clear_selected_facets();
        tracing::trace!(keyword, "new search");
        self.service.search(keyword).await?;
        Ok(())
    }

    /// Stop following the route and drop emissions not yet processed.
    fn release_route(&self) {
        if !self.route_consumed.swap(true, Ordering::SeqCst) {
            tracing::debug!("route subscription released");
        }
        if let Some(subscription) = lock(&self.route_subscription).as_ref() {
            subscription.cancel();
        }
        self.drain_route();
    }

    fn drain_route(&self) -> Vec<QueryParams> {
        let mut rx = lock(&self.route_rx);
        let mut pending = Vec::new();
        while let Ok(params) = rx.try_recv() {
            pending.push(params);
        }
        pending
    }

    fn page(&self) -> MutexGuard<'_, PageState> {
        lock(&self.page)
    }
}

impl<S, N> SearchStateAdapter<S, N> {
    /// Release every subscription the adapter holds. Safe to call repeatedly.
    pub fn teardown(&self) {
        if self.teardown.is_cancelled() {
            return;
        }
        self.teardown.cancel();
        tracing::debug!("search page torn down");
    }

    pub fn is_torn_down(&self) -> bool {
        self.teardown.is_cancelled()
    }
}

impl<S, N> Drop for SearchStateAdapter<S, N> {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
