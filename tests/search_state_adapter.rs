//! Behaviour of the search page adapter against a recording orchestrator.

use std::sync::{Arc, Mutex};

use archive_explorer::route::{reset_to_query_param, Navigator};
use archive_explorer::{
    AppError, MemoryNavigator, QueryParams, SearchStateAdapter, UiConfig, Viewport,
};
use archive_search::result_types::SortDirection;
use archive_search::{
    FilterTab, ResultEntry, SearchError, SearchOrchestration, SelectedFacet, SessionStore,
    SortingOption,
};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Search {
        keyword: String,
        facets: Vec<SelectedFacet>,
    },
    LoadMore(String),
    Adjust(String),
}

#[derive(Default)]
struct RecordingService {
    store: SessionStore,
    calls: Mutex<Vec<Call>>,
    fail_searches: bool,
}

impl RecordingService {
    fn failing() -> Self {
        Self {
            fail_searches: true,
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn searches(&self) -> Vec<(String, Vec<SelectedFacet>)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Search { keyword, facets } => Some((keyword, facets)),
                _ => None,
            })
            .collect()
    }
}

impl SearchOrchestration for RecordingService {
    async fn search(&self, keyword: &str) -> Result<(), SearchError> {
        self.calls.lock().unwrap().push(Call::Search {
            keyword: keyword.to_string(),
            facets: self.store.selected_facets(),
        });
        if self.fail_searches {
            return Err(SearchError::Http("503 Service Unavailable".into()));
        }
        Ok(())
    }

    async fn load_more(&self, keyword: &str) -> Result<(), SearchError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::LoadMore(keyword.to_string()));
        Ok(())
    }

    fn adjust_params_to_changed_filter(&self, category: &str) {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Adjust(category.to_string()));
    }

    fn sorting_options(&self, category: &str) -> Vec<SortingOption> {
        vec![SortingOption {
            id: format!("{category}-downloads"),
            label: "Downloads".into(),
            field: "downloads".into(),
            direction: SortDirection::Desc,
        }]
    }

    fn filters_for_view(&self) -> Vec<FilterTab> {
        vec![FilterTab {
            id: "all".into(),
            name: "app.filterName.all".into(),
            icon: "search".into(),
        }]
    }

    async fn suggestions(&self, input: &str) -> Result<Vec<String>, SearchError> {
        Ok(vec![format!("{input}ven"), format!("{input}ven sonatas")])
    }

    fn details_link(&self, id: &str) -> String {
        format!("http://archive.org/details/{id}")
    }

    fn store(&self) -> &SessionStore {
        &self.store
    }
}

type Page = SearchStateAdapter<RecordingService, MemoryNavigator>;

fn page_with(service: RecordingService, route: QueryParams) -> Page {
    SearchStateAdapter::new(
        Arc::new(service),
        Arc::new(MemoryNavigator::with_params(route)),
        Viewport::new(),
        &UiConfig::default(),
    )
}

fn page(route: &[(&str, &str)]) -> Page {
    page_with(RecordingService::default(), route.iter().copied().collect())
}

fn rock() -> SelectedFacet {
    SelectedFacet::new("genre", "rock")
}

#[tokio::test]
async fn route_with_keyword_triggers_one_search() {
    let page = page(&[("q", "jazz"), ("genre", "rock")]);
    page.init().await.unwrap();

    assert_eq!(page.keyword(), "jazz");
    assert_eq!(page.service().store().selected_facets(), vec![rock()]);
    assert_eq!(
        page.service().searches(),
        vec![("jazz".to_string(), vec![rock()])]
    );
    assert!(!page.follows_route());
}

#[tokio::test]
async fn empty_route_triggers_nothing() {
    let page = page(&[]);
    page.init().await.unwrap();

    assert!(page.service().calls().is_empty());
    assert!(page.keyword().is_empty());
    assert!(page.follows_route());
}

#[tokio::test]
async fn route_without_keyword_triggers_nothing() {
    let page = page(&[("genre", "rock")]);
    page.init().await.unwrap();

    assert!(page.service().calls().is_empty());
    assert!(page.service().store().selected_facets().is_empty());
}

#[tokio::test]
async fn second_route_emission_can_start_the_search() {
    let page = page(&[]);
    page.init().await.unwrap();

    page.navigator()
        .navigate([("q", "bach"), ("genre", "baroque")].into_iter().collect());
    page.pump_route_params().await.unwrap();

    assert_eq!(
        page.service().searches(),
        vec![(
            "bach".to_string(),
            vec![SelectedFacet::new("genre", "baroque")]
        )]
    );
}

#[tokio::test]
async fn route_is_ignored_after_two_emissions() {
    let page = page(&[]);
    page.init().await.unwrap();

    page.navigator()
        .navigate([("genre", "rock")].into_iter().collect());
    page.pump_route_params().await.unwrap();
    page.navigator()
        .navigate([("q", "late")].into_iter().collect());
    page.pump_route_params().await.unwrap();

    assert!(page.service().calls().is_empty());
    assert!(!page.follows_route());
}

#[tokio::test]
async fn route_triggers_at_most_once() {
    let page = page(&[("q", "jazz")]);
    page.init().await.unwrap();

    page.navigator()
        .navigate([("q", "blues")].into_iter().collect());
    page.pump_route_params().await.unwrap();

    assert_eq!(page.service().searches().len(), 1);
    assert_eq!(page.keyword(), "jazz");
}

#[tokio::test]
async fn user_search_releases_the_route() {
    let page = page(&[]);
    page.init().await.unwrap();

    page.handle_search_event("mozart").await.unwrap();
    page.navigator()
        .navigate([("q", "bach")].into_iter().collect());
    page.pump_route_params().await.unwrap();

    assert_eq!(page.keyword(), "mozart");
    let searches = page.service().searches();
    assert_eq!(searches.len(), 1);
    assert_eq!(searches[0].0, "mozart");
}

#[tokio::test]
async fn init_twice_is_a_no_op() {
    let page = page(&[("q", "jazz")]);
    page.init().await.unwrap();
    page.init().await.unwrap();
    assert_eq!(page.service().searches().len(), 1);
}

#[tokio::test]
async fn facet_changed_toggles_writes_url_and_searches() {
    let page = page(&[]);
    page.init().await.unwrap();
    page.handle_search_event("jazz").await.unwrap();

    page.facet_changed(&rock()).await.unwrap();
    assert_eq!(page.badge_number(), 1);
    let url = page.navigator().current();
    assert_eq!(url.keyword(), "jazz");
    assert_eq!(url.get("genre"), Some("rock"));

    page.facet_changed(&rock()).await.unwrap();
    assert_eq!(page.badge_number(), 0);
    assert_eq!(page.navigator().current(), reset_to_query_param("q", "jazz"));

    let searches = page.service().searches();
    assert_eq!(searches.len(), 3);
    assert_eq!(searches[1], ("jazz".to_string(), vec![rock()]));
    assert_eq!(searches[2], ("jazz".to_string(), vec![]));
}

#[tokio::test]
async fn facet_changed_groups_values_in_url() {
    let page = page(&[("q", "jazz"), ("genre", "rock")]);
    page.init().await.unwrap();

    page.facet_changed(&SelectedFacet::new("genre", "pop"))
        .await
        .unwrap();

    assert_eq!(
        page.navigator().current().to_query_string(),
        "genre=rock&genre=pop&q=jazz"
    );
    assert_eq!(page.navigator().replacements().len(), 1);
    assert_eq!(page.service().searches().len(), 2);
}

#[tokio::test]
async fn url_write_does_not_retrigger_route_search() {
    let page = page(&[]);
    page.init().await.unwrap();

    page.facet_changed(&rock()).await.unwrap();
    page.pump_route_params().await.unwrap();

    assert_eq!(page.service().searches().len(), 1);
}

#[tokio::test]
async fn search_event_then_reset_leaves_only_keyword() {
    let page = page(&[("q", "jazz"), ("genre", "rock")]);
    page.init().await.unwrap();

    page.handle_search_event("blues").await.unwrap();
    page.reset_selected_facets().await.unwrap();

    assert!(page.service().store().selected_facets().is_empty());
    let url = page.navigator().current();
    assert_eq!(url.len(), 1);
    assert_eq!(url.keyword(), "blues");
}

#[tokio::test]
async fn search_event_clears_facets_and_did_you_mean() {
    let page = page(&[]);
    page.init().await.unwrap();
    page.did_you_mean_search("beethoven").await.unwrap();
    page.facet_changed(&rock()).await.unwrap();

    page.handle_search_event("mozart").await.unwrap();

    assert_eq!(page.keyword(), "mozart");
    assert_eq!(page.search_field().value, "mozart");
    assert!(page.did_you_mean_value().is_empty());
    assert!(page.service().store().selected_facets().is_empty());
    let no_results = page.no_results();
    assert_eq!(no_results.search_keyword, "mozart");
    assert!(no_results.did_you_mean_value.is_empty());
    assert_eq!(
        page.service().searches().last(),
        Some(&("mozart".to_string(), vec![]))
    );
}

#[tokio::test]
async fn did_you_mean_search_sets_field_value() {
    let page = page(&[("q", "betoven"), ("genre", "classical")]);
    page.init().await.unwrap();

    page.did_you_mean_search("beethoven").await.unwrap();

    assert_eq!(page.keyword(), "beethoven");
    assert_eq!(page.did_you_mean_value(), "beethoven");
    assert_eq!(page.search_field().value, "beethoven");
    assert_eq!(page.search_field().placeholder_label, "app.searchField.placeholder");
    assert!(page.service().store().selected_facets().is_empty());
    assert_eq!(
        page.service().searches().last(),
        Some(&("beethoven".to_string(), vec![]))
    );
}

#[tokio::test]
async fn filter_change_adjusts_then_resets_and_searches_once() {
    let page = page(&[]);
    page.init().await.unwrap();
    page.handle_search_event("jazz").await.unwrap();
    page.facet_changed(&rock()).await.unwrap();
    let before = page.service().calls().len();

    page.handle_filter_change("audio").await.unwrap();

    let calls = page.service().calls();
    assert_eq!(
        calls[before..].to_vec(),
        vec![
            Call::Adjust("audio".into()),
            Call::Search {
                keyword: "jazz".into(),
                facets: vec![]
            },
        ]
    );
    assert_eq!(page.result_view().sorting_options[0].id, "audio-downloads");
    assert_eq!(page.navigator().current(), reset_to_query_param("q", "jazz"));
}

#[tokio::test]
async fn every_mutation_searches_exactly_once() {
    let page = page(&[]);
    page.init().await.unwrap();

    let mut expected = 0;
    page.handle_search_event("jazz").await.unwrap();
    expected += 1;
    assert_eq!(page.service().searches().len(), expected);
    page.facet_changed(&rock()).await.unwrap();
    expected += 1;
    assert_eq!(page.service().searches().len(), expected);
    page.reset_selected_facets().await.unwrap();
    expected += 1;
    assert_eq!(page.service().searches().len(), expected);
    page.did_you_mean_search("blues").await.unwrap();
    expected += 1;
    assert_eq!(page.service().searches().len(), expected);
    page.handle_filter_change("all").await.unwrap();
    expected += 1;
    assert_eq!(page.service().searches().len(), expected);
}

#[tokio::test]
async fn load_more_uses_current_keyword() {
    let page = page(&[("q", "jazz")]);
    page.init().await.unwrap();
    page.handle_load_more().await.unwrap();

    assert_eq!(page.service().calls().last(), Some(&Call::LoadMore("jazz".into())));
    assert_eq!(page.service().searches().len(), 1);
}

#[tokio::test]
async fn alternative_results_feed_no_results_page() {
    let page = page(&[]);
    page.init().await.unwrap();
    let store = page.service().store();

    store.alternative_keywords().emit(vec!["beethoven".into()]);
    store.alternative_results().emit(vec![ResultEntry {
        id: "abc".into(),
        ..ResultEntry::default()
    }]);

    let no_results = page.no_results();
    assert_eq!(no_results.alternative_keywords, vec!["beethoven".to_string()]);
    assert_eq!(no_results.alternative_results.len(), 1);
    assert_eq!(no_results.contact_phone_number, "+43 662 27 66 80");
}

#[tokio::test]
async fn breakpoints_follow_viewport() {
    let viewport = Viewport::new();
    let page = SearchStateAdapter::new(
        Arc::new(RecordingService::default()),
        Arc::new(MemoryNavigator::new()),
        viewport.clone(),
        &UiConfig::default(),
    );
    page.init().await.unwrap();

    viewport.update(480);
    assert!(page.breakpoints().mobile);
    viewport.update(800);
    assert!(page.breakpoints().tablet);
    assert!(!page.breakpoints().mobile);
}

#[tokio::test]
async fn teardown_stops_all_callbacks() {
    let viewport = Viewport::new();
    let navigator = Arc::new(MemoryNavigator::new());
    let page = SearchStateAdapter::new(
        Arc::new(RecordingService::default()),
        Arc::clone(&navigator),
        viewport.clone(),
        &UiConfig::default(),
    );
    page.init().await.unwrap();
    let store = page.service().store();
    assert_eq!(store.alternative_keywords().subscriber_count(), 1);

    page.teardown();
    page.teardown();

    store.alternative_keywords().emit(vec!["ignored".into()]);
    viewport.update(320);
    navigator.navigate([("q", "jazz")].into_iter().collect());
    page.pump_route_params().await.unwrap();

    assert!(page.is_torn_down());
    assert!(page.no_results().alternative_keywords.is_empty());
    assert!(!page.breakpoints().mobile);
    assert!(page.service().calls().is_empty());
    assert_eq!(store.alternative_keywords().subscriber_count(), 0);
    assert_eq!(navigator.query_params().subscriber_count(), 0);
}

#[tokio::test]
async fn dropping_the_page_releases_subscriptions() {
    let service = Arc::new(RecordingService::default());
    let navigator = Arc::new(MemoryNavigator::new());
    {
        let page = SearchStateAdapter::new(
            Arc::clone(&service),
            Arc::clone(&navigator),
            Viewport::new(),
            &UiConfig::default(),
        );
        page.init().await.unwrap();
        assert_eq!(service.store().alternative_results().subscriber_count(), 1);
    }
    assert_eq!(service.store().alternative_results().subscriber_count(), 0);
    assert_eq!(navigator.query_params().subscriber_count(), 0);
}

#[tokio::test]
async fn search_errors_propagate_and_keep_state() {
    let page = page_with(RecordingService::failing(), QueryParams::new());
    page.init().await.unwrap();

    let err = page.handle_search_event("jazz").await.unwrap_err();
    assert!(matches!(err, AppError::Search(SearchError::Http(_))));
    assert_eq!(page.keyword(), "jazz");
    assert_eq!(page.service().searches().len(), 1);
}

#[tokio::test]
async fn route_search_error_surfaces_from_init() {
    let route = [("q", "jazz")].into_iter().collect();
    let page = page_with(RecordingService::failing(), route);
    assert!(page.init().await.is_err());
    assert_eq!(page.keyword(), "jazz");
    assert!(!page.follows_route());
}

#[tokio::test]
async fn suggestions_and_links_delegate() {
    let page = page(&[]);
    assert_eq!(
        page.suggestions("beetho").await.unwrap(),
        vec!["beethoven".to_string(), "beethoven sonatas".to_string()]
    );

    let entry = ResultEntry {
        id: "abc".into(),
        ..ResultEntry::default()
    };
    assert_eq!(
        page.on_result_entry_clicked(&entry).as_deref(),
        Some("http://archive.org/details/abc")
    );
    assert_eq!(page.on_result_entry_clicked(&ResultEntry::default()), None);
    assert_eq!(page.filter_tabs()[0].icon, "search");
}
