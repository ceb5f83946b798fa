//! Routing state: URL query parameters and their relation to selected facets.
//!
//! The page URL carries the keyword as `q` and one parameter per selected
//! facet value. Several values of one facet repeat the name:
//! `?q=jazz&genre=rock&genre=pop`. Values are never split, so a genre such
//! as `Folk, World, & Country` survives the trip through the URL.

use std::collections::BTreeMap;
use std::sync::Mutex;

use archive_search::{Observable, SelectedFacet};
use url::Url;

use crate::error::AppError;

/// Name of the keyword parameter.
pub const KEYWORD_PARAM: &str = "q";

/// Query parameters of the current route, ordered by name. Each name keeps
/// its values in URL order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(BTreeMap<String, Vec<String>>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a raw query string, with or without the leading `?`.
    pub fn from_query_string(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        url::form_urlencoded::parse(query.as_bytes()).collect()
    }

    /// Parse the query string of an absolute URL.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Route`] if `url` is not an absolute URL.
    pub fn from_url(url: &str) -> crate::error::Result<Self> {
        let parsed = Url::parse(url).map_err(|e| AppError::Route(format!("{url}: {e}")))?;
        Ok(Self::from_query_string(parsed.query().unwrap_or_default()))
    }

    /// Serialize as `name=value&...` without a leading `?`.
    pub fn to_query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.iter())
            .finish()
    }

    /// First value of `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Every value of `name`, in URL order.
    pub fn get_all(&self, name: &str) -> &[String] {
        self.0.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    /// Set `name` to the single value `value`.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), vec![value.into()]);
    }

    /// Add `value` after the existing values of `name`.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.entry(name.into()).or_default().push(value.into());
    }

    /// The `q` parameter, empty when absent.
    pub fn keyword(&self) -> &str {
        self.get(KEYWORD_PARAM).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of distinct parameter names.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Every `(name, value)` pair, names in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .flat_map(|(k, values)| values.iter().map(move |v| (k.as_str(), v.as_str())))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (name, value) in iter {
            params.append(name, value);
        }
        params
    }
}

/// Selected facets encoded in `params`: every value of every parameter
/// except `q` is one facet. Blank values are skipped and duplicate pairs
/// collapse.
pub fn params_to_selected_facets(params: &QueryParams) -> Vec<SelectedFacet> {
    let mut facets: Vec<SelectedFacet> = Vec::new();
    for (name, value) in params.iter().filter(|(name, _)| *name != KEYWORD_PARAM) {
        if value.trim().is_empty() {
            continue;
        }
        let facet = SelectedFacet::new(name, value);
        if !facets.contains(&facet) {
            facets.push(facet);
        }
    }
    facets
}

/// Route parameters describing `keyword` and `facets`.
///
/// `q` is always present. Values of one facet name keep their selection order.
pub fn selected_facets_to_params(keyword: &str, facets: &[SelectedFacet]) -> QueryParams {
    let mut params = reset_to_query_param(KEYWORD_PARAM, keyword);
    for facet in facets.iter().filter(|f| f.name != KEYWORD_PARAM) {
        params.append(facet.name.as_str(), facet.value.as_str());
    }
    params
}

/// Route parameters holding only `name=value`.
pub fn reset_to_query_param(name: &str, value: &str) -> QueryParams {
    std::iter::once((name, value)).collect()
}

/// The navigation layer: a stream of route parameters plus a way to replace them.
pub trait Navigator: Send + Sync {
    /// Current route parameters; replays the current value to new subscribers.
    fn query_params(&self) -> &Observable<QueryParams>;

    /// Replace the route's query parameters without adding a history entry.
    fn replace_query_params(&self, params: QueryParams);
}

/// In-process navigator. Starts on a route without parameters.
#[derive(Default)]
pub struct MemoryNavigator {
    params: Observable<QueryParams>,
    history: Mutex<Vec<QueryParams>>,
}

impl MemoryNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Navigator whose route starts at `params`.
    pub fn with_params(params: QueryParams) -> Self {
        Self {
            params: Observable::new(params),
            history: Mutex::new(Vec::new()),
        }
    }

    /// Navigate to a new route, as a user following a link would.
    pub fn navigate(&self, params: QueryParams) {
        self.params.emit(params);
    }

    pub fn current(&self) -> QueryParams {
        self.params.get()
    }

    /// Every parameter set written through [`Navigator::replace_query_params`].
    pub fn replacements(&self) -> Vec<QueryParams> {
        self.history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Navigator for MemoryNavigator {
    fn query_params(&self) -> &Observable<QueryParams> {
        &self.params
    }

    fn replace_query_params(&self, params: QueryParams) {
        tracing::debug!(query = %params.to_query_string(), "route replaced");
        self.history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(params.clone());
        self.params.emit(params);
    }
}
