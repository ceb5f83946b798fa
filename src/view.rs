//! View-state records the page renders from.
//!
//! None of these own behaviour beyond small constructors; the adapter keeps
//! them current and a rendering collaborator reads them.

use archive_search::{FilterTab, Observable, ResultEntry, SortingOption};
use serde::{Deserialize, Serialize};

use crate::config::UiConfig;

/// Viewports narrower than this are mobile.
pub const MOBILE_MAX_WIDTH: u32 = 600;
/// Viewports narrower than this (and at least [`MOBILE_MAX_WIDTH`]) are tablet.
pub const TABLET_MAX_WIDTH: u32 = 1024;

/// How the result list is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultViewType {
    #[default]
    List,
    Grid,
}

/// Everything the result list header needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultViewConfig {
    pub sorting_options: Vec<SortingOption>,
    pub filter_tabs: Vec<FilterTab>,
    pub result_view_types: Vec<ResultViewType>,
    pub selected_result_view_type: ResultViewType,
}

impl ResultViewConfig {
    pub fn new(
        sorting_options: Vec<SortingOption>,
        filter_tabs: Vec<FilterTab>,
        ui: &UiConfig,
    ) -> Self {
        Self {
            sorting_options,
            filter_tabs,
            result_view_types: ui.result_view_types.clone(),
            selected_result_view_type: ui.selected_result_view_type,
        }
    }
}

/// State of the "no results" page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoResultsConfig {
    pub alternative_keywords: Vec<String>,
    pub alternative_results: Vec<ResultEntry>,
    pub did_you_mean_value: String,
    /// Keyword the page reports as having found nothing.
    pub search_keyword: String,
    pub contact_phone_number: String,
    pub contact_mail_address: String,
}

impl NoResultsConfig {
    pub fn new(ui: &UiConfig) -> Self {
        Self {
            contact_phone_number: ui.contact_phone_number.clone(),
            contact_mail_address: ui.contact_mail_address.clone(),
            ..Self::default()
        }
    }
}

/// State of the search input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchFieldConfig {
    /// Text shown in the field.
    pub value: String,
    /// Translation key of the placeholder.
    pub placeholder_label: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BreakpointState {
    pub mobile: bool,
    pub tablet: bool,
}

impl BreakpointState {
    pub fn for_width(width: u32) -> Self {
        Self {
            mobile: width < MOBILE_MAX_WIDTH,
            tablet: (MOBILE_MAX_WIDTH..TABLET_MAX_WIDTH).contains(&width),
        }
    }
}

/// Source of breakpoint changes. The host feeds it viewport widths.
#[derive(Clone, Default)]
pub struct Viewport {
    state: Observable<BreakpointState>,
}

impl Viewport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new viewport width. Emits only when the breakpoint flags change.
    pub fn update(&self, width: u32) {
        let next = BreakpointState::for_width(width);
        if next != self.state.get() {
            self.state.emit(next);
        }
    }

    pub fn breakpoints(&self) -> &Observable<BreakpointState> {
        &self.state
    }
}
