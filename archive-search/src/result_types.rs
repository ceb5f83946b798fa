//! Filter categories ("result types") with their facet and sorting setup.
//!
//! Each category shows up as a filter tab. The archive.org page has a single
//! `all` category with one multi-select `genre` facet.

use serde::{Deserialize, Serialize};

use crate::types::FacetType;

/// Category used when nothing else has been selected.
pub const DEFAULT_CATEGORY: &str = "all";

/// How a facet is requested from the backend and presented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetConfig {
    /// Backend field the facet counts come from.
    pub field: String,
    /// Maximum number of facet values requested.
    pub limit: usize,
    /// Display label.
    pub label: String,
    /// Stable identifier of the facet group.
    pub id: String,
    pub facet_type: FacetType,
}

impl FacetConfig {
    pub fn new(field: &str, limit: usize, label: &str, id: &str) -> Self {
        Self {
            field: field.to_string(),
            limit,
            label: label.to_string(),
            id: id.to_string(),
            facet_type: FacetType::Single,
        }
    }

    /// Builder-style setter for the facet type.
    #[must_use]
    pub fn with_facet_type(mut self, facet_type: FacetType) -> Self {
        self.facet_type = facet_type;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// One entry of the sort dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortingOption {
    pub id: String,
    pub label: String,
    pub field: String,
    pub direction: SortDirection,
}

impl SortingOption {
    /// Backend sort parameter, e.g. `downloads desc`.
    pub fn sort_param(&self) -> String {
        format!("{} {}", self.field, self.direction.as_str())
    }
}

/// A restriction every search in a category carries, e.g. `mediatype:audio`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeCriteria {
    pub field: String,
    pub values: Vec<String>,
}

/// A filter tab as presented above the result list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterTab {
    pub id: String,
    /// Translation key of the tab title.
    pub name: String,
    pub icon: String,
}

/// Configuration of one filter category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultTypeConfig {
    pub id: String,
    /// Translation key of the category name.
    pub name: String,
    pub avatar_icon: String,
    pub facets: Vec<FacetConfig>,
    pub sorting_options: Vec<SortingOption>,
    pub type_criteria: Vec<TypeCriteria>,
}

/// All filter categories, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultTypesConfig {
    pub types: Vec<ResultTypeConfig>,
}

impl ResultTypesConfig {
    /// The archive.org setup: one `all` category with a multi-select genre facet.
    pub fn archive_org() -> Self {
        Self {
            types: vec![ResultTypeConfig {
                id: DEFAULT_CATEGORY.to_string(),
                name: "app.filterName.all".to_string(),
                avatar_icon: "search".to_string(),
                facets: vec![FacetConfig::new("genre", 25, "Type", "top_genre")
                    .with_facet_type(FacetType::Multi)],
                sorting_options: Vec::new(),
                type_criteria: Vec::new(),
            }],
        }
    }

    pub fn get(&self, id: &str) -> Option<&ResultTypeConfig> {
        self.types.iter().find(|t| t.id == id)
    }

    /// The category with `id`, falling back to the first configured one.
    pub fn resolve(&self, id: &str) -> Option<&ResultTypeConfig> {
        self.get(id).or_else(|| self.types.first())
    }

    pub fn filter_tabs(&self) -> Vec<FilterTab> {
        self.types
            .iter()
            .map(|t| FilterTab {
                id: t.id.clone(),
                name: t.name.clone(),
                icon: t.avatar_icon.clone(),
            })
            .collect()
    }
}

impl Default for ResultTypesConfig {
    fn default() -> Self {
        Self::archive_org()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_categories() -> ResultTypesConfig {
        let mut config = ResultTypesConfig::archive_org();
        config.types.push(ResultTypeConfig {
            id: "audio".into(),
            name: "app.filterName.audio".into(),
            avatar_icon: "music_note".into(),
            facets: Vec::new(),
            sorting_options: vec![SortingOption {
                id: "popular".into(),
                label: "Most downloaded".into(),
                field: "downloads".into(),
                direction: SortDirection::Desc,
            }],
            type_criteria: vec![TypeCriteria {
                field: "mediatype".into(),
                values: vec!["audio".into()],
            }],
        });
        config
    }

    #[test]
    fn archive_org_has_genre_facet() {
        let config = ResultTypesConfig::archive_org();
        let all = config.get(DEFAULT_CATEGORY).expect("all category");
        assert_eq!(all.facets.len(), 1);
        assert_eq!(all.facets[0].field, "genre");
        assert_eq!(all.facets[0].limit, 25);
        assert_eq!(all.facets[0].id, "top_genre");
        assert_eq!(all.facets[0].facet_type, FacetType::Multi);
        assert!(all.sorting_options.is_empty());
    }

    #[test]
    fn resolve_falls_back_to_first_category() {
        let config = two_categories();
        assert_eq!(config.resolve("video").map(|t| t.id.as_str()), Some("all"));
        assert_eq!(config.resolve("audio").map(|t| t.id.as_str()), Some("audio"));
    }

    #[test]
    fn filter_tabs_follow_category_order() {
        let tabs = two_categories().filter_tabs();
        assert_eq!(tabs.len(), 2);
        assert_eq!(tabs[0].id, "all");
        assert_eq!(tabs[0].icon, "search");
        assert_eq!(tabs[1].name, "app.filterName.audio");
    }

    #[test]
    fn sort_param_joins_field_and_direction() {
        let config = two_categories();
        let option = &config.get("audio").expect("audio").sorting_options[0];
        assert_eq!(option.sort_param(), "downloads desc");
    }
}
