//! Core types: raw backend documents, normalized result entries, facets and
//! search metadata.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Per-document highlighting payload: document id → field → snippets.
pub type Highlighting = HashMap<String, HashMap<String, Vec<String>>>;

/// One document as returned by the advanced search endpoint.
///
/// Every field is optional and decoded leniently: strings, numbers and lists
/// of either are all accepted, anything else decodes as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDocument {
    #[serde(default, deserialize_with = "lenient::text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub identifier: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub description: Option<String>,
    /// File formats; the backend sends a single string for one-format items.
    #[serde(default, deserialize_with = "lenient::list")]
    pub format: Vec<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub genre: Option<String>,
    /// Download count; numeric on the wire, kept as display text.
    #[serde(default, deserialize_with = "lenient::text")]
    pub downloads: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub mediatype: Option<String>,
}

/// A labeled attribute shown under a result title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubAttribute {
    pub name: String,
    pub description: String,
    /// Material icon name used by the rendering component.
    pub icon: String,
}

/// Normalized, UI-agnostic representation of one search result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultEntry {
    pub title: String,
    pub id: String,
    pub description: String,
    pub tags: Vec<String>,
    pub sub_titles: Vec<SubAttribute>,
}

/// One active filter: a `(facet name, value)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SelectedFacet {
    pub name: String,
    pub value: String,
}

impl SelectedFacet {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for SelectedFacet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// Whether a facet allows one or several values to be selected at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacetType {
    Single,
    #[default]
    Multi,
}

/// A value of a facet with its document count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetValue {
    pub value: String,
    pub count: u64,
    /// Whether this value is among the currently selected facets.
    pub selected: bool,
}

/// A named filterable attribute with the values found for the last search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facet {
    pub id: String,
    /// Backend field name; also the query parameter name for this facet.
    pub name: String,
    pub label: String,
    pub facet_type: FacetType,
    pub values: Vec<FacetValue>,
}

/// Summary of the last search.
///
/// Counters are `-1` until the first search completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResultMeta {
    pub num_found: i64,
    pub keyword: String,
    /// Backend query time in milliseconds.
    pub time_taken: i64,
    pub num_showed: i64,
}

impl Default for SearchResultMeta {
    fn default() -> Self {
        Self {
            num_found: -1,
            keyword: String::new(),
            time_taken: -1,
            num_showed: -1,
        }
    }
}

/// Field decoders that never fail on unexpected shapes.
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn scalar(value: &Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub(super) fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::Array(items) => {
                let parts: Vec<String> = items.iter().filter_map(scalar).collect();
                if parts.is_empty() {
                    None
                } else {
                    Some(parts.join(", "))
                }
            }
            other => scalar(&other),
        })
    }

    pub(super) fn list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::Array(items) => items.iter().filter_map(scalar).collect(),
            other => scalar(&other).into_iter().collect(),
        })
    }
}
