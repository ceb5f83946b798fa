//! Query construction for the advanced search endpoint.
//!
//! Selected facets are folded into the `q` parameter: values of one facet are
//! OR-ed, distinct facets are AND-ed with the keyword.

use std::collections::BTreeMap;

use crate::result_types::{FacetConfig, TypeCriteria};
use crate::types::SelectedFacet;

/// Fields requested for every document (`fl[]`).
pub const DOCUMENT_FIELDS: &[&str] = &[
    "identifier",
    "title",
    "description",
    "format",
    "genre",
    "downloads",
    "mediatype",
];

/// Query matching every document.
const MATCH_ALL: &str = "*:*";

/// A fully specified backend request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    /// 1-based page number.
    pub page: usize,
    pub rows: usize,
    pub sort: Option<String>,
    pub fields: Vec<String>,
    pub facets: Vec<FacetConfig>,
}

impl SearchRequest {
    /// A first-page request for `query` with the default document fields.
    pub fn new(query: String, rows: usize) -> Self {
        Self {
            query,
            page: 1,
            rows,
            sort: None,
            fields: DOCUMENT_FIELDS.iter().map(|f| (*f).to_string()).collect(),
            facets: Vec::new(),
        }
    }

    /// Encode as query-string pairs for `advancedsearch.php`.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("q".to_string(), self.query.clone())];
        for field in &self.fields {
            params.push(("fl[]".to_string(), field.clone()));
        }
        params.push(("rows".to_string(), self.rows.to_string()));
        params.push(("page".to_string(), self.page.to_string()));
        params.push(("output".to_string(), "json".to_string()));
        if let Some(ref sort) = self.sort {
            params.push(("sort[]".to_string(), sort.clone()));
        }
        if !self.facets.is_empty() {
            params.push(("facet".to_string(), "true".to_string()));
            params.push(("facet.mincount".to_string(), "1".to_string()));
            for facet in &self.facets {
                params.push(("facet.field".to_string(), facet.field.clone()));
                params.push((
                    format!("f.{}.facet.limit", facet.field),
                    facet.limit.to_string(),
                ));
            }
        }
        params
    }
}

/// Build the `q` parameter from a keyword, selected facets and category criteria.
pub fn build_query(keyword: &str, selected: &[SelectedFacet], criteria: &[TypeCriteria]) -> String {
    let keyword = keyword.trim();
    let mut clauses: Vec<String> = Vec::new();
    if !keyword.is_empty() {
        clauses.push(keyword.to_string());
    }

    for criterion in criteria {
        if let Some(clause) = field_clause(&criterion.field, criterion.values.iter()) {
            clauses.push(clause);
        }
    }

    let mut grouped: BTreeMap<&str, Vec<&String>> = BTreeMap::new();
    for facet in selected {
        grouped.entry(facet.name.as_str()).or_default().push(&facet.value);
    }
    for (name, values) in grouped {
        if let Some(clause) = field_clause(name, values.into_iter()) {
            clauses.push(clause);
        }
    }

    if clauses.is_empty() {
        MATCH_ALL.to_string()
    } else {
        clauses.join(" AND ")
    }
}

/// Title-prefix query used for suggestions, e.g. `title:(beeth*)`.
pub fn build_suggestion_query(input: &str) -> String {
    let terms: Vec<String> = input
        .split_whitespace()
        .map(escape_term)
        .filter(|t| !t.is_empty())
        .collect();
    match terms.split_last() {
        None => MATCH_ALL.to_string(),
        Some((last, rest)) => {
            let mut parts: Vec<String> = rest.to_vec();
            parts.push(format!("{last}*"));
            format!("title:({})", parts.join(" "))
        }
    }
}

fn field_clause<'a>(field: &str, values: impl Iterator<Item = &'a String>) -> Option<String> {
    let quoted: Vec<String> = values
        .filter(|v| !v.trim().is_empty())
        .map(|v| format!("\"{}\"", escape_phrase(v)))
        .collect();
    if quoted.is_empty() {
        None
    } else {
        Some(format!("{field}:({})", quoted.join(" OR ")))
    }
}

fn escape_phrase(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Escape Lucene syntax characters in a bare term.
fn escape_term(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(
            c,
            '+' | '-' | '!' | '(' | ')' | '{' | '}' | '[' | ']' | '^' | '"' | '~' | '*' | '?'
                | ':' | '\\' | '/' | '&' | '|'
        ) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
