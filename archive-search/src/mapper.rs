//! Mapping from archive.org documents to [`ResultEntry`] values.

use crate::types::{Highlighting, RawDocument, ResultEntry, SubAttribute};

/// Base of the public detail page for an item.
pub const DETAILS_BASE_URL: &str = "http://archive.org/details/";

/// Turns backend documents into result entries.
///
/// Implementations must keep one entry per document, in input order.
pub type DocumentMapper = fn(&[RawDocument], &Highlighting) -> Vec<ResultEntry>;

/// Map archive.org documents to result entries.
///
/// Every entry carries three sub-attributes in fixed order: genre, downloads,
/// mediatype. Missing fields become empty strings. Highlighting is not used.
pub fn map_archive_documents(docs: &[RawDocument], _highlights: &Highlighting) -> Vec<ResultEntry> {
    docs.iter().map(map_document).collect()
}

fn map_document(doc: &RawDocument) -> ResultEntry {
    ResultEntry {
        title: text(&doc.title),
        id: text(&doc.identifier),
        description: text(&doc.description),
        tags: doc.format.clone(),
        sub_titles: vec![
            sub_attribute("genre", &doc.genre, "category"),
            sub_attribute("downloads", &doc.downloads, "download"),
            sub_attribute("mediatype", &doc.mediatype, "play_lesson"),
        ],
    }
}

fn sub_attribute(name: &str, value: &Option<String>, icon: &str) -> SubAttribute {
    SubAttribute {
        name: name.to_string(),
        description: text(value),
        icon: icon.to_string(),
    }
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

/// Public detail page of the item with `id`.
pub fn details_link(id: &str) -> String {
    format!("{DETAILS_BASE_URL}{id}")
}
