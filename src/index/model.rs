//! Search table data model.

use super::entities;
use super::key::SearchKey;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Variable name the generator assigns every table to.
pub const DEFAULT_VAR_NAME: &str = "searchData";

/// One hyperlink of a search entry: `[url, relevance, label]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchLink {
    /// Page URL relative to the search directory, with optional `#anchor`
    pub url: String,
    /// `1` for pages of this documentation set, `0` for tag-file links
    pub relevance: u32,
    /// Label exactly as written, HTML entities included
    pub label: String,
}

impl SearchLink {
    pub fn new(url: impl Into<String>, relevance: u32, label: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            relevance,
            label: label.into(),
        }
    }

    /// Whether the widget opens this link in the documentation frame.
    pub const fn is_local(&self) -> bool {
        self.relevance != 0
    }

    /// The label with HTML entities decoded.
    pub fn display_label(&self) -> Cow<'_, str> {
        entities::decode(&self.label)
    }

    /// Page part of the URL, without the anchor.
    pub fn page(&self) -> &str {
        self.url.split_once('#').map_or(self.url.as_str(), |(page, _)| page)
    }

    pub fn anchor(&self) -> Option<&str> {
        self.url.split_once('#').map(|(_, anchor)| anchor)
    }
}

/// One row of a search table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchEntry {
    pub key: SearchKey,
    pub display_name: String,
    pub links: Vec<SearchLink>,
}

impl SearchEntry {
    pub fn new(key: SearchKey, display_name: impl Into<String>, links: Vec<SearchLink>) -> Self {
        Self {
            key,
            display_name: display_name.into(),
            links,
        }
    }

    /// First character of the display name, lowercased. Selects the letter file.
    pub fn initial(&self) -> Option<char> {
        initial_of(&self.display_name)
    }
}

/// Lowercased first character of a name.
pub(crate) fn initial_of(name: &str) -> Option<char> {
    name.chars().next().and_then(|c| c.to_lowercase().next())
}

/// A whole table file: `var searchData=[...];`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchTable {
    pub var_name: String,
    pub entries: Vec<SearchEntry>,
}

impl Default for SearchTable {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl SearchTable {
    pub fn new(entries: Vec<SearchEntry>) -> Self {
        Self {
            var_name: DEFAULT_VAR_NAME.to_string(),
            entries,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Finds the first entry with exactly this display name.
    pub fn find(&self, display_name: &str) -> Option<&SearchEntry> {
        self.find_all(display_name).next()
    }

    /// Every entry with exactly this display name. Hand-edited tables may repeat one.
    pub fn find_all<'a>(&'a self, display_name: &str) -> impl Iterator<Item = &'a SearchEntry> {
        self.entries.iter().filter(move |e| e.display_name == display_name)
    }

    /// Total number of links across all entries.
    pub fn link_count(&self) -> usize {
        self.entries.iter().map(|e| e.links.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    #[test]
    fn test_link_parts() {
        let link = SearchLink::new(
            "../classnexus_1_1quic_1_1stream.html#a6319d8ab5a8c1fc0c976333fe58964ef",
            1,
            "nexus::quic::stream",
        );
        check!(link.page() == "../classnexus_1_1quic_1_1stream.html");
        check!(link.anchor() == Some("a6319d8ab5a8c1fc0c976333fe58964ef"));
        check!(link.is_local());

        let class_link = SearchLink::new("../classnexus_1_1h3_1_1acceptor.html", 0, "x");
        check!(class_link.anchor().is_none());
        check!(!class_link.is_local());
    }

    #[test]
    fn test_display_label_decodes() {
        let link = SearchLink::new(
            "../x.html",
            1,
            "nexus::quic::acceptor::accept(connection &amp;conn)",
        );
        check!(link.display_label() == "nexus::quic::acceptor::accept(connection &conn)");
    }

    #[test]
    fn test_initial() {
        let entry = SearchEntry::new(SearchKey::new("Acceptor", 2), "Acceptor", vec![]);
        check!(entry.initial() == Some('a'));
        check!(initial_of("") == None);
    }
}
