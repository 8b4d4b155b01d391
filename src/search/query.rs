//! Query execution against a loaded catalog.

use super::scoring::{CONTAINS, calculate_relevance, calculate_word_relevance};
use super::tokenize::tokenize_and_stem;
use crate::catalog::Catalog;
use crate::codec::Section;
use crate::error::SearchError;
use crate::index::{SearchEntry, query_id};
use ahash::AHashSet;
use rapidfuzz::distance::jaro_winkler;
use rmcp::schemars;
use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};

/// Maximum number of "did you mean" suggestions.
const MAX_SUGGESTIONS: usize = 5;

/// How query text is compared with entries.
///
/// DO NOT add doc comments to individual variants - schemars would turn the
/// enum into a `oneOf` and MCP clients would lose the dropdown.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    schemars::JsonSchema,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    #[default]
    Prefix,
    Substring,
    Words,
}

/// A search request against one section of a catalog.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub text: String,
    pub mode: MatchMode,
    /// Section name; `None` selects `all` or the first section
    pub section: Option<String>,
    pub limit: usize,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            mode: MatchMode::default(),
            section: None,
            limit: 10,
        }
    }

    #[must_use]
    pub const fn with_mode(mut self, mode: MatchMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn in_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// A matching entry with its relevance.
#[derive(Debug, Clone, Copy)]
pub struct SearchHit<'a> {
    pub entry: &'a SearchEntry,
    pub score: u32,
}

/// A display name similar to a query that matched nothing.
#[derive(Debug, Clone, Copy)]
pub struct Suggestion<'a> {
    pub name: &'a str,
    /// Jaro-Winkler similarity, 0.0 to 1.0
    pub score: f64,
}

#[derive(Debug, Clone)]
pub struct SearchResults<'a> {
    pub section: &'a Section,
    /// Best hits first, at most `limit`
    pub hits: Vec<SearchHit<'a>>,
    /// Number of matching entries before the limit was applied
    pub total: usize,
    /// Only filled when nothing matched
    pub suggestions: Vec<Suggestion<'a>>,
}

impl SearchResults<'_> {
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

fn resolve_section<'a>(catalog: &'a Catalog, name: Option<&str>) -> Result<&'a Section, SearchError> {
    match name {
        Some(name) => catalog
            .section(name)
            .ok_or_else(|| SearchError::UnknownSection {
                name: name.to_string(),
                available: catalog.sections().names().map(str::to_string).collect(),
            }),
        None => catalog.default_section().ok_or(SearchError::NoSections),
    }
}

/// Runs a query the way the documentation search field does, plus the extra modes.
///
/// - `Prefix`: the query, normalized like keys, must start the entry's search id
/// - `Substring`: the normalized query may start at any character of the search id
/// - `Words`: every stemmed query word must match a word of the display name
///
/// Query text is trimmed first. Hits are ordered by score; equal scores keep file order.
pub fn search<'a>(
    catalog: &'a Catalog,
    query: &SearchQuery,
    suggestion_threshold: f64,
) -> Result<SearchResults<'a>, SearchError> {
    let section = resolve_section(catalog, query.section.as_deref())?;
    let text = query.text.trim();
    if text.is_empty() {
        return Ok(SearchResults {
            section,
            hits: vec![],
            total: 0,
            suggestions: vec![],
        });
    }

    let mut hits: Vec<SearchHit<'a>> = match query.mode {
        MatchMode::Prefix | MatchMode::Substring => {
            let id = query_id(text);
            catalog
                .entries(section)
                .filter_map(|entry| {
                    let score = calculate_relevance(entry.key.id(), &id)?;
                    (query.mode == MatchMode::Substring || score > CONTAINS)
                        .then_some(SearchHit { entry, score })
                })
                .collect()
        }
        MatchMode::Words => {
            let stemmer = Stemmer::create(Algorithm::English);
            let query_words = tokenize_and_stem(text, &stemmer);
            catalog
                .entries(section)
                .filter_map(|entry| {
                    let name_words = tokenize_and_stem(&entry.display_name, &stemmer);
                    calculate_word_relevance(&name_words, &query_words)
                        .map(|score| SearchHit { entry, score })
                })
                .collect()
        }
    };

    // Stable sort keeps file order among equal scores
    hits.sort_by(|a, b| b.score.cmp(&a.score));
    let total = hits.len();
    hits.truncate(query.limit);

    let suggestions = if hits.is_empty() {
        suggest(catalog, section, text, suggestion_threshold)
    } else {
        vec![]
    };

    tracing::debug!(
        "Query '{}' ({:?}) in section '{}': {} hits, {} suggestions",
        text,
        query.mode,
        section.name,
        total,
        suggestions.len()
    );

    Ok(SearchResults {
        section,
        hits,
        total,
        suggestions,
    })
}

/// Display names similar to `text`, best first.
fn suggest<'a>(
    catalog: &'a Catalog,
    section: &'a Section,
    text: &str,
    threshold: f64,
) -> Vec<Suggestion<'a>> {
    let needle = text.to_lowercase();
    let mut seen = AHashSet::new();

    let mut suggestions: Vec<_> = catalog
        .entries(section)
        .filter(|entry| seen.insert(entry.display_name.as_str()))
        .filter_map(|entry| {
            let score = jaro_winkler::similarity(
                needle.chars(),
                entry.display_name.to_lowercase().chars(),
            );
            (score > threshold).then_some(Suggestion {
                name: &entry.display_name,
                score,
            })
        })
        .collect();

    suggestions.sort_by(|a, b| b.score.total_cmp(&a.score));
    suggestions.truncate(MAX_SUGGESTIONS);
    suggestions
}
