//! Lookup over loaded catalogs.
//!
//! `Prefix` mode reproduces the documentation search field; `Substring` and
//! `Words` are looser modes built on the same scoring.

pub(crate) mod query;
pub(crate) mod scoring;
pub(crate) mod tokenize;

pub use query::{MatchMode, SearchHit, SearchQuery, SearchResults, Suggestion, search};
pub use scoring::{CONTAINS, EXACT, PREFIX, calculate_relevance};
