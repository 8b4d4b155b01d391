//! Search indexes of generated HTML documentation.
//!
//! A search directory holds `searchdata.js` (the section metadata) and one
//! `{section}_{n}.js` table per leading letter. This crate reads, writes,
//! builds, validates, and queries those files, and serves the queries over MCP.

pub mod build;
pub mod cache;
pub mod catalog;
pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod index;
pub mod search;
pub mod server;
pub mod state;
pub mod tools;
pub mod tracing;
pub mod validate;

pub use build::{IndexBuilder, SearchBundle, Symbol, SymbolKind};
pub use catalog::Catalog;
pub use config::Config;
pub use error::{CatalogError, CodecError, Result, SearchError};
pub use index::{SearchEntry, SearchKey, SearchLink, SearchTable, query_id, search_id};
pub use search::{MatchMode, SearchQuery, SearchResults};
pub use server::SearchServer;
pub use state::IndexState;
pub use validate::{ValidationReport, Violation, validate_catalog, validate_table};
