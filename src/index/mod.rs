//! The search index data model: keys, entries, links, and label entities.

pub mod entities;
pub mod key;
pub mod model;

pub use key::{KeyError, SearchKey, query_id, search_id};
pub use model::{DEFAULT_VAR_NAME, SearchEntry, SearchLink, SearchTable};
pub(crate) use model::initial_of;
