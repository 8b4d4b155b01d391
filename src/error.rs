//! Error handling types and utilities.

use crate::index::KeyError;
use std::path::PathBuf;

/// A specialized Result type for doxysearch-mcp operations.
///
/// This is an alias for `anyhow::Result` with context added via `.context()` and
/// `.with_context()` methods at the application edges (CLI, tools, state).
pub type Result<T> = anyhow::Result<T>;

/// Error returned when a search file cannot be read as a table or section index.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// The text is not valid for the literal subset search files use.
    #[error("line {line}, column {column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },
    /// Input ended while more tokens were required.
    #[error("unexpected end of input, expected {0}")]
    UnexpectedEof(String),
    /// The file parsed but does not declare the required variable.
    #[error("missing variable '{0}'")]
    MissingVariable(String),
    /// A table row has the wrong structure.
    #[error("entry {index}: {message}")]
    Shape { index: usize, message: String },
    /// A table row's key has no valid counter suffix.
    #[error("entry {index}: {source}")]
    Key {
        index: usize,
        #[source]
        source: KeyError,
    },
    /// Section metadata is inconsistent.
    #[error("section {id}: {message}")]
    Section { id: String, message: String },
}

/// Error returned when loading a search directory fails.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The directory does not exist or holds no search files.
    #[error("no search index found in {}", path.display())]
    NotFound { path: PathBuf },
    /// Reading a file failed.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A file could not be parsed.
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: CodecError,
    },
    /// The section metadata names a table file that does not exist.
    #[error("section '{section}' lists table {} which does not exist", path.display())]
    MissingTable { section: String, path: PathBuf },
}

/// Error returned when a query cannot run against a catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    #[error("unknown section '{name}' (available: {})", available.join(", "))]
    UnknownSection {
        name: String,
        available: Vec<String>,
    },
    #[error("search index has no sections")]
    NoSections,
}

impl CatalogError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, source: CodecError) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }
}
