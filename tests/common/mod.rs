//! Shared test fixtures and utilities for integration tests.
//!
//! # Test Isolation Strategy
//!
//! Each test that touches the filesystem gets its own temporary search
//! directory and its own `IndexState` (empty LRU cache, disk cache disabled
//! unless the test asks for one), so tests can run in parallel.
//!
//! # Available Fixtures
//!
//! - `nexus_index`: a search directory holding the nexus `all_0.js` table
//! - `built_index`: a directory generated from [`nexus_symbols`], with `searchdata.js`

use doxysearch_mcp::build::{IndexBuilder, Symbol, SymbolKind};
use doxysearch_mcp::{Config, IndexState};
use rstest::fixture;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Returns the project root directory (where Cargo.toml lives).
pub fn project_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

/// The nexus search directory shipped with the tests.
pub fn nexus_fixture_dir() -> PathBuf {
    project_root().join("tests/fixtures/nexus")
}

/// Contents of the nexus `all_0.js`.
pub fn nexus_table_text() -> String {
    std::fs::read_to_string(nexus_fixture_dir().join("all_0.js"))
        .expect("Failed to read nexus fixture")
}

/// A temporary search directory with its own state.
#[allow(dead_code)] // Fields used across different integration test crates
pub struct IsolatedIndex {
    _temp: TempDir,
    root: PathBuf,
    pub state: Arc<IndexState>,
}

#[allow(dead_code)] // Methods used across different integration test crates
impl IsolatedIndex {
    /// Creates an empty directory; the state's default search dir points at it.
    pub fn empty() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let root = temp.path().to_path_buf();
        let config = Config {
            search_dir: Some(root.clone()),
            cache_enabled: false,
            ..Config::default()
        };
        Self {
            _temp: temp,
            root,
            state: Arc::new(IndexState::new(config)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Directory argument for tool requests.
    pub fn directory(&self) -> Option<String> {
        Some(self.root.display().to_string())
    }

    /// Writes a file into the search directory.
    ///
    /// # Panics
    /// Panics if the write fails.
    pub fn create_file(&self, name: &str, content: &str) {
        std::fs::write(self.root.join(name), content)
            .unwrap_or_else(|e| panic!("Failed to write file '{}': {}", name, e));
    }

    /// Copies a file into the search directory.
    pub fn copy_file(&self, source: &Path, name: &str) {
        std::fs::copy(source, self.root.join(name)).unwrap_or_else(|e| {
            panic!("Failed to copy '{}' to '{}': {}", source.display(), name, e)
        });
    }
}

/// Symbols of a small slice of the nexus library, across several kinds.
pub fn nexus_symbols() -> Vec<Symbol> {
    let stream = "classnexus_1_1quic_1_1stream.html";
    let connection = "classnexus_1_1quic_1_1connection.html";
    vec![
        Symbol::new("nexus", SymbolKind::Namespace, "namespacenexus.html"),
        Symbol::new("quic", SymbolKind::Namespace, "namespacenexus_1_1quic.html").in_scope("nexus"),
        Symbol::new("stream", SymbolKind::Class, stream).in_scope("nexus::quic"),
        Symbol::new("connection", SymbolKind::Class, connection).in_scope("nexus::quic"),
        Symbol::new("async_read_some", SymbolKind::Function, format!("{stream}#af78"))
            .in_scope("nexus::quic::stream"),
        Symbol::new("async_write_some", SymbolKind::Function, format!("{stream}#ab16"))
            .in_scope("nexus::quic::stream"),
        Symbol::new("accept", SymbolKind::Function, format!("{connection}#af7d"))
            .in_scope("nexus::quic::connection")
            .with_args("(stream &s, error_code &ec)"),
        Symbol::new("accept", SymbolKind::Function, format!("{connection}#a0ef"))
            .in_scope("nexus::quic::connection")
            .with_args("(stream &s)"),
        Symbol::new("error_code", SymbolKind::Typedef, "https://en.cppreference.com/w/cpp/error/error_code")
            .in_scope("std")
            .external(),
    ]
}

/// Creates an isolated index holding the nexus `all_0.js` (no `searchdata.js`).
#[fixture]
pub fn nexus_index() -> IsolatedIndex {
    let index = IsolatedIndex::empty();
    index.copy_file(&nexus_fixture_dir().join("all_0.js"), "all_0.js");
    index
}

/// Creates an isolated index generated from [`nexus_symbols`].
#[fixture]
pub fn built_index() -> IsolatedIndex {
    let index = IsolatedIndex::empty();
    let mut builder = IndexBuilder::new();
    for symbol in nexus_symbols() {
        builder.add(symbol);
    }
    builder
        .build()
        .write_to(index.path())
        .expect("Failed to write search directory");
    index
}
