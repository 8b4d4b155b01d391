//! Deterministic generation of a search directory from documented symbols.
//!
//! Every symbol lands in `all` and in the section of its kind. Within a
//! section, symbols sharing a display name become one entry; entries are
//! sorted by search id and split into one table per leading letter, with
//! counters restarting at zero in each table.

pub mod symbol;

pub use symbol::{ALL_SECTION, KNOWN_SECTIONS, Symbol, SymbolKind, section_label};

use crate::catalog::Catalog;
use crate::codec::{SECTIONS_FILE, Section, SectionIndex, emit_sections, emit_table};
use crate::error::Result;
use crate::index::{SearchEntry, SearchKey, SearchLink, SearchTable, entities, initial_of, search_id};
use anyhow::Context;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Prefix that makes documentation-root URLs relative to the search directory.
pub const DEFAULT_URL_PREFIX: &str = "../";

/// Accumulates symbols and produces a [`SearchBundle`].
#[derive(Debug, Clone)]
pub struct IndexBuilder {
    symbols: Vec<Symbol>,
    url_prefix: String,
}

impl Default for IndexBuilder {
    fn default() -> Self {
        Self {
            symbols: Vec::new(),
            url_prefix: DEFAULT_URL_PREFIX.to_string(),
        }
    }
}

impl IndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_url_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.url_prefix = prefix.into();
        self
    }

    pub fn add(&mut self, symbol: Symbol) -> &mut Self {
        self.symbols.push(symbol);
        self
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Reads a JSON array of symbols.
    pub fn from_json(json: &str) -> Result<Self> {
        let symbols: Vec<Symbol> = serde_json::from_str(json).context("Failed to parse symbol list")?;
        Ok(Self {
            symbols,
            ..Self::default()
        })
    }

    fn link_url(&self, url: &str) -> String {
        if url.contains("://") || url.starts_with('/') {
            url.to_string()
        } else {
            format!("{}{}", self.url_prefix, url)
        }
    }

    /// Builds every section and table. Equal input yields equal output.
    pub fn build(&self) -> SearchBundle {
        let start = std::time::Instant::now();

        // section name -> symbols in insertion order
        let mut by_section: BTreeMap<(usize, &str), Vec<&Symbol>> = BTreeMap::new();
        for symbol in &self.symbols {
            by_section
                .entry((0, ALL_SECTION))
                .or_default()
                .push(symbol);
            let section = symbol.kind.section();
            by_section
                .entry((symbol::section_rank(section), section))
                .or_default()
                .push(symbol);
        }

        let mut sections = Vec::new();
        let mut tables = BTreeMap::new();

        for (id, ((_, name), symbols)) in by_section.into_iter().enumerate() {
            let mut letters = Vec::new();
            for (letter, groups) in group_by_letter(&symbols) {
                let n = letters.len();
                letters.push(letter);

                let entries = groups
                    .into_iter()
                    .enumerate()
                    .map(|(counter, (display_name, group))| {
                        let counter = u32::try_from(counter).unwrap_or(u32::MAX);
                        self.entry(display_name, counter, &group)
                    })
                    .collect();
                tables.insert(format!("{}_{}.js", name, n), SearchTable::new(entries));
            }

            sections.push(Section {
                id: u32::try_from(id).unwrap_or(u32::MAX),
                name: name.to_string(),
                label: section_label(name),
                letters,
            });
        }

        tracing::info!(
            "Built search index: {} symbols, {} sections, {} tables in {:?}",
            self.symbols.len(),
            sections.len(),
            tables.len(),
            start.elapsed()
        );

        SearchBundle {
            sections: SectionIndex { sections },
            tables,
        }
    }

    fn entry(&self, display_name: &str, counter: u32, group: &[&Symbol]) -> SearchEntry {
        let links = group
            .iter()
            .map(|symbol| {
                let label = if group.len() == 1 {
                    entities::encode(symbol.single_label()).into_owned()
                } else {
                    entities::encode(&symbol.overload_label()).into_owned()
                };
                SearchLink {
                    url: self.link_url(&symbol.url),
                    relevance: u32::from(!symbol.external),
                    label,
                }
            })
            .collect();

        SearchEntry {
            key: SearchKey::new(display_name, counter),
            display_name: display_name.to_string(),
            links,
        }
    }
}

type Group<'a> = (&'a str, Vec<&'a Symbol>);

/// Groups symbols by display name, sorted by (search id, name), then splits by leading letter.
fn group_by_letter<'a>(symbols: &[&'a Symbol]) -> BTreeMap<char, Vec<Group<'a>>> {
    let mut by_name: BTreeMap<(String, &'a str), Vec<&'a Symbol>> = BTreeMap::new();
    for &symbol in symbols {
        if symbol.name.is_empty() {
            tracing::warn!("Skipping symbol with empty name (url: {})", symbol.url);
            continue;
        }
        by_name
            .entry((search_id(&symbol.name), symbol.name.as_str()))
            .or_default()
            .push(symbol);
    }

    let mut by_letter: BTreeMap<char, Vec<Group<'a>>> = BTreeMap::new();
    for ((_, name), group) in by_name {
        if let Some(letter) = initial_of(name) {
            by_letter.entry(letter).or_default().push((name, group));
        }
    }
    by_letter
}

/// The generated search directory: section metadata plus every table file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchBundle {
    pub sections: SectionIndex,
    /// File name -> table
    pub tables: BTreeMap<String, SearchTable>,
}

impl SearchBundle {
    /// Every file of the directory with its contents, `searchdata.js` first.
    pub fn files(&self) -> Vec<(String, String)> {
        let mut files = Vec::with_capacity(self.tables.len() + 1);
        files.push((SECTIONS_FILE.to_string(), emit_sections(&self.sections)));
        files.extend(
            self.tables
                .iter()
                .map(|(name, table)| (name.clone(), emit_table(table))),
        );
        files
    }

    /// Writes all files into `dir`, creating it if needed.
    pub fn write_to(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;

        for (name, contents) in self.files() {
            let path = dir.join(&name);
            std::fs::write(&path, contents)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        tracing::debug!("Wrote {} table files to {}", self.tables.len(), dir.display());
        Ok(())
    }

    /// Turns the bundle into an in-memory catalog rooted at `root`.
    pub fn into_catalog(self, root: impl Into<PathBuf>) -> Catalog {
        Catalog::from_parts(root.into(), self.sections, self.tables)
    }
}
