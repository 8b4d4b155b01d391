//! A documentation set's `search/` directory, fully parsed.

use crate::build::symbol::{section_label, section_rank};
use crate::codec::{SECTIONS_FILE, Section, SectionIndex, parse_sections, parse_table};
use crate::error::CatalogError;
use crate::index::{SearchEntry, SearchTable};
use ignore::WalkBuilder;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Table file names: `{section}_{n}.js`.
static TABLE_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-z]+)_(\d+)\.js$").expect("static regex"));

/// Parsed section metadata and every table of one search directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    root: PathBuf,
    sections: SectionIndex,
    /// Table file name -> table
    tables: BTreeMap<String, SearchTable>,
}

impl Catalog {
    pub fn from_parts(
        root: PathBuf,
        sections: SectionIndex,
        tables: BTreeMap<String, SearchTable>,
    ) -> Self {
        Self {
            root,
            sections,
            tables,
        }
    }

    /// Loads a search directory.
    ///
    /// With `searchdata.js` present every table it lists must exist. Without it,
    /// tables are discovered by file name and the section metadata is inferred.
    pub fn load(dir: &Path) -> Result<Self, CatalogError> {
        let start = std::time::Instant::now();
        if !dir.is_dir() {
            return Err(CatalogError::NotFound {
                path: dir.to_path_buf(),
            });
        }

        let sections_path = dir.join(SECTIONS_FILE);
        let catalog = if sections_path.is_file() {
            Self::load_declared(dir, &sections_path)?
        } else {
            tracing::debug!(
                "No {} in {}, discovering table files",
                SECTIONS_FILE,
                dir.display()
            );
            Self::load_discovered(dir)?
        };

        tracing::info!(
            "Loaded search index from {}: {} sections, {} tables, {} entries in {:?}",
            dir.display(),
            catalog.sections.sections.len(),
            catalog.tables.len(),
            catalog.entry_count(),
            start.elapsed()
        );
        Ok(catalog)
    }

    fn load_declared(dir: &Path, sections_path: &Path) -> Result<Self, CatalogError> {
        let text = read(sections_path)?;
        let sections = parse_sections(&text).map_err(|e| CatalogError::parse(sections_path, e))?;

        let mut tables = BTreeMap::new();
        for section in &sections.sections {
            for (_, file) in section.table_files() {
                let path = dir.join(&file);
                if !path.is_file() {
                    return Err(CatalogError::MissingTable {
                        section: section.name.clone(),
                        path,
                    });
                }
                tables.insert(file, load_table(&path)?);
            }
        }

        Ok(Self::from_parts(dir.to_path_buf(), sections, tables))
    }

    fn load_discovered(dir: &Path) -> Result<Self, CatalogError> {
        // section name -> table number -> file name
        let mut found: BTreeMap<String, BTreeMap<usize, String>> = BTreeMap::new();

        let walker = WalkBuilder::new(dir)
            .max_depth(Some(1))
            .standard_filters(false)
            .build();
        for entry in walker {
            let entry = entry.map_err(|e| {
                CatalogError::io(
                    dir,
                    e.into_io_error()
                        .unwrap_or_else(|| std::io::Error::other("directory walk failed")),
                )
            })?;
            let Some(name) = entry.file_name().to_str() else {
                continue;
            };
            if let Some(caps) = TABLE_FILE.captures(name)
                && let Ok(n) = caps[2].parse::<usize>()
            {
                found
                    .entry(caps[1].to_string())
                    .or_default()
                    .insert(n, name.to_string());
            }
        }

        if found.is_empty() {
            return Err(CatalogError::NotFound {
                path: dir.to_path_buf(),
            });
        }

        let mut names: Vec<_> = found.keys().cloned().collect();
        names.sort_by_key(|name| (section_rank(name), name.clone()));

        let mut sections = Vec::with_capacity(names.len());
        let mut tables = BTreeMap::new();
        for (id, name) in names.into_iter().enumerate() {
            let files = found.remove(&name).unwrap_or_default();
            let mut letters = Vec::with_capacity(files.len());

            for (expected, (n, file)) in files.into_iter().enumerate() {
                if n != expected {
                    return Err(CatalogError::MissingTable {
                        section: name,
                        path: dir.join(format!("{}_{}.js", name_stem(&file), expected)),
                    });
                }
                let table = load_table(&dir.join(&file))?;
                letters.push(table.entries.first().and_then(SearchEntry::initial).unwrap_or('?'));
                tables.insert(file, table);
            }

            sections.push(Section {
                id: u32::try_from(id).unwrap_or(u32::MAX),
                label: section_label(&name),
                name,
                letters,
            });
        }

        Ok(Self::from_parts(
            dir.to_path_buf(),
            SectionIndex { sections },
            tables,
        ))
    }

    /// Directory the catalog was loaded from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn sections(&self) -> &SectionIndex {
        &self.sections
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.get(name)
    }

    /// `all` when present, otherwise the first declared section.
    pub fn default_section(&self) -> Option<&Section> {
        self.section(crate::build::ALL_SECTION)
            .or_else(|| self.sections.sections.first())
    }

    /// Table by file name, e.g. `all_0.js`.
    pub fn table(&self, file: &str) -> Option<&SearchTable> {
        self.tables.get(file)
    }

    /// Tables of a section with their letters, in letter order.
    pub fn tables_in<'a>(
        &'a self,
        section: &'a Section,
    ) -> impl Iterator<Item = (char, &'a SearchTable)> + 'a {
        section
            .table_files()
            .filter_map(move |(letter, file)| self.tables.get(&file).map(|t| (letter, t)))
    }

    /// Every entry of a section, in file order.
    pub fn entries<'a>(&'a self, section: &'a Section) -> impl Iterator<Item = &'a SearchEntry> + 'a {
        self.tables_in(section).flat_map(|(_, table)| table.entries.iter())
    }

    /// Number of entries in the default section.
    pub fn entry_count(&self) -> usize {
        self.default_section()
            .map_or(0, |section| self.entries(section).count())
    }
}

fn name_stem(file: &str) -> &str {
    file.rsplit_once('_').map_or(file, |(stem, _)| stem)
}

fn read(path: &Path) -> Result<String, CatalogError> {
    std::fs::read_to_string(path).map_err(|e| CatalogError::io(path, e))
}

fn load_table(path: &Path) -> Result<SearchTable, CatalogError> {
    let text = read(path)?;
    parse_table(&text).map_err(|e| CatalogError::parse(path, e))
}
