//! Structural checks for search tables.
//!
//! Errors break lookups (a key the widget can never match, a link to nowhere);
//! warnings mark tables that still work but were not written the way the
//! generator writes them.

use crate::catalog::Catalog;
use crate::index::{SearchTable, initial_of, search_id};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    EmptyKey {
        entry: usize,
    },
    KeyMismatch {
        entry: usize,
        key: String,
        expected: String,
    },
    EmptyUrl {
        entry: usize,
        link: usize,
    },
    DuplicateKey {
        entry: usize,
        first: usize,
        key: String,
    },
    NoLinks {
        entry: usize,
    },
    CounterOutOfSequence {
        entry: usize,
        expected: u32,
        found: u32,
    },
    Unsorted {
        entry: usize,
    },
    /// Catalog level: a letter is listed for a section but its table has no entry starting with it.
    EmptyLetter {
        section: String,
        letter: char,
    },
    /// Catalog level: an entry sits in the table of a different letter.
    MisplacedEntry {
        file: String,
        entry: usize,
        letter: char,
    },
}

impl Violation {
    pub const fn severity(&self) -> Severity {
        match self {
            Self::EmptyKey { .. }
            | Self::KeyMismatch { .. }
            | Self::EmptyUrl { .. }
            | Self::DuplicateKey { .. }
            | Self::NoLinks { .. }
            | Self::MisplacedEntry { .. } => Severity::Error,
            Self::CounterOutOfSequence { .. } | Self::Unsorted { .. } | Self::EmptyLetter { .. } => {
                Severity::Warning
            }
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyKey { entry } => write!(f, "entry {}: key has an empty id", entry),
            Self::KeyMismatch {
                entry,
                key,
                expected,
            } => write!(
                f,
                "entry {}: key '{}' does not match display name (expected id '{}')",
                entry, key, expected
            ),
            Self::EmptyUrl { entry, link } => write!(f, "entry {}: link {} has an empty url", entry, link),
            Self::DuplicateKey { entry, first, key } => write!(
                f,
                "entry {}: key '{}' already used by entry {}",
                entry, key, first
            ),
            Self::NoLinks { entry } => write!(f, "entry {}: no links", entry),
            Self::CounterOutOfSequence {
                entry,
                expected,
                found,
            } => write!(
                f,
                "entry {}: counter {} out of sequence (expected {})",
                entry, found, expected
            ),
            Self::Unsorted { entry } => write!(f, "entry {}: not in search-id order", entry),
            Self::EmptyLetter { section, letter } => write!(
                f,
                "section '{}': letter {:?} is listed but has no entries",
                section, letter
            ),
            Self::MisplacedEntry {
                file,
                entry,
                letter,
            } => write!(
                f,
                "{}: entry {} does not start with {:?}",
                file, entry, letter
            ),
        }
    }
}

/// Violations found in one table file, or in a whole catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// `(file, violation)`; file is empty for single-table reports
    pub violations: Vec<(String, Violation)>,
    pub entries_checked: usize,
}

impl ValidationReport {
    /// True when no error-level violation was found.
    pub fn is_valid(&self) -> bool {
        self.error_count() == 0
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    fn count(&self, severity: Severity) -> usize {
        self.violations
            .iter()
            .filter(|(_, v)| v.severity() == severity)
            .count()
    }

    fn merge(&mut self, file: &str, other: Self) {
        self.entries_checked += other.entries_checked;
        self.violations.extend(
            other
                .violations
                .into_iter()
                .map(|(_, v)| (file.to_string(), v)),
        );
    }
}

/// Checks one table against the key, link, and ordering rules.
pub fn validate_table(table: &SearchTable) -> ValidationReport {
    let mut violations = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::with_capacity(table.entries.len());
    let mut previous_id: Option<&str> = None;

    for (i, entry) in table.entries.iter().enumerate() {
        let key = entry.key.to_string();

        if entry.key.id().is_empty() {
            violations.push(Violation::EmptyKey { entry: i });
        } else if !entry.key.matches(&entry.display_name) {
            violations.push(Violation::KeyMismatch {
                entry: i,
                key: key.clone(),
                expected: search_id(&entry.display_name),
            });
        }

        if let Some(&first) = seen.get(&key) {
            violations.push(Violation::DuplicateKey {
                entry: i,
                first,
                key: key.clone(),
            });
        } else {
            seen.insert(key, i);
        }

        if entry.links.is_empty() {
            violations.push(Violation::NoLinks { entry: i });
        }
        for (n, link) in entry.links.iter().enumerate() {
            if link.url.is_empty() {
                violations.push(Violation::EmptyUrl { entry: i, link: n });
            }
        }

        let expected = u32::try_from(i).unwrap_or(u32::MAX);
        if entry.key.counter() != expected {
            violations.push(Violation::CounterOutOfSequence {
                entry: i,
                expected,
                found: entry.key.counter(),
            });
        }

        let id = entry.key.id();
        if previous_id.is_some_and(|prev| prev > id) {
            violations.push(Violation::Unsorted { entry: i });
        }
        previous_id = Some(id);
    }

    ValidationReport {
        violations: violations.into_iter().map(|v| (String::new(), v)).collect(),
        entries_checked: table.entries.len(),
    }
}

/// Checks every table of a catalog, plus the letter layout of each section.
pub fn validate_catalog(catalog: &Catalog) -> ValidationReport {
    let mut report = ValidationReport::default();

    for section in &catalog.sections().sections {
        for (letter, file) in section.table_files() {
            let Some(table) = catalog.table(&file) else {
                continue;
            };
            report.merge(&file, validate_table(table));

            for (i, entry) in table.entries.iter().enumerate() {
                if initial_of(&entry.display_name) != Some(letter) {
                    report.violations.push((
                        file.clone(),
                        Violation::MisplacedEntry {
                            file: file.clone(),
                            entry: i,
                            letter,
                        },
                    ));
                }
            }
            if table.is_empty() {
                report.violations.push((
                    file.clone(),
                    Violation::EmptyLetter {
                        section: section.name.clone(),
                        letter,
                    },
                ));
            }
        }
    }

    tracing::debug!(
        "Validated {} entries: {} errors, {} warnings",
        report.entries_checked,
        report.error_count(),
        report.warning_count()
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{SearchEntry, SearchKey, SearchLink};
    use assert2::check;

    fn entry(name: &str, counter: u32) -> SearchEntry {
        SearchEntry::new(
            SearchKey::new(name, counter),
            name,
            vec![SearchLink::new("../a.html", 1, "ns")],
        )
    }

    #[test]
    fn test_clean_table_is_valid() {
        let table = SearchTable::new(vec![entry("accept", 0), entry("async_accept", 1), entry("at", 2)]);
        let report = validate_table(&table);
        check!(report.is_valid());
        check!(report.violations.is_empty());
        check!(report.entries_checked == 3);
    }

    #[test]
    fn test_key_mismatch_and_empty_key() {
        let mut bad = entry("async_accept", 0);
        bad.key = SearchKey::from_parts("async_accept", 0);
        let mut empty = entry("x", 1);
        empty.key = SearchKey::from_parts("", 1);

        let report = validate_table(&SearchTable::new(vec![bad, empty]));
        check!(!report.is_valid());
        check!(matches!(report.violations[0].1, Violation::KeyMismatch { entry: 0, ref expected, .. } if expected == "async_5faccept"));
        check!(report.violations.iter().any(|(_, v)| *v == Violation::EmptyKey { entry: 1 }));
    }

    #[test]
    fn test_duplicate_keys_and_counters() {
        let table = SearchTable::new(vec![entry("at", 0), entry("at", 0)]);
        let report = validate_table(&table);
        check!(report.violations.iter().any(|(_, v)| matches!(v, Violation::DuplicateKey { entry: 1, first: 0, .. })));
        check!(report.violations.iter().any(|(_, v)| matches!(v, Violation::CounterOutOfSequence { entry: 1, expected: 1, found: 0 })));
    }

    #[test]
    fn test_same_id_with_distinct_counters_is_valid() {
        // "At" and "at" share a search id; counters keep their keys apart
        let table = SearchTable::new(vec![entry("At", 0), entry("at", 1)]);
        check!(validate_table(&table).is_valid());
    }

    #[test]
    fn test_links_checked() {
        let mut no_links = entry("a", 0);
        no_links.links.clear();
        let mut empty_url = entry("b", 1);
        empty_url.links.push(SearchLink::new("", 1, "x"));

        let report = validate_table(&SearchTable::new(vec![no_links, empty_url]));
        check!(report.error_count() == 2);
        check!(report.violations.iter().any(|(_, v)| *v == Violation::NoLinks { entry: 0 }));
        check!(report.violations.iter().any(|(_, v)| *v == Violation::EmptyUrl { entry: 1, link: 1 }));
    }

    #[test]
    fn test_unsorted_is_warning() {
        let table = SearchTable::new(vec![entry("b", 0), entry("a", 1)]);
        let report = validate_table(&table);
        check!(report.is_valid());
        check!(report.warning_count() == 1);
        check!(report.violations[0].1 == Violation::Unsorted { entry: 1 });
    }
}
