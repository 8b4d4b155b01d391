//! Inspect handler: every link of every entry with a given display name.

use crate::catalog::Catalog;
use crate::index::{SearchEntry, SearchLink, initial_of};
use crate::search::{SearchQuery, search};
use crate::state::IndexState;
use rmcp::schemars;
use serde::Deserialize;
use std::fmt::Write as _;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct InspectEntryRequest {
    /// Search directory. Defaults to the configured one.
    #[serde(default)]
    pub directory: Option<String>,
    /// Exact display name, e.g. `async_read_some`
    pub name: String,
}

/// An entry together with where it was found.
#[derive(Debug, Clone)]
pub struct EntryLocation<'a> {
    pub section: &'a str,
    pub file: String,
    pub entry: &'a SearchEntry,
}

/// Looks up `name` in every section; only the table for its initial is read.
pub fn find_entries<'a>(catalog: &'a Catalog, name: &'a str) -> Vec<EntryLocation<'a>> {
    let Some(initial) = initial_of(name) else {
        return vec![];
    };

    catalog
        .sections()
        .sections
        .iter()
        .filter_map(|section| {
            let file = section.table_file(section.letter_index(initial)?);
            let table = catalog.table(&file)?;
            Some((section, file, table))
        })
        .flat_map(|(section, file, table)| {
            table.find_all(name).map(move |entry| EntryLocation {
                section: &section.name,
                file: file.clone(),
                entry,
            })
        })
        .collect()
}

/// Distinct links of all locations, each with the sections listing it.
fn merge_links<'a>(found: &[EntryLocation<'a>]) -> Vec<(&'a SearchLink, Vec<&'a str>)> {
    let mut merged: Vec<(&SearchLink, Vec<&str>)> = Vec::new();
    for location in found {
        for link in &location.entry.links {
            match merged.iter_mut().find(|(seen, _)| *seen == link) {
                Some((_, sections)) => {
                    if !sections.contains(&location.section) {
                        sections.push(location.section);
                    }
                }
                None => merged.push((link, vec![location.section])),
            }
        }
    }
    merged
}

pub async fn handle_inspect_entry(
    state: &Arc<IndexState>,
    request: InspectEntryRequest,
) -> Result<String, String> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err("Entry name must not be empty".to_string());
    }

    let catalog = state.get_catalog(request.directory.as_deref()).await?;
    let found = find_entries(&catalog, name);

    let Some(first) = found.first() else {
        let mut msg = format!("No entry named '{}' in {}.\n", name, catalog.root().display());
        let threshold = state.config().suggestion_threshold;
        let query = SearchQuery::new(name);
        if let Ok(results) = search(&catalog, &query, threshold) {
            let names: Vec<_> = results
                .hits
                .iter()
                .map(|h| h.entry.display_name.as_str())
                .chain(results.suggestions.iter().map(|s| s.name))
                .take(5)
                .collect();
            if !names.is_empty() {
                msg.push_str("\nDid you mean:\n");
                for name in names {
                    let _ = writeln!(msg, "• `{}`", name);
                }
            }
        }
        return Ok(msg);
    };

    let mut keys: Vec<String> = Vec::new();
    let mut sections: Vec<String> = Vec::new();
    for location in &found {
        let key = location.entry.key.to_string();
        if !keys.contains(&key) {
            keys.push(key);
        }
        let section = format!("{} ({})", location.section, location.file);
        if !sections.contains(&section) {
            sections.push(section);
        }
    }
    let links = merge_links(&found);
    let section_count = sections.len();

    let mut output = format!("# {}\n\n", first.entry.display_name);
    let keys: Vec<_> = keys.iter().map(|k| format!("`{}`", k)).collect();
    let _ = writeln!(output, "Key: {}", keys.join(", "));
    let _ = writeln!(output, "Sections: {}", sections.join(", "));
    let _ = writeln!(output, "\n{} link(s):", links.len());

    for (idx, (link, listed_in)) in links.iter().enumerate() {
        let _ = writeln!(output, "{}. {}", idx + 1, link.display_label());
        let _ = writeln!(output, "   url: {}", link.url);
        if let Some(anchor) = link.anchor() {
            let _ = writeln!(output, "   page: {}  anchor: {}", link.page(), anchor);
        }
        if section_count > 1 && listed_in.len() < section_count {
            let _ = writeln!(output, "   in: {}", listed_in.join(", "));
        }
        if !link.is_local() {
            output.push_str("   external (tag file)\n");
        }
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::{IndexBuilder, Symbol, SymbolKind};
    use assert2::check;

    #[test]
    fn test_find_entries_across_sections() {
        let catalog = IndexBuilder::new()
            .add(Symbol::new("stream", SymbolKind::Class, "s.html").in_scope("nexus::quic"))
            .add(Symbol::new("session", SymbolKind::Function, "f.html#a1").in_scope("nexus"))
            .build()
            .into_catalog("/docs/search");

        let found = find_entries(&catalog, "stream");
        let sections: Vec<_> = found.iter().map(|loc| loc.section).collect();
        check!(sections == vec!["all", "classes"]);
        check!(found[0].file == "all_0.js");

        check!(find_entries(&catalog, "Stream").is_empty());
        check!(find_entries(&catalog, "").is_empty());
    }
}
