use crate::catalog::Catalog;
use crate::state::IndexState;
use rmcp::schemars;
use serde::Deserialize;
use std::fmt::Write as _;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct ListSectionsRequest {
    /// Search directory. Defaults to the configured one.
    #[serde(default)]
    pub directory: Option<String>,
}

pub async fn handle_list_sections(
    state: &Arc<IndexState>,
    request: ListSectionsRequest,
) -> Result<String, String> {
    let catalog = state.get_catalog(request.directory.as_deref()).await?;
    Ok(format_sections(&catalog))
}

/// One line per section: id, name, label, entry count, letters.
pub fn format_sections(catalog: &Catalog) -> String {
    let sections = &catalog.sections().sections;
    if sections.is_empty() {
        return format!("No sections in {}\n", catalog.root().display());
    }

    let mut output = format!(
        "Search index {} ({} sections):\n\n",
        catalog.root().display(),
        sections.len()
    );
    for section in sections {
        let count = catalog.entries(section).count();
        let letters: String = section.letters.iter().collect();
        let _ = writeln!(
            output,
            "{}. {} ({}): {} entries, letters \"{}\"",
            section.id, section.name, section.label, count, letters
        );
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::{IndexBuilder, Symbol, SymbolKind};
    use assert2::check;

    #[test]
    fn test_format_sections() {
        let catalog = IndexBuilder::new()
            .add(Symbol::new("stream", SymbolKind::Class, "s.html"))
            .add(Symbol::new("async_read_some", SymbolKind::Function, "s.html#a1"))
            .build()
            .into_catalog("/docs/search");

        let output = format_sections(&catalog);
        check!(output.contains("0. all (All): 2 entries, letters \"as\""));
        check!(output.contains("1. classes (Classes): 1 entries, letters \"s\""));
        check!(output.contains("2. functions (Functions): 1 entries, letters \"a\""));
    }
}
