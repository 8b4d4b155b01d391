//! Search handler: runs a query against a search directory.

use crate::index::SearchEntry;
use crate::search::{MatchMode, SearchQuery, SearchResults, search};
use crate::state::IndexState;
use rmcp::schemars;
use serde::Deserialize;
use std::fmt::Write as _;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct SearchRequest {
    /// Search directory (the `search/` folder of the HTML output). Defaults to the configured one.
    #[serde(default)]
    pub directory: Option<String>,
    /// Text typed into the search field
    pub query: String,
    /// prefix (as the search field does), substring, or words
    #[serde(default)]
    pub mode: Option<MatchMode>,
    /// Section to search, e.g. `classes` or `functions` (default: all)
    #[serde(default)]
    pub section: Option<String>,
    /// Maximum number of results to return (default: 10)
    #[serde(default)]
    pub limit: Option<usize>,
}

pub async fn handle_search(
    state: &Arc<IndexState>,
    request: SearchRequest,
) -> Result<String, String> {
    let catalog = state.get_catalog(request.directory.as_deref()).await?;
    let config = state.config();

    let query = SearchQuery {
        text: request.query,
        mode: request.mode.unwrap_or(config.default_mode),
        section: request.section,
        limit: request.limit.unwrap_or(config.default_limit).max(1),
    };

    let results =
        search(&catalog, &query, config.suggestion_threshold).map_err(|e| e.to_string())?;

    if results.is_empty() {
        return Ok(format_no_results(&query, &results));
    }
    Ok(format_results(&query, &results))
}

fn format_results(query: &SearchQuery, results: &SearchResults<'_>) -> String {
    let mut output = format!(
        "Search results for '{}' in {} ({} of {}):\n\n",
        query.text.trim(),
        results.section.label,
        results.hits.len(),
        results.total
    );

    for (idx, hit) in results.hits.iter().enumerate() {
        write_entry(&mut output, idx + 1, hit.entry);
    }
    output
}

/// `N. name — label (url)`; entries with several links get one line per link.
fn write_entry(output: &mut String, number: usize, entry: &SearchEntry) {
    match entry.links.as_slice() {
        [link] => {
            let _ = writeln!(
                output,
                "{}. `{}` — {} ({}){}",
                number,
                entry.display_name,
                link.display_label(),
                link.url,
                external_marker(link.is_local())
            );
        }
        links => {
            let _ = writeln!(
                output,
                "{}. `{}` ({} matches)",
                number,
                entry.display_name,
                links.len()
            );
            for link in links {
                let _ = writeln!(
                    output,
                    "   - {} ({}){}",
                    link.display_label(),
                    link.url,
                    external_marker(link.is_local())
                );
            }
        }
    }
}

const fn external_marker(local: bool) -> &'static str {
    if local { "" } else { " [external]" }
}

fn format_no_results(query: &SearchQuery, results: &SearchResults<'_>) -> String {
    let text = query.text.trim();
    if text.is_empty() {
        return "Empty query. Type the start of a symbol name, e.g. 'async_read'.\n".to_string();
    }

    let mut msg = format!("No results found for '{}' in {}.\n\n", text, results.section.label);

    if !results.suggestions.is_empty() {
        msg.push_str("Did you mean:\n");
        for suggestion in &results.suggestions {
            let _ = writeln!(msg, "• `{}`", suggestion.name);
        }
        msg.push('\n');
    }

    msg.push_str("Search tips:\n");
    match query.mode {
        MatchMode::Prefix => {
            msg.push_str("• Prefix mode matches the start of names, like the search field\n");
            msg.push_str("• Use mode 'substring' to match anywhere in a name\n");
        }
        MatchMode::Substring => {
            msg.push_str("• Try a shorter fragment of the name\n");
        }
        MatchMode::Words => {
            msg.push_str("• Every word must match a part of the name; try fewer words\n");
        }
    }
    if text.contains("::") {
        msg.push_str("• Entries are keyed by short name; search 'stream', not 'quic::stream'\n");
    }
    msg
}
