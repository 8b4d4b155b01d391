//! Validation handler: structural checks over a whole search directory.

use crate::state::IndexState;
use crate::validate::{Severity, ValidationReport, validate_catalog};
use rmcp::schemars;
use serde::Deserialize;
use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

/// Violations listed per severity before the rest are summarized.
const MAX_LISTED: usize = 50;

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct ValidateRequest {
    /// Search directory. Defaults to the configured one.
    #[serde(default)]
    pub directory: Option<String>,
}

pub async fn handle_validate(
    state: &Arc<IndexState>,
    request: ValidateRequest,
) -> Result<String, String> {
    let catalog = state.get_catalog(request.directory.as_deref()).await?;
    let report = validate_catalog(&catalog);
    Ok(format_report(catalog.root(), &report))
}

pub fn format_report(root: &Path, report: &ValidationReport) -> String {
    let mut output = format!(
        "Validated {} entries in {}: {} error(s), {} warning(s)\n",
        report.entries_checked,
        root.display(),
        report.error_count(),
        report.warning_count()
    );

    for (severity, heading) in [(Severity::Error, "Errors"), (Severity::Warning, "Warnings")] {
        let listed: Vec<_> = report
            .violations
            .iter()
            .filter(|(_, v)| v.severity() == severity)
            .collect();
        if listed.is_empty() {
            continue;
        }

        let _ = writeln!(output, "\n{}:", heading);
        for (file, violation) in listed.iter().take(MAX_LISTED) {
            if file.is_empty() {
                let _ = writeln!(output, "• {}", violation);
            } else {
                let _ = writeln!(output, "• {}: {}", file, violation);
            }
        }
        if listed.len() > MAX_LISTED {
            let _ = writeln!(output, "… and {} more", listed.len() - MAX_LISTED);
        }
    }

    if report.violations.is_empty() {
        output.push_str("\nNo problems found.\n");
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::Violation;
    use assert2::check;

    #[test]
    fn test_format_report() {
        let report = ValidationReport {
            violations: vec![
                ("all_0.js".to_string(), Violation::NoLinks { entry: 3 }),
                ("all_0.js".to_string(), Violation::Unsorted { entry: 4 }),
            ],
            entries_checked: 5,
        };
        let output = format_report(Path::new("/docs/search"), &report);
        check!(output.starts_with("Validated 5 entries in /docs/search: 1 error(s), 1 warning(s)\n"));
        check!(output.contains("Errors:\n• all_0.js: entry 3: no links\n"));
        check!(output.contains("Warnings:\n• all_0.js: entry 4: not in search-id order\n"));
    }

    #[test]
    fn test_format_clean_report() {
        let report = ValidationReport {
            violations: vec![],
            entries_checked: 13,
        };
        check!(format_report(Path::new("/d"), &report).contains("No problems found."));
    }
}
