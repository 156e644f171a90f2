//! `pagegrep validate`: load and resolve an input without fetching anything.

use std::path::Path;

use anyhow::Context;
use serde_json::json;

use pagegrep::{load_samples, resolve};

use crate::config::TemplateSource;
use crate::error::{exit_codes, CliError, CliResult};

/// Counts gathered while validating an input file.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub items: usize,
    pub patterns: usize,
    /// Template references with no binding; these are dropped at run time.
    pub dropped: usize,
    /// Items left with no pattern after resolution.
    pub empty_items: usize,
}

pub fn check(input: &Path, templates: &TemplateSource) -> CliResult<ValidationReport> {
    let items = load_samples(input).map_err(CliError::Input)?;
    let table = super::load_templates(templates).map_err(CliError::Input)?;

    let mut report = ValidationReport {
        items: items.len(),
        ..ValidationReport::default()
    };
    for item in &items {
        let resolved = resolve(&item.patterns, &table);
        report.dropped += item.patterns.len() - resolved.len();
        report.patterns += resolved.len();
        if resolved.is_empty() {
            report.empty_items += 1;
        }
    }
    Ok(report)
}

pub fn run(input: &Path, templates: &TemplateSource) -> CliResult<i32> {
    let report = check(input, templates)?;
    let summary = json!({
        "input": input.display().to_string(),
        "templates": templates.path().map(|p| p.display().to_string()),
        "items": report.items,
        "patterns": report.patterns,
        "dropped_templates": report.dropped,
        "items_without_patterns": report.empty_items,
    });
    let text = serde_json::to_string_pretty(&summary).context("failed to render report")?;
    println!("{text}");
    Ok(exit_codes::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_counts_dropped_references() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("samples.txt");
        std::fs::write(&input, "> https://a.example\n#known\n#unknown\n\\d+\n> https://b.example\n#unknown\n").unwrap();
        let templates = dir.path().join("regex_templates");
        std::fs::write(&templates, "#known\n[a-z]+\n").unwrap();

        let report = check(&input, &TemplateSource::Explicit(templates)).unwrap();
        assert_eq!(
            report,
            ValidationReport {
                items: 2,
                patterns: 2,
                dropped: 2,
                empty_items: 1,
            }
        );
    }

    #[test]
    fn test_check_reports_bad_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("samples.json");
        std::fs::write(&input, "{not json").unwrap();

        let err = check(&input, &TemplateSource::None).unwrap_err();
        assert_eq!(err.exit_code(), exit_codes::BAD_INPUT);
    }

    #[test]
    fn test_check_reports_missing_template_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("samples.txt");
        std::fs::write(&input, "> https://a.example\n").unwrap();

        let missing = TemplateSource::Explicit(dir.path().join("nope.json"));
        let err = check(&input, &missing).unwrap_err();
        assert_eq!(err.exit_code(), exit_codes::BAD_INPUT);
    }
}
