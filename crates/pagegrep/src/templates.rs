//! Named regex templates and their expansion in pattern lists.
//!
//! A template table maps symbolic names such as `#email` to literal
//! patterns. It is loaded once at startup from either a JSON array of
//! `{"name", "pattern"}` pairs or the flat alternating-lines layout
//! (name line, pattern line, name line, ...).

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::types::{HarvestError, HarvestResult, PatternSpec, TEMPLATE_MARKER};

/// One `(name, pattern)` binding as written in a JSON template file.
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateEntry {
    pub name: String,
    pub pattern: String,
}

/// Read-only lookup from template name to literal pattern.
#[derive(Debug, Clone, Default)]
pub struct TemplateTable {
    patterns: HashMap<String, String>,
}

impl TemplateTable {
    /// An empty table; every template reference will be dropped.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a table from ordered pairs. Later bindings of a name win.
    /// Names are normalized to carry the `#` marker.
    pub fn from_pairs<I, N, P>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (N, P)>,
        N: Into<String>,
        P: Into<String>,
    {
        let patterns = pairs
            .into_iter()
            .map(|(name, pattern)| (normalize_name(name.into()), pattern.into()))
            .collect();
        Self { patterns }
    }

    /// Load a template file, choosing the format by extension.
    pub fn load(path: &Path) -> HarvestResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            HarvestError::Template(format!("cannot read {}: {e}", path.display()))
        })?;
        let table = if has_json_extension(path) {
            Self::parse_json(&text)?
        } else {
            Self::parse_lines(&text)?
        };
        tracing::debug!(path = %path.display(), templates = table.len(), "loaded template table");
        Ok(table)
    }

    /// Parse a JSON array of `{"name": ..., "pattern": ...}` objects.
    pub fn parse_json(text: &str) -> HarvestResult<Self> {
        let entries: Vec<TemplateEntry> = serde_json::from_str(text)
            .map_err(|e| HarvestError::Template(format!("malformed JSON template list: {e}")))?;
        Ok(Self::from_pairs(entries.into_iter().map(|e| (e.name, e.pattern))))
    }

    /// Parse the alternating-lines layout: a name line followed by its pattern.
    pub fn parse_lines(text: &str) -> HarvestResult<Self> {
        let mut lines: Vec<&str> = text.lines().map(|l| l.trim_end_matches('\r')).collect();
        while lines.last().is_some_and(|l| l.trim().is_empty()) {
            lines.pop();
        }
        if lines.len() % 2 != 0 {
            let dangling = lines.last().copied().unwrap_or_default();
            return Err(HarvestError::Template(format!(
                "template {dangling:?} has no pattern line"
            )));
        }

        let mut pairs = Vec::with_capacity(lines.len() / 2);
        for (index, pair) in lines.chunks_exact(2).enumerate() {
            let name = pair[0].trim();
            if name.is_empty() {
                return Err(HarvestError::Template(format!(
                    "empty template name on line {}",
                    index * 2 + 1
                )));
            }
            pairs.push((name.to_string(), pair[1].to_string()));
        }
        Ok(Self::from_pairs(pairs))
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.patterns.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

fn normalize_name(name: String) -> String {
    if name.starts_with(TEMPLATE_MARKER) {
        name
    } else {
        format!("{TEMPLATE_MARKER}{name}")
    }
}

fn has_json_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

/// Expand template references into literal patterns.
///
/// Literals pass through unchanged. A reference missing from `table` is
/// dropped with a warning, so the item keeps its remaining patterns.
pub fn resolve(patterns: &[PatternSpec], table: &TemplateTable) -> Vec<String> {
    patterns
        .iter()
        .filter_map(|spec| match spec {
            PatternSpec::Literal(pattern) => Some(pattern.clone()),
            PatternSpec::Template(name) => match table.get(name) {
                Some(pattern) => Some(pattern.to_string()),
                None => {
                    tracing::warn!(template = %name, "Using {name} which is not in the templates");
                    None
                }
            },
        })
        .collect()
}
