//! Loading work items from an input file.
//!
//! Two layouts are accepted. A `.json` file holds an array of objects that
//! map a URL to its pattern list:
//!
//! ```text
//! [{"https://example.com": ["\\d{4,}", "#email"]}]
//! ```
//!
//! Any other file is read line by line. A line starting with `>` opens a new
//! URL, and the non-empty lines after it are that URL's patterns:
//!
//! ```text
//! > https://example.com
//! \d{4,}
//! #email
//! ```

use std::path::Path;

use crate::types::{HarvestError, HarvestResult, OrderedEntries, WorkItem};

/// Marker that starts a URL line in the text layout.
pub const URL_MARKER: char = '>';

const DEMO_URL: &str = "https://webscraper.io/test-sites/tables";
const DEMO_PATTERNS: [&str; 2] = [r"\d{4,}", r"@\w+"];

/// Load work items from `path`, choosing the layout by extension.
pub fn load_samples(path: &Path) -> HarvestResult<Vec<WorkItem>> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        HarvestError::InvalidInput(format!("cannot read {}: {e}", path.display()))
    })?;

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    let items = if is_json {
        parse_json_samples(&text)?
    } else {
        parse_text_samples(&text)?
    };
    tracing::debug!(path = %path.display(), items = items.len(), "loaded samples");
    Ok(items)
}

/// Parse the JSON layout. Objects with several URLs yield one item per URL,
/// in document order.
pub fn parse_json_samples(text: &str) -> HarvestResult<Vec<WorkItem>> {
    let samples: Vec<OrderedEntries<Vec<String>>> = serde_json::from_str(text)
        .map_err(|e| HarvestError::InvalidInput(format!("malformed JSON samples: {e}")))?;

    Ok(samples
        .into_iter()
        .flat_map(|sample| sample.0)
        .map(|(url, patterns)| WorkItem::new(url, patterns))
        .collect())
}

/// Parse the line-oriented layout.
pub fn parse_text_samples(text: &str) -> HarvestResult<Vec<WorkItem>> {
    let mut items: Vec<(String, Vec<String>)> = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim_end_matches('\r');
        if let Some(rest) = line.trim_start().strip_prefix(URL_MARKER) {
            let url: String = rest.chars().filter(|c| *c != ' ').collect();
            if url.is_empty() {
                return Err(HarvestError::InvalidInput(format!(
                    "line {}: URL marker without a URL",
                    index + 1
                )));
            }
            items.push((url, Vec::new()));
        } else if !line.is_empty() {
            let Some((_, patterns)) = items.last_mut() else {
                return Err(HarvestError::InvalidInput(format!(
                    "line {}: pattern before the first URL line",
                    index + 1
                )));
            };
            patterns.push(line.to_string());
        }
    }

    Ok(items
        .into_iter()
        .map(|(url, patterns)| WorkItem::new(url, patterns))
        .collect())
}

/// Write a JSON input holding `count` copies of a demo sample.
pub fn write_demo_samples(path: &Path, count: usize) -> HarvestResult<()> {
    let sample = serde_json::json!({ DEMO_URL: DEMO_PATTERNS });
    let samples = vec![sample; count];
    let text = serde_json::to_string_pretty(&samples)?;
    std::fs::write(path, text)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PatternSpec;

    #[test]
    fn test_parse_text_layout() {
        let text = "> https://a.example\n\\d+\n#email\n\n>https://b.example\n\n> https://c .example\r\nfoo\r\n";
        let items = parse_text_samples(text).unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].url, "https://a.example");
        assert_eq!(
            items[0].patterns,
            vec![
                PatternSpec::Literal(r"\d+".to_string()),
                PatternSpec::Template("#email".to_string())
            ]
        );
        assert!(items[1].patterns.is_empty());
        assert_eq!(items[2].url, "https://c.example");
        assert_eq!(items[2].patterns, vec![PatternSpec::Literal("foo".to_string())]);
    }

    #[test]
    fn test_parse_text_rejects_orphan_pattern() {
        let err = parse_text_samples("\\d+\n> https://a.example\n").unwrap_err();
        assert!(err.to_string().contains("line 1"));
        assert!(parse_text_samples(">   \n").is_err());
    }

    #[test]
    fn test_parse_text_empty() {
        assert!(parse_text_samples("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_json_layout_keeps_order() {
        let text = r##"[
            {"https://z.example": ["\\d{4,}"]},
            {"https://b.example": [], "https://a.example": ["#email"]}
        ]"##;
        let items = parse_json_samples(text).unwrap();
        let urls: Vec<_> = items.iter().map(|i| i.url.as_str()).collect();
        assert_eq!(urls, vec!["https://z.example", "https://b.example", "https://a.example"]);
        assert_eq!(items[2].patterns, vec![PatternSpec::Template("#email".to_string())]);
    }

    #[test]
    fn test_parse_json_rejects_wrong_shape() {
        assert!(parse_json_samples(r#"{"https://a": ["x"]}"#).is_err());
        assert!(parse_json_samples(r#"[{"https://a": "x"}]"#).is_err());
        assert!(parse_json_samples("[").is_err());
    }

    /// Fuzz test: neither parser may panic on arbitrary input.
    #[test]
    fn test_fuzz_sample_parsers() {
        let fuzz_inputs = [
            "",
            ">",
            ">\n>\n",
            "no marker at all",
            "\r\n\r\n",
            "[]",
            "[{}]",
            "[{\"u\": [1, 2]}]",
            "[null]",
            &"> a\n".repeat(1000),
            "\x00\x01\x02",
            "> \u{1F600}\n\u{1F600}",
        ];

        for input in &fuzz_inputs {
            let _ = parse_text_samples(input);
            let _ = parse_json_samples(input);
        }
    }

    #[test]
    fn test_demo_samples_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.json");
        write_demo_samples(&path, 3).unwrap();

        let items = load_samples(&path).unwrap();
        assert_eq!(items.len(), 3);
        assert!(items.iter().all(|i| i.url == DEMO_URL && i.patterns.len() == 2));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(load_samples(Path::new("/definitely/not/here.json")).is_err());
    }
}
