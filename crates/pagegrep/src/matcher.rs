//! Regex extraction over fetched page content.

use std::collections::HashSet;
use std::time::Instant;

use regex::Regex;

use crate::fetch::{self, HttpPool};
use crate::types::{Diagnostics, MatchResult, PatternMatches};

/// Apply every pattern to `content`.
///
/// Each pattern yields all non-overlapping matches, left to right. With
/// `unique` set, repeated match strings are dropped after their first
/// occurrence. A pattern that does not compile yields no matches and is
/// reported in `pattern_errors`. Repeated patterns are evaluated once.
///
/// Matches are always the whole matched text, even when the pattern has
/// capture groups; Python's `re.findall` would return the group text instead.
/// Lookaround and backreferences are not supported by the `regex` crate, so
/// such patterns fail to compile and land in `pattern_errors`.
pub fn find_matches(content: &str, patterns: &[String], unique: bool) -> MatchResult {
    let started = Instant::now();
    let mut matches: Vec<PatternMatches> = Vec::with_capacity(patterns.len());
    let mut pattern_errors = Vec::new();

    for pattern in patterns {
        if matches.iter().any(|m| &m.pattern == pattern) {
            continue;
        }

        let found = match Regex::new(pattern) {
            Ok(re) => collect(re.find_iter(content).map(|m| m.as_str()), unique),
            Err(e) => {
                tracing::warn!(pattern = %pattern, "skipping pattern that does not compile: {e}");
                pattern_errors.push(format!("{pattern}: {e}"));
                Vec::new()
            }
        };

        matches.push(PatternMatches {
            pattern: pattern.clone(),
            matches: found,
        });
    }

    MatchResult {
        matches,
        processing_secs: started.elapsed().as_secs_f64(),
        pattern_errors,
    }
}

fn collect<'a>(found: impl Iterator<Item = &'a str>, unique: bool) -> Vec<String> {
    if !unique {
        return found.map(str::to_string).collect();
    }
    let mut seen = HashSet::new();
    found
        .filter(|m| seen.insert(*m))
        .map(str::to_string)
        .collect()
}

/// Fetch `url` (decoded) and apply `patterns` to its content.
///
/// A failed fetch is not handled here: the patterns run against the sentinel
/// body, and the fetch error is carried in the returned diagnostics.
pub async fn match_page(
    url: &str,
    patterns: &[String],
    pool: Option<&HttpPool>,
    unique: bool,
) -> (MatchResult, Diagnostics) {
    let page = fetch::fetch(url, pool, true).await;
    let mut diagnostics = page.diagnostics();

    let result = find_matches(&page.content.as_text(), patterns, unique);
    diagnostics.processing_secs = result.processing_secs;

    (result, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTENT: &str = "contact @alice_99 and @bobby000, code 604046";

    fn patterns(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_matches_in_order_of_appearance() {
        let result = find_matches(CONTENT, &patterns(&[r"@\w{5,}", r"\d{6,}"]), false);
        assert_eq!(
            result.get(r"@\w{5,}").unwrap(),
            &["@alice_99".to_string(), "@bobby000".to_string()]
        );
        assert_eq!(result.get(r"\d{6,}").unwrap(), &["604046".to_string()]);
        assert_eq!(
            result.patterns().collect::<Vec<_>>(),
            vec![r"@\w{5,}", r"\d{6,}"]
        );
        assert!(result.pattern_errors.is_empty());
    }

    #[test]
    fn test_no_match_yields_empty_list() {
        let result = find_matches(CONTENT, &patterns(&[r"zzz+"]), false);
        assert_eq!(result.get("zzz+").unwrap().len(), 0);
    }

    #[test]
    fn test_duplicates_kept_without_unique() {
        let result = find_matches("a1 b2 a1 a1", &patterns(&[r"a\d"]), false);
        assert_eq!(result.get(r"a\d").unwrap().len(), 3);
    }

    #[test]
    fn test_unique_keeps_first_occurrence_order() {
        let result = find_matches("b2 a1 b2 c3 a1", &patterns(&[r"[a-c]\d"]), true);
        assert_eq!(
            result.get(r"[a-c]\d").unwrap(),
            &["b2".to_string(), "a1".to_string(), "c3".to_string()]
        );
    }

    #[test]
    fn test_non_overlapping() {
        let result = find_matches("aaaa", &patterns(&["aa"]), false);
        assert_eq!(result.get("aa").unwrap().len(), 2);
    }

    #[test]
    fn test_invalid_pattern_is_recorded() {
        let result = find_matches(CONTENT, &patterns(&["(unclosed", r"\d+"]), false);
        assert_eq!(result.get("(unclosed").unwrap().len(), 0);
        assert_eq!(result.get(r"\d+").unwrap(), &["99".to_string(), "000".to_string(), "604046".to_string()]);
        assert_eq!(result.pattern_errors.len(), 1);
        assert!(result.pattern_errors[0].starts_with("(unclosed"));
    }

    #[test]
    fn test_capture_groups_yield_whole_matches() {
        let result = find_matches("1x 2x 3y", &patterns(&[r"(\d)x"]), false);
        assert_eq!(result.get(r"(\d)x").unwrap(), &["1x".to_string(), "2x".to_string()]);
    }

    #[test]
    fn test_lookaround_is_reported_as_pattern_error() {
        let result = find_matches("abc", &patterns(&["a(?=b)", r"(a)\1"]), false);
        assert_eq!(result.pattern_errors.len(), 2);
        assert_eq!(result.get("a(?=b)").unwrap().len(), 0);
    }

    #[test]
    fn test_repeated_pattern_collapses() {
        let result = find_matches(CONTENT, &patterns(&[r"\d{6,}", r"\d{6,}"]), false);
        assert_eq!(result.matches.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_runs_against_sentinel() {
        let (result, diagnostics) =
            match_page("http://127.0.0.1:1/", &patterns(&["INVALID"]), None, false).await;
        assert_eq!(result.get("INVALID").unwrap(), &["INVALID".to_string()]);
        assert_eq!(diagnostics.status, fetch::SENTINEL_STATUS);
        assert!(diagnostics.error.is_some());
    }
}
