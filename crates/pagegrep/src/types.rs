//! Core data types for work items, fetch/match results and the result set.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{self, Deserializer, IgnoredAny, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

/// Error marker recorded when a page was fetched without a transport fault.
pub const NO_ERROR: &str = "No error";

/// Prefix that marks a pattern entry as a reference into the template table.
pub const TEMPLATE_MARKER: char = '#';

/// One entry of a work item's pattern list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternSpec {
    /// A regular expression used as-is.
    Literal(String),
    /// A symbolic name (including the `#` marker) looked up in the template table.
    Template(String),
}

impl PatternSpec {
    /// Classify a raw pattern entry by its leading marker.
    pub fn parse(raw: &str) -> Self {
        if raw.starts_with(TEMPLATE_MARKER) {
            PatternSpec::Template(raw.to_string())
        } else {
            PatternSpec::Literal(raw.to_string())
        }
    }

    /// The entry exactly as it was written in the input.
    pub fn as_str(&self) -> &str {
        match self {
            PatternSpec::Literal(s) | PatternSpec::Template(s) => s,
        }
    }
}

/// A page to fetch together with the patterns to apply to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub url: String,
    pub patterns: Vec<PatternSpec>,
}

impl WorkItem {
    pub fn new<I, S>(url: impl Into<String>, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            url: url.into(),
            patterns: patterns
                .into_iter()
                .map(|p| PatternSpec::parse(p.as_ref()))
                .collect(),
        }
    }
}

/// Body of a fetched page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageContent {
    /// UTF-8 decoded text.
    Text(String),
    /// Undecoded transport payload.
    Raw(Vec<u8>),
}

impl PageContent {
    /// Text view of the content. Raw payloads are decoded lossily.
    pub fn as_text(&self) -> std::borrow::Cow<'_, str> {
        match self {
            PageContent::Text(s) => std::borrow::Cow::Borrowed(s),
            PageContent::Raw(b) => String::from_utf8_lossy(b),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            PageContent::Text(s) => s.len(),
            PageContent::Raw(b) => b.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Outcome of fetching one URL. Transport faults are already folded into
/// `error` and a sentinel `content`.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub content: PageContent,
    pub status: u16,
    pub elapsed_secs: f64,
    pub error: Option<String>,
}

impl FetchResult {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// The error description, or [`NO_ERROR`] on success.
    pub fn error_message(&self) -> &str {
        self.error.as_deref().unwrap_or(NO_ERROR)
    }

    /// Fetch-side diagnostics, before any processing time is known.
    pub fn diagnostics(&self) -> Diagnostics {
        Diagnostics {
            status: self.status,
            fetching_secs: self.elapsed_secs,
            processing_secs: 0.0,
            error: self.error.clone(),
        }
    }
}

/// Combined fetch and processing diagnostics for one work item.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostics {
    pub status: u16,
    pub fetching_secs: f64,
    pub processing_secs: f64,
    pub error: Option<String>,
}

impl Diagnostics {
    pub fn error_message(&self) -> &str {
        self.error.as_deref().unwrap_or(NO_ERROR)
    }
}

/// All matches of a single pattern, in order of appearance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatches {
    pub pattern: String,
    pub matches: Vec<String>,
}

/// Matches of every pattern applied to one page.
#[derive(Debug, Clone, Default)]
pub struct MatchResult {
    /// One entry per distinct pattern, in input order.
    pub matches: Vec<PatternMatches>,
    pub processing_secs: f64,
    /// Patterns that failed to compile, with the compiler's message.
    pub pattern_errors: Vec<String>,
}

impl MatchResult {
    /// Matches recorded for `pattern`, if it was part of the input.
    pub fn get(&self, pattern: &str) -> Option<&[String]> {
        self.matches
            .iter()
            .find(|m| m.pattern == pattern)
            .map(|m| m.matches.as_slice())
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.matches.iter().map(|m| m.pattern.as_str())
    }
}

/// The persisted outcome of one fully processed work item.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRecord {
    pub url: String,
    pub matches: Vec<PatternMatches>,
    pub fetching_secs: f64,
    pub processing_secs: f64,
    pub error: String,
    pub pattern_errors: Vec<String>,
}

impl ResultRecord {
    pub fn new(url: impl Into<String>, result: MatchResult, diagnostics: Diagnostics) -> Self {
        Self {
            url: url.into(),
            matches: result.matches,
            fetching_secs: diagnostics.fetching_secs,
            processing_secs: diagnostics.processing_secs,
            error: diagnostics.error_message().to_string(),
            pattern_errors: result.pattern_errors,
        }
    }

    pub fn get(&self, pattern: &str) -> Option<&[String]> {
        self.matches
            .iter()
            .find(|m| m.pattern == pattern)
            .map(|m| m.matches.as_slice())
    }
}

/// Append-only accumulator of result records for one run.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    records: Vec<ResultRecord>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, record: ResultRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ResultRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<ResultRecord> {
        self.records
    }
}

// ── Serialization ────────────────────────────────────────────────────────────
//
// A record is written as `{ "<url>": { "matches": {...}, ... } }`, and the
// match mapping keeps the input pattern order, so both are done by hand
// instead of going through an unordered map type.

struct MatchesRef<'a>(&'a [PatternMatches]);

impl Serialize for MatchesRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for entry in self.0 {
            map.serialize_entry(&entry.pattern, &entry.matches)?;
        }
        map.end()
    }
}

#[derive(Serialize)]
struct RecordBodyRef<'a> {
    matches: MatchesRef<'a>,
    #[serde(rename = "fetching time (s)")]
    fetching_secs: f64,
    #[serde(rename = "processing time (s)")]
    processing_secs: f64,
    error: &'a str,
    #[serde(rename = "pattern errors", skip_serializing_if = "no_pattern_errors")]
    pattern_errors: &'a [String],
}

fn no_pattern_errors(errors: &&[String]) -> bool {
    errors.is_empty()
}

#[derive(Deserialize)]
struct RecordBody {
    matches: OrderedEntries<Vec<String>>,
    #[serde(rename = "fetching time (s)")]
    fetching_secs: f64,
    #[serde(rename = "processing time (s)")]
    processing_secs: f64,
    error: String,
    #[serde(rename = "pattern errors", default)]
    pattern_errors: Vec<String>,
}

impl Serialize for ResultRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(
            &self.url,
            &RecordBodyRef {
                matches: MatchesRef(&self.matches),
                fetching_secs: self.fetching_secs,
                processing_secs: self.processing_secs,
                error: &self.error,
                pattern_errors: &self.pattern_errors,
            },
        )?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for ResultRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RecordVisitor;

        impl<'de> Visitor<'de> for RecordVisitor {
            type Value = ResultRecord;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object with a single URL key")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let (url, body): (String, RecordBody) = map
                    .next_entry()?
                    .ok_or_else(|| de::Error::invalid_length(0, &self))?;
                if map.next_key::<IgnoredAny>()?.is_some() {
                    return Err(de::Error::custom("result record has more than one URL key"));
                }
                Ok(ResultRecord {
                    url,
                    matches: body
                        .matches
                        .0
                        .into_iter()
                        .map(|(pattern, matches)| PatternMatches { pattern, matches })
                        .collect(),
                    fetching_secs: body.fetching_secs,
                    processing_secs: body.processing_secs,
                    error: body.error,
                    pattern_errors: body.pattern_errors,
                })
            }
        }

        deserializer.deserialize_map(RecordVisitor)
    }
}

/// A JSON object read as a list of `(key, value)` pairs in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedEntries<V>(pub Vec<(String, V)>);

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedEntries<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for EntriesVisitor<V> {
            type Value = OrderedEntries<V>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, V>()? {
                    entries.push(entry);
                }
                Ok(OrderedEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}

// ── Errors ───────────────────────────────────────────────────────────────────

/// Errors raised outside the fetch path: loading inputs and writing results.
#[derive(thiserror::Error, Debug)]
pub enum HarvestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid template table: {0}")]
    Template(String),

    #[error("Output error: {0}")]
    Output(String),
}

/// Convenience result type.
pub type HarvestResult<T> = Result<T, HarvestError>;
