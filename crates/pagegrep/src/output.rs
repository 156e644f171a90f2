//! Result sinks: where a run's accumulated records are flushed.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::types::{HarvestError, HarvestResult, ResultRecord, ResultSet};

/// Durable destination for a result set.
///
/// `write_results` replaces whatever the sink held before with the full set,
/// so calling it more than once is harmless.
pub trait ResultSink {
    fn write_results(&mut self, results: &ResultSet) -> HarvestResult<()>;

    /// Human-readable location used in log messages.
    fn location(&self) -> String;
}

/// Writes results as pretty-printed JSON to a file.
///
/// The file is written to a temporary sibling first and then renamed into
/// place, so readers never observe a half-written output.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "results".to_string());
        self.path.with_file_name(format!(".{name}.tmp"))
    }
}

impl ResultSink for JsonFileSink {
    fn write_results(&mut self, results: &ResultSet) -> HarvestResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let temp = self.temp_path();
        let mut file = std::fs::File::create(&temp).map_err(|e| {
            HarvestError::Output(format!("cannot create {}: {e}", temp.display()))
        })?;
        serde_json::to_writer_pretty(&mut file, results.records())?;
        file.write_all(b"\n")?;
        file.sync_all()?;
        drop(file);

        std::fs::rename(&temp, &self.path).map_err(|e| {
            HarvestError::Output(format!("cannot move results to {}: {e}", self.path.display()))
        })?;
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// Keeps the last flushed result set in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub records: Vec<ResultRecord>,
    /// Number of times the sink was flushed.
    pub writes: usize,
}

impl ResultSink for MemorySink {
    fn write_results(&mut self, results: &ResultSet) -> HarvestResult<()> {
        self.records = results.records().to_vec();
        self.writes += 1;
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

/// Read back a results file written by [`JsonFileSink`].
pub fn read_results(path: &Path) -> HarvestResult<Vec<ResultRecord>> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PatternMatches, NO_ERROR};

    fn record(url: &str) -> ResultRecord {
        ResultRecord {
            url: url.to_string(),
            matches: vec![PatternMatches {
                pattern: r"\d+".to_string(),
                matches: vec!["1".to_string(), "22".to_string()],
            }],
            fetching_secs: 0.5,
            processing_secs: 0.25,
            error: NO_ERROR.to_string(),
            pattern_errors: Vec::new(),
        }
    }

    #[test]
    fn test_json_sink_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.json");
        let mut sink = JsonFileSink::new(&path);

        let mut results = ResultSet::new();
        results.push(record("https://b.example"));
        results.push(record("https://a.example"));
        sink.write_results(&results).unwrap();

        let loaded = read_results(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].url, "https://b.example");
        assert_eq!(loaded[1].url, "https://a.example");
        assert_eq!(loaded[0].get(r"\d+").unwrap().len(), 2);
        assert!(!sink.temp_path().exists());
    }

    #[test]
    fn test_json_sink_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let mut sink = JsonFileSink::new(&path);

        let mut results = ResultSet::new();
        results.push(record("https://a.example"));
        sink.write_results(&results).unwrap();
        sink.write_results(&ResultSet::new()).unwrap();

        assert!(read_results(&path).unwrap().is_empty());
    }

    #[test]
    fn test_memory_sink_counts_writes() {
        let mut sink = MemorySink::default();
        sink.write_results(&ResultSet::new()).unwrap();
        assert_eq!(sink.writes, 1);
        assert!(sink.records.is_empty());
    }
}
