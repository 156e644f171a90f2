//! Sequential fetch → match → accumulate loop with interrupt-safe flushing.
//!
//! Work items are processed strictly one after another over a single shared
//! connection pool. A [`CancellationToken`] is checked before each item and
//! raced against the item in flight; on cancellation the in-flight item is
//! abandoned, so a record is only appended once both its fetch and match
//! phases are complete.
//!
//! Both terminal states end in [`flush`], which writes the accumulated
//! result set to the sink and touches nothing else.

use tokio_util::sync::CancellationToken;

use crate::fetch::HttpPool;
use crate::matcher::match_page;
use crate::output::ResultSink;
use crate::templates::{resolve, TemplateTable};
use crate::types::{HarvestResult, ResultRecord, ResultSet, WorkItem};

/// Default interval, in items, between progress log lines.
pub const DEFAULT_PROGRESS_EVERY: usize = 10;

/// Per-run switches.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Drop repeated match strings per pattern.
    pub unique: bool,
    /// Log progress every this many items.
    pub progress_every: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            unique: false,
            progress_every: DEFAULT_PROGRESS_EVERY,
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every work item was processed.
    Completed,
    /// Cancelled before the last item finished.
    Interrupted,
}

/// Summary of a finished run. The results themselves live in the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub outcome: RunOutcome,
    pub processed: usize,
    pub total: usize,
}

/// Drives fetching and matching over a list of work items.
pub struct Pipeline {
    pool: HttpPool,
    templates: TemplateTable,
    options: RunOptions,
}

impl Pipeline {
    pub fn new(pool: HttpPool, templates: TemplateTable, options: RunOptions) -> Self {
        Self {
            pool,
            templates,
            options,
        }
    }

    /// Resolve, fetch and match a single work item.
    pub async fn process(&self, item: &WorkItem) -> ResultRecord {
        let patterns = resolve(&item.patterns, &self.templates);
        let (result, diagnostics) =
            match_page(&item.url, &patterns, Some(&self.pool), self.options.unique).await;
        tracing::debug!(
            url = %item.url,
            status = diagnostics.status,
            patterns = patterns.len(),
            fetch_s = diagnostics.fetching_secs,
            "processed item"
        );
        ResultRecord::new(item.url.clone(), result, diagnostics)
    }

    /// Process `items` in order until done or cancelled, then flush.
    ///
    /// Only a failing flush is reported as an error; every per-item problem
    /// is recorded in that item's result record.
    pub async fn run(
        &self,
        items: Vec<WorkItem>,
        sink: &mut dyn ResultSink,
        cancel: &CancellationToken,
    ) -> HarvestResult<RunSummary> {
        let total = items.len();
        let every = self.options.progress_every.max(1);
        let mut results = ResultSet::with_capacity(total);
        let mut outcome = RunOutcome::Completed;

        for (index, item) in items.into_iter().enumerate() {
            if cancel.is_cancelled() {
                outcome = RunOutcome::Interrupted;
                break;
            }
            if index % every == 0 {
                tracing::info!("processing item {} / {}", index + 1, total);
            }

            let record = tokio::select! {
                biased;
                () = cancel.cancelled() => None,
                record = self.process(&item) => Some(record),
            };
            let Some(record) = record else {
                tracing::debug!(url = %item.url, "abandoned in-flight item");
                outcome = RunOutcome::Interrupted;
                break;
            };
            results.push(record);
        }

        flush(&results, sink)?;

        match outcome {
            RunOutcome::Completed => {
                tracing::info!("Done! Results are in {}", sink.location());
            }
            RunOutcome::Interrupted => {
                tracing::warn!(
                    processed = results.len(),
                    total,
                    "Interrupted by user! Results are saved in {}",
                    sink.location()
                );
            }
        }

        Ok(RunSummary {
            outcome,
            processed: results.len(),
            total,
        })
    }
}

/// Write the accumulated results to `sink`.
pub fn flush(results: &ResultSet, sink: &mut dyn ResultSink) -> HarvestResult<()> {
    sink.write_results(results)?;
    tracing::debug!(records = results.len(), sink = %sink.location(), "flushed results");
    Ok(())
}
