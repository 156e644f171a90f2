//! `pagegrep run`: fetch every sample and write the matches.

use anyhow::Context;
use tokio_util::sync::CancellationToken;

use pagegrep::{load_samples, HttpPool, JsonFileSink, Pipeline, RunOutcome};

use crate::config::RunConfig;
use crate::error::{exit_codes, CliError, CliResult};

/// Run the pipeline, cancelling it on Ctrl-C, and return the process exit
/// code.
pub async fn run(config: &RunConfig) -> CliResult<i32> {
    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("received interrupt signal");
            interrupt.cancel();
        }
    });

    let code = run_with_cancel(config, &cancel).await;
    watcher.abort();
    code
}

/// Run the pipeline until done or until `cancel` fires.
pub async fn run_with_cancel(config: &RunConfig, cancel: &CancellationToken) -> CliResult<i32> {
    let items = load_samples(&config.input).map_err(CliError::Input)?;
    let templates = super::load_templates(&config.templates).map_err(CliError::Input)?;
    tracing::info!(
        input = %config.input.display(),
        items = items.len(),
        templates = templates.len(),
        "loaded samples"
    );
    if config.timeout.is_none() {
        tracing::debug!("no request timeout set; an unresponsive host blocks the run");
    }

    let pipeline = Pipeline::new(
        HttpPool::with_config(&config.pool_config()),
        templates,
        config.run_options(),
    );
    let mut sink = JsonFileSink::new(&config.output);

    let summary = pipeline
        .run(items, &mut sink, cancel)
        .await
        .with_context(|| format!("failed to write results to {}", config.output.display()))?;

    Ok(match summary.outcome {
        RunOutcome::Completed => exit_codes::SUCCESS,
        RunOutcome::Interrupted => exit_codes::INTERRUPTED,
    })
}
