//! pagegrep: batch regex extraction over a list of web pages.

use std::time::Duration;

use clap::{CommandFactory, Parser};

use pagegrep_cli::cli::{parse_error_exit_code, Cli, Commands};
use pagegrep_cli::commands;
use pagegrep_cli::config::{resolve_templates_path, RunConfig};
use pagegrep_cli::error::exit_codes;

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            std::process::exit(parse_error_exit_code(&e));
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Run {
            input,
            output,
            templates,
            unique,
            timeout_ms,
            progress_every,
        } => {
            let config = RunConfig {
                input,
                output,
                templates: resolve_templates_path(templates.as_deref()),
                unique,
                timeout: timeout_ms.map(Duration::from_millis),
                progress_every,
            };
            commands::run::run(&config).await
        }

        Commands::Sample { count, output } => commands::sample::run(count, &output),

        Commands::Validate { input, templates } => {
            commands::validate::run(&input, &resolve_templates_path(templates.as_deref()))
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "pagegrep", &mut std::io::stdout());
            Ok(exit_codes::SUCCESS)
        }
    };

    let code = match result {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e:#}");
            e.exit_code()
        }
    };
    std::process::exit(code);
}
