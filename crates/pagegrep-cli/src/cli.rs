//! Command-line arguments for the `pagegrep` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use pagegrep::pipeline::DEFAULT_PROGRESS_EVERY;

use crate::error::exit_codes;

#[derive(Parser)]
#[command(
    name = "pagegrep",
    about = "pagegrep: fetch web pages and extract regex matches from each",
    version
)]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error). RUST_LOG takes precedence.
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch every sample and write the matches to a JSON file.
    Run {
        /// Input samples (.json, or the line-oriented `> url` layout).
        #[arg(short, long)]
        input: PathBuf,

        /// Output JSON file.
        #[arg(short, long)]
        output: PathBuf,

        /// Template table file. Also reads from PAGEGREP_TEMPLATES.
        #[arg(long)]
        templates: Option<String>,

        /// Drop repeated matches of the same pattern.
        #[arg(long)]
        unique: bool,

        /// Per-request timeout in milliseconds (none by default).
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Log progress every N items.
        #[arg(long, default_value_t = DEFAULT_PROGRESS_EVERY)]
        progress_every: usize,
    },

    /// Write a demo input file.
    Sample {
        /// Number of samples to write.
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,

        /// Destination file.
        #[arg(short, long, default_value = "test.json")]
        output: PathBuf,
    },

    /// Load and resolve an input file without fetching anything.
    Validate {
        /// Input samples.
        #[arg(short, long)]
        input: PathBuf,

        /// Template table file. Also reads from PAGEGREP_TEMPLATES.
        #[arg(long)]
        templates: Option<String>,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

/// Exit code for an argument parsing outcome: `--help` and `--version` exit
/// with success, any usage error with [`exit_codes::FAILURE`].
pub fn parse_error_exit_code(err: &clap::Error) -> i32 {
    if err.use_stderr() {
        exit_codes::FAILURE
    } else {
        exit_codes::SUCCESS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_error_is_failure() {
        let err = Cli::try_parse_from(["pagegrep", "run"]).err().unwrap();
        assert_eq!(parse_error_exit_code(&err), exit_codes::FAILURE);
        assert_ne!(parse_error_exit_code(&err), exit_codes::INTERRUPTED);

        let err = Cli::try_parse_from(["pagegrep", "frobnicate"]).err().unwrap();
        assert_eq!(parse_error_exit_code(&err), exit_codes::FAILURE);
    }

    #[test]
    fn test_help_and_version_succeed() {
        let err = Cli::try_parse_from(["pagegrep", "--help"]).err().unwrap();
        assert_eq!(parse_error_exit_code(&err), exit_codes::SUCCESS);
        let err = Cli::try_parse_from(["pagegrep", "--version"]).err().unwrap();
        assert_eq!(parse_error_exit_code(&err), exit_codes::SUCCESS);
    }

    #[test]
    fn test_run_arguments_parse() {
        let cli = Cli::try_parse_from([
            "pagegrep", "run", "-i", "in.txt", "-o", "out.json", "--unique", "--timeout-ms", "500",
        ])
        .unwrap();
        match cli.command {
            Commands::Run {
                unique,
                timeout_ms,
                progress_every,
                ..
            } => {
                assert!(unique);
                assert_eq!(timeout_ms, Some(500));
                assert_eq!(progress_every, DEFAULT_PROGRESS_EVERY);
            }
            _ => panic!("expected the run subcommand"),
        }
        assert_eq!(cli.log_level, "info");
    }
}
