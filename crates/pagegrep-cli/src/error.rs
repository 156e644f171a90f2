//! Error types and process exit codes for the `pagegrep` binary.

/// Process exit codes.
pub mod exit_codes {
    /// Every work item was processed.
    pub const SUCCESS: i32 = 0;
    /// Any failure not covered below, e.g. an unwritable output file.
    pub const FAILURE: i32 = 1;
    /// The run was interrupted; partial results were saved. Matches the
    /// shell convention for SIGINT (128 + 2) and never collides with clap.
    pub const INTERRUPTED: i32 = 130;
    /// The input samples or template table could not be loaded.
    pub const BAD_INPUT: i32 = 3;
}

/// All errors a command can end with.
#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error("failed to load input: {0}")]
    Input(#[source] pagegrep::HarvestError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Input(_) => exit_codes::BAD_INPUT,
            CliError::Other(_) => exit_codes::FAILURE,
        }
    }
}

pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct() {
        let input = CliError::Input(pagegrep::HarvestError::InvalidInput("bad".into()));
        let other = CliError::Other(anyhow::anyhow!("disk full"));
        assert_eq!(input.exit_code(), exit_codes::BAD_INPUT);
        assert_eq!(other.exit_code(), exit_codes::FAILURE);
        assert_ne!(exit_codes::INTERRUPTED, exit_codes::BAD_INPUT);
        // clap exits with 2 on usage errors.
        assert_ne!(exit_codes::INTERRUPTED, 2);
        assert!(input.to_string().contains("bad"));
    }
}
