//! CLI error types and exit-code mapping.

use mht_core::MhtError;
use thiserror::Error;

/// Everything that can go wrong between the command line and the tracker.
#[derive(Debug, Error)]
pub enum CliError {
    /// A command-line path failed validation (missing file, wrong extension).
    #[error("{0}")]
    InvalidArgument(String),

    /// The parameter file is malformed or incomplete.
    #[error("parameter file error: {0}")]
    ParamsFile(String),

    /// Tracker-level input validation failed.
    #[error(transparent)]
    Tracker(#[from] MhtError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Input validation failures exit 2; runtime I/O failures exit 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgument(_) | CliError::ParamsFile(_) | CliError::Tracker(_) => 2,
            CliError::Csv(_) | CliError::Io(_) => 1,
        }
    }
}
