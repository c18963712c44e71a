mod commands;
pub mod exit_codes;
pub mod output;

pub use commands::{Cli, Commands, ConfigCommands};
pub use output::OutputMode;

use anyhow::Result;

use crate::error::{ComputationError, Error, FormatError, PersistenceError, RateError};

/// failures that belong to the command line rather than a run stage
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    InvalidArgs(String),

    #[error("{0:#}")]
    Config(anyhow::Error),
}

pub fn run(cli: Cli) -> Result<()> {
    commands::execute(cli)
}

/// process exit code for a failed command
///
/// the first typed error found along the cause chain decides
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<Error>() {
            return e.exit_code();
        }
        if let Some(e) = cause.downcast_ref::<CliError>() {
            return match e {
                CliError::InvalidArgs(_) => exit_codes::INVALID_ARGS,
                CliError::Config(_) => exit_codes::CONFIG_ERROR,
            };
        }
        if cause.is::<FormatError>() {
            return exit_codes::FORMAT_ERROR;
        }
        if cause.is::<RateError>() {
            return exit_codes::RATE_UNAVAILABLE;
        }
        if cause.is::<ComputationError>() {
            return exit_codes::COMPUTATION_ERROR;
        }
        if cause.is::<PersistenceError>() {
            return exit_codes::PERSISTENCE_ERROR;
        }
    }
    exit_codes::ERROR
}
