use std::path::PathBuf;

use thiserror::Error;
use wall_core::CalcError;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Calc(#[from] CalcError),

    #[error("Cannot open log file '{path}': {source}", path = path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to install logger: {0}")]
    Logger(String),
}
