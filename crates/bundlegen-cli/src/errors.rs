//! Errors raised by the command layer itself

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to serialize bundle configurations: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid value for --{flag}: {reason}")]
    InvalidFlag { flag: &'static str, reason: String },
}
