use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading, editing or applying configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Could not determine home directory")]
    NoHomeDir,

    #[error("Unknown config key: {0}")]
    UnknownKey(String),

    #[error("Invalid value '{value}' for config key '{key}': {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Interpreter '{0}' not found")]
    InterpreterNotFound(String),

    #[error("Interpreter path does not exist: {0}")]
    InterpreterMissing(PathBuf),
}
