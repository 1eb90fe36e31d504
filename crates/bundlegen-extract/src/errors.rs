use bundlegen_config::ConfigError;
use bundlegen_manifest::ManifestError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors. Any of these aborts the run without a partial result.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Manifest discovery failed: {0}")]
    Scan(#[from] ManifestError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("Command failed: {command} (exit {status:?})\n{stderr}")]
    CommandFailed {
        command: String,
        status: Option<i32>,
        stderr: String,
    },

    #[error("Command timed out after {secs}s: {command}")]
    Timeout { command: String, secs: u64 },

    #[error("Output of `{command}` is not valid UTF-8")]
    NonUtf8Output { command: String },

    #[error("Malformed descriptor output for {origin}: {source}")]
    Malformed {
        origin: String,
        #[source]
        source: ManifestError,
    },

    #[error("Base directory {path} is not accessible: {source}")]
    BaseDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot derive a module identifier for {0}")]
    ModulePath(PathBuf),

    #[error("Failed to build extraction thread pool: {0}")]
    ThreadPool(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_failed_display() {
        let err = ExtractError::CommandFailed {
            command: "python3 -m bundlegen_describe learn.bundle_plugin".to_string(),
            status: Some(2),
            stderr: "ImportError".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Command failed: python3 -m bundlegen_describe learn.bundle_plugin (exit Some(2))\nImportError"
        );
    }
}
