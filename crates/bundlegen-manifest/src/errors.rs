use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors raised while discovering manifests or reading descriptors
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Root directory not found: {0}")]
    RootNotFound(PathBuf),

    #[error("Failed to read directory {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Malformed descriptor on line {line}: {source}")]
    MalformedLine {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Malformed descriptor array: {0}")]
    MalformedArray(#[source] serde_json::Error),
}
