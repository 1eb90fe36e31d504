//! Resolve the external interpreter executable

use crate::config::Config;
use crate::errors::ConfigError;
use std::path::{Path, PathBuf};

/// Resolve the interpreter named in the config to an executable path.
///
/// Values containing a path separator are taken as paths and must exist;
/// bare names are looked up on `PATH`.
pub fn resolve_interpreter(config: &Config) -> Result<PathBuf, ConfigError> {
    let name = config.interpreter_name();

    if name.contains('/') || name.contains('\\') {
        let path = Path::new(name);
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        return Err(ConfigError::InterpreterMissing(path.to_path_buf()));
    }

    which::which(name).map_err(|_| ConfigError::InterpreterNotFound(name.to_string()))
}
