//! Configuration for bundlegen
//!
//! The configuration lives in a TOML file (`bundlegen.toml`). Every key is
//! optional; accessors on [`Config`] fall back to the built-in defaults.

pub mod aliases;
pub mod config;
pub mod errors;
pub mod interpreter;

pub use aliases::{default_aliases, resolve_aliases};
pub use config::{Config, ExtractionMode};
pub use errors::ConfigError;
pub use interpreter::resolve_interpreter;
