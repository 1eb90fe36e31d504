use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_INTERPRETER: &str = "python3";
pub const DEFAULT_MANIFEST_FILENAME: &str = "bundle_plugin.py";
pub const DEFAULT_CORE_LIBRARY: &str = "coreGlobal";
pub const DEFAULT_PUBLIC_PATH_ROOT: &str = "/static/";
pub const DEFAULT_DESCRIBE_MODULE: &str = "bundlegen_describe";

/// Placeholder replaced by the dotted module identifier in per-manifest args
pub const MODULE_PLACEHOLDER: &str = "{module}";
/// Argument expanded into one argument per root directory in batch args
pub const ROOTS_PLACEHOLDER: &str = "{roots}";

const CONFIG_ENV: &str = "BUNDLEGEN_CONFIG";
const CONFIG_FILE_NAME: &str = "bundlegen.toml";
const POINTER_FILE_NAME: &str = ".bundlegen_config_path";

const KNOWN_KEYS: &[&str] = &[
    "interpreter",
    "manifest-filename",
    "mode",
    "per-manifest-args",
    "batch-args",
    "core-library",
    "public-path-root",
    "jobs",
    "timeout-secs",
];

/// How descriptors are pulled out of the plugin tree
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractionMode {
    /// One interpreter process per discovered manifest
    #[default]
    PerManifest,
    /// A single interpreter process for all roots
    Batch,
}

impl fmt::Display for ExtractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionMode::PerManifest => write!(f, "per-manifest"),
            ExtractionMode::Batch => write!(f, "batch"),
        }
    }
}

impl FromStr for ExtractionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "per-manifest" => Ok(ExtractionMode::PerManifest),
            "batch" => Ok(ExtractionMode::Batch),
            other => Err(format!(
                "unknown extraction mode '{}' (expected 'per-manifest' or 'batch')",
                other
            )),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interpreter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest_filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<ExtractionMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_manifest_args: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_args: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub core_library: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_path_root: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jobs: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// Library id -> dotted path under the core library
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub aliases: BTreeMap<String, String>,
}

impl Config {
    /// Resolve the config file location.
    ///
    /// `BUNDLEGEN_CONFIG` wins, then a pointer file next to the default
    /// location, then `~/.config/bundlegen/bundlegen.toml`.
    pub fn path() -> Result<PathBuf, ConfigError> {
        if let Ok(env_path) = std::env::var(CONFIG_ENV) {
            let trimmed = env_path.trim();
            if !trimmed.is_empty() {
                return Ok(PathBuf::from(trimmed));
            }
        }

        let default = Self::default_dir()?.join(CONFIG_FILE_NAME);

        let pointer = Self::pointer_path()?;
        if pointer.exists() {
            if let Ok(contents) = fs::read_to_string(&pointer) {
                let trimmed = contents.trim();
                if !trimmed.is_empty() {
                    return Ok(PathBuf::from(trimmed));
                }
            }
        }

        Ok(default)
    }

    /// Location of the pointer file that redirects the config path
    pub fn pointer_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::default_dir()?.join(POINTER_FILE_NAME))
    }

    fn default_dir() -> Result<PathBuf, ConfigError> {
        #[cfg(not(target_os = "windows"))]
        let dir = dirs::home_dir()
            .ok_or(ConfigError::NoHomeDir)?
            .join(".config")
            .join("bundlegen");

        #[cfg(target_os = "windows")]
        let dir = dirs::config_dir()
            .ok_or(ConfigError::NoHomeDir)?
            .join("bundlegen");

        Ok(dir)
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path. A missing file yields the default config.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "interpreter" => self.interpreter.clone(),
            "manifest-filename" => self.manifest_filename.clone(),
            "mode" => self.mode.map(|m| m.to_string()),
            "per-manifest-args" => self.per_manifest_args.as_ref().map(|a| a.join(" ")),
            "batch-args" => self.batch_args.as_ref().map(|a| a.join(" ")),
            "core-library" => self.core_library.clone(),
            "public-path-root" => self.public_path_root.clone(),
            "jobs" => self.jobs.map(|j| j.to_string()),
            "timeout-secs" => self.timeout_secs.map(|t| t.to_string()),
            _ => None,
        }
    }

    /// Set a key from its string form. Argument lists are whitespace separated.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        };

        match key {
            "interpreter" => self.interpreter = Some(value.to_string()),
            "manifest-filename" => {
                if value.contains('/') || value.contains('\\') || value.trim().is_empty() {
                    return Err(invalid("expected a bare file name"));
                }
                self.manifest_filename = Some(value.to_string());
            }
            "mode" => self.mode = Some(value.parse().map_err(|e: String| invalid(&e))?),
            "per-manifest-args" => {
                self.per_manifest_args = Some(value.split_whitespace().map(String::from).collect());
            }
            "batch-args" => {
                self.batch_args = Some(value.split_whitespace().map(String::from).collect());
            }
            "core-library" => self.core_library = Some(value.to_string()),
            "public-path-root" => self.public_path_root = Some(value.to_string()),
            "jobs" => {
                let jobs: usize = value
                    .parse()
                    .map_err(|_| invalid("expected a positive integer"))?;
                if jobs == 0 {
                    return Err(invalid("expected a positive integer"));
                }
                self.jobs = Some(jobs);
            }
            "timeout-secs" => {
                self.timeout_secs = Some(
                    value
                        .parse()
                        .map_err(|_| invalid("expected a number of seconds"))?,
                );
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    pub fn known_keys() -> &'static [&'static str] {
        KNOWN_KEYS
    }

    pub fn is_empty(&self) -> bool {
        KNOWN_KEYS.iter().all(|key| self.get(key).is_none()) && self.aliases.is_empty()
    }

    /// Explicitly configured values, in display order
    pub fn values_iter(&self) -> Vec<(&'static str, String)> {
        KNOWN_KEYS
            .iter()
            .filter_map(|key| self.get(key).map(|value| (*key, value)))
            .collect()
    }

    pub fn interpreter_name(&self) -> &str {
        self.interpreter.as_deref().unwrap_or(DEFAULT_INTERPRETER)
    }

    pub fn manifest_filename(&self) -> &str {
        self.manifest_filename
            .as_deref()
            .unwrap_or(DEFAULT_MANIFEST_FILENAME)
    }

    pub fn mode(&self) -> ExtractionMode {
        self.mode.unwrap_or_default()
    }

    pub fn per_manifest_args(&self) -> Vec<String> {
        self.per_manifest_args.clone().unwrap_or_else(|| {
            vec![
                "-m".to_string(),
                DEFAULT_DESCRIBE_MODULE.to_string(),
                MODULE_PLACEHOLDER.to_string(),
            ]
        })
    }

    pub fn batch_args(&self) -> Vec<String> {
        self.batch_args.clone().unwrap_or_else(|| {
            vec![
                "-m".to_string(),
                DEFAULT_DESCRIBE_MODULE.to_string(),
                "--all".to_string(),
                ROOTS_PLACEHOLDER.to_string(),
            ]
        })
    }

    pub fn core_library(&self) -> &str {
        self.core_library.as_deref().unwrap_or(DEFAULT_CORE_LIBRARY)
    }

    pub fn public_path_root(&self) -> &str {
        self.public_path_root
            .as_deref()
            .unwrap_or(DEFAULT_PUBLIC_PATH_ROOT)
    }

    pub fn jobs(&self) -> usize {
        self.jobs.unwrap_or(1).max(1)
    }

    /// Per-process timeout; unset or zero means none
    pub fn timeout(&self) -> Option<std::time::Duration> {
        self.timeout_secs
            .filter(|secs| *secs > 0)
            .map(std::time::Duration::from_secs)
    }
}
