//! Bundle descriptors and the configurations synthesized from them

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Mapping of importable module name -> global reference
pub type Externals = BTreeMap<String, String>;

// =============================================================================
// DESCRIPTOR - raw record emitted by the extraction process
// =============================================================================

/// One bundle as described by a plugin.
///
/// Every field is optional at the parsing boundary so that a descriptor with
/// a missing field can be rejected softly instead of failing the whole
/// extraction. Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleDescriptor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub entry_file: Option<String>,
    #[serde(default)]
    pub module_path: Option<String>,
    #[serde(default)]
    pub stats_file: Option<String>,
    #[serde(default)]
    pub async_file: Option<String>,
    #[serde(default)]
    pub external: Option<bool>,
    #[serde(default)]
    pub core: Option<bool>,
}

impl BundleDescriptor {
    pub fn is_external(&self) -> bool {
        self.external.unwrap_or(false)
    }

    pub fn is_core(&self) -> bool {
        self.core.unwrap_or(false)
    }
}

/// Well-formed JSON that does not have the shape of a descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedDescriptor {
    /// `name`, when it was present as a string
    pub name: Option<String>,
    /// Offending field, or `None` when the value is not an object at all
    pub field: Option<String>,
    pub reason: String,
}

/// Descriptors pulled from one source, tagged with where they came from
#[derive(Debug, Clone, Default)]
pub struct ExtractedDescriptors {
    /// Manifest path (per-manifest mode) or a batch label
    pub origin: String,
    pub descriptors: Vec<BundleDescriptor>,
    pub rejected: Vec<RejectedDescriptor>,
}

// =============================================================================
// BUNDLE CONFIG - handed to the downstream bundler
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleOutput {
    pub path: PathBuf,
    pub filename: String,
    pub public_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library: Option<String>,
}

/// Where the bundler writes its build stats for this bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerConfig {
    pub stats_file: PathBuf,
    pub async_file: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleConfig {
    pub context: PathBuf,
    /// Always exactly one entry: bundle name -> entry source file
    pub entry: BTreeMap<String, PathBuf>,
    pub output: BundleOutput,
    pub tracker_config: TrackerConfig,
    #[serde(default)]
    pub externals: Externals,

    /// Runtime only - set from a `core: true` descriptor
    #[serde(skip)]
    pub is_core: bool,

    /// Runtime only - manifest (or batch label) the bundle came from
    #[serde(skip)]
    pub origin: String,
}

impl BundleConfig {
    /// The single entry key of this bundle
    pub fn name(&self) -> &str {
        self.entry.keys().next().map_or("", String::as_str)
    }
}
