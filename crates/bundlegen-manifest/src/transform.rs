//! Descriptor validation and conversion into bundle configurations

use crate::diagnostics::Diagnostics;
use crate::types::{
    BundleConfig, BundleDescriptor, BundleOutput, Externals, RejectedDescriptor, TrackerConfig,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const OUTPUT_DIR: &str = "build";
pub const OUTPUT_FILENAME: &str = "[name]-[chunkhash].js";

/// Run-wide settings the transformer needs
#[derive(Debug, Clone)]
pub struct TransformOptions {
    pub base_dir: PathBuf,
    /// Global name the core bundle is exposed under
    pub core_library: String,
    pub public_path_root: String,
}

impl TransformOptions {
    pub fn new(base_dir: impl Into<PathBuf>, core_library: impl Into<String>) -> Self {
        TransformOptions {
            base_dir: base_dir.into(),
            core_library: core_library.into(),
            public_path_root: "/static/".to_string(),
        }
    }

    pub fn with_public_path_root(mut self, root: impl Into<String>) -> Self {
        self.public_path_root = root.into();
        self
    }

    fn public_path(&self, name: &str) -> String {
        let root = self.public_path_root.trim_end_matches('/');
        format!("{}/{}/", root, name)
    }
}

/// A validated descriptor: its bundle config and, for external bundles, the
/// name to register
#[derive(Debug, Clone)]
pub struct TransformedBundle {
    pub config: BundleConfig,
    pub external: Option<String>,
}

/// Validate a descriptor and build its bundle config.
///
/// Returns `None` and reports an error when a required field is missing or
/// empty. Fields are checked in the order name, entry_file, stats_file,
/// module_path, async_file; only the first missing one is reported.
pub fn transform_descriptor(
    descriptor: &BundleDescriptor,
    origin: &str,
    options: &TransformOptions,
    diagnostics: &dyn Diagnostics,
) -> Option<TransformedBundle> {
    let label = present(&descriptor.name).unwrap_or("<unnamed>");
    let missing = |field: &str| {
        diagnostics.error(&format!(
            "Bundle descriptor '{}' from {} is missing required field '{}', skipping",
            label, origin, field
        ));
    };

    let Some(name) = present(&descriptor.name) else {
        missing("name");
        return None;
    };
    let Some(entry_file) = present(&descriptor.entry_file) else {
        missing("entry_file");
        return None;
    };
    let Some(stats_file) = present(&descriptor.stats_file) else {
        missing("stats_file");
        return None;
    };
    let Some(module_path) = present(&descriptor.module_path) else {
        missing("module_path");
        return None;
    };
    let Some(async_file) = present(&descriptor.async_file) else {
        missing("async_file");
        return None;
    };

    let module_path = Path::new(module_path);
    let external = descriptor.is_external().then(|| name.to_string());

    let library = if descriptor.is_core() {
        Some(options.core_library.clone())
    } else {
        external.clone()
    };

    let config = BundleConfig {
        context: options.base_dir.clone(),
        entry: BTreeMap::from([(name.to_string(), module_path.join(entry_file))]),
        output: BundleOutput {
            path: module_path.join(OUTPUT_DIR),
            filename: OUTPUT_FILENAME.to_string(),
            public_path: options.public_path(name),
            library,
        },
        tracker_config: TrackerConfig {
            stats_file: PathBuf::from(stats_file),
            async_file: PathBuf::from(async_file),
        },
        externals: Externals::new(),
        is_core: descriptor.is_core(),
        origin: origin.to_string(),
    };

    Some(TransformedBundle { config, external })
}

/// Report a descriptor whose JSON did not have the expected shape. It is
/// skipped the same way as one with a missing field.
pub fn reject_descriptor(
    rejected: &RejectedDescriptor,
    origin: &str,
    diagnostics: &dyn Diagnostics,
) {
    let label = rejected.name.as_deref().unwrap_or("<unnamed>");
    let message = match rejected.field {
        Some(ref field) => format!(
            "Bundle descriptor '{}' from {} has an invalid field '{}' ({}), skipping",
            label, origin, field, rejected.reason
        ),
        None => format!(
            "Bundle descriptor from {} is invalid ({}), skipping",
            origin, rejected.reason
        ),
    };
    diagnostics.error(&message);
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|value| !value.trim().is_empty())
}
