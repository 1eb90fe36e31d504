//! One discovery-and-synthesis pass
//!
//! scan -> extract -> transform -> aggregate. Per-descriptor problems are
//! reported through [`Diagnostics`] and never fail the run; scan and
//! extraction failures do, and no partial result is returned.

use crate::errors::ExtractError;
use crate::extractor::{Extract, InterpreterExtractor};
use bundlegen_config::{resolve_aliases, Config};
use bundlegen_logger as logger;
use bundlegen_manifest::{
    reject_descriptor, scan_manifests, transform_descriptor, BundleAggregator, BundleConfig,
    ConsoleDiagnostics, Diagnostics, Externals, ManifestError, TransformOptions,
};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Settings shared by every stage of a run
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub manifest_filename: String,
    pub transform: TransformOptions,
}

impl PipelineSettings {
    pub fn from_config(config: &Config, base_dir: &Path) -> Self {
        PipelineSettings {
            manifest_filename: config.manifest_filename().to_string(),
            transform: TransformOptions::new(base_dir, config.core_library())
                .with_public_path_root(config.public_path_root()),
        }
    }
}

/// Run the full pipeline with an explicit extractor and diagnostics sink
pub fn run_pipeline<F>(
    roots: &[PathBuf],
    extractor: &dyn Extract,
    settings: &PipelineSettings,
    resolve_aliases: F,
    diagnostics: &dyn Diagnostics,
) -> Result<Vec<BundleConfig>, ExtractError>
where
    F: Fn(&str) -> Externals,
{
    let roots = canonical_roots(roots)?;
    let roots = roots.as_slice();

    logger::step("Scanning for plugin manifests");
    let manifests = scan_manifests(roots, &settings.manifest_filename)?;
    if manifests.is_empty() {
        diagnostics.warn(&format!(
            "No '{}' manifests found under {} root(s)",
            settings.manifest_filename,
            roots.len()
        ));
    } else {
        diagnostics.info(&format!("Found {} plugin manifest(s)", manifests.len()));
    }

    logger::step("Extracting bundle descriptors");
    let extracted = extractor.extract(roots, &manifests)?;

    logger::step("Building bundle configurations");
    let mut aggregator = BundleAggregator::new();
    let mut dropped = 0usize;
    for source in &extracted {
        for rejected in &source.rejected {
            reject_descriptor(rejected, &source.origin, diagnostics);
            dropped += 1;
        }
        for descriptor in &source.descriptors {
            match transform_descriptor(descriptor, &source.origin, &settings.transform, diagnostics)
            {
                Some(bundle) => aggregator.add(bundle, diagnostics),
                None => dropped += 1,
            }
        }
    }
    debug!(
        "{} bundle(s) accepted, {} descriptor(s) dropped",
        aggregator.bundles().len(),
        dropped
    );

    let bundles = aggregator.finish(resolve_aliases, diagnostics);
    diagnostics.info(&format!("Generated {} bundle configuration(s)", bundles.len()));
    Ok(bundles)
}

/// Run the pipeline from a configuration, logging to the console
pub fn generate_with_config<F>(
    config: &Config,
    roots: &[PathBuf],
    base_dir: &Path,
    resolve_aliases: F,
    diagnostics: &dyn Diagnostics,
) -> Result<Vec<BundleConfig>, ExtractError>
where
    F: Fn(&str) -> Externals,
{
    let base_dir = canonical_base_dir(base_dir)?;
    let extractor = InterpreterExtractor::from_config(config, &base_dir)?;
    let settings = PipelineSettings::from_config(config, &base_dir);
    run_pipeline(roots, &extractor, &settings, resolve_aliases, diagnostics)
}

/// Canonical form of every root, so module identifiers never see `..` or
/// symlinked prefixes. A root that cannot be resolved is a scan error.
pub fn canonical_roots(roots: &[PathBuf]) -> Result<Vec<PathBuf>, ExtractError> {
    roots
        .iter()
        .map(|root| {
            root.canonicalize()
                .map_err(|_| ExtractError::Scan(ManifestError::RootNotFound(root.clone())))
        })
        .collect()
}

/// Canonical form of the base directory
pub fn canonical_base_dir(base_dir: &Path) -> Result<PathBuf, ExtractError> {
    base_dir
        .canonicalize()
        .map_err(|source| ExtractError::BaseDir {
            path: base_dir.to_path_buf(),
            source,
        })
}

/// Discover plugins under `roots` and synthesize their bundle configurations.
///
/// Uses the configuration file (or defaults when there is none). The alias
/// resolver receives the core bundle's library token.
pub fn generate<F>(
    roots: &[PathBuf],
    base_dir: &Path,
    resolve_aliases: F,
) -> Result<Vec<BundleConfig>, ExtractError>
where
    F: Fn(&str) -> Externals,
{
    let config = Config::load()?;
    generate_with_config(&config, roots, base_dir, resolve_aliases, &ConsoleDiagnostics)
}

/// Alias resolver backed by the configured alias table
pub fn config_alias_resolver(config: &Config) -> impl Fn(&str) -> Externals {
    let table = config.alias_table();
    move |core_library: &str| resolve_aliases(&table, core_library)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bundlegen_manifest::{BundleDescriptor, ExtractedDescriptors, RecordingDiagnostics};
    use std::cell::Cell;
    use std::fs;
    use tempfile::TempDir;

    /// Returns canned descriptors per manifest directory name
    struct CannedExtractor {
        by_dir: Vec<(&'static str, Vec<BundleDescriptor>)>,
    }

    impl Extract for CannedExtractor {
        fn extract(
            &self,
            _roots: &[PathBuf],
            manifests: &[PathBuf],
        ) -> Result<Vec<ExtractedDescriptors>, ExtractError> {
            Ok(manifests
                .iter()
                .map(|manifest| {
                    let dir = manifest
                        .parent()
                        .and_then(|p| p.file_name())
                        .and_then(|n| n.to_str())
                        .unwrap_or_default();
                    let descriptors = self
                        .by_dir
                        .iter()
                        .find(|(name, _)| *name == dir)
                        .map(|(_, d)| d.clone())
                        .unwrap_or_default();
                    ExtractedDescriptors {
                        origin: manifest.display().to_string(),
                        descriptors,
                        rejected: Vec::new(),
                    }
                })
                .collect())
        }
    }

    fn descriptor(name: &str) -> BundleDescriptor {
        BundleDescriptor {
            name: Some(name.to_string()),
            entry_file: Some("app.js".to_string()),
            module_path: Some(format!("plugins/{}", name)),
            stats_file: Some("stats.json".to_string()),
            async_file: Some("async.json".to_string()),
            ..Default::default()
        }
    }

    fn tree(dirs: &[&str]) -> Option<(TempDir, PathBuf)> {
        let temp_dir = TempDir::new().ok()?;
        let root = temp_dir.path().join("plugins");
        for dir in dirs {
            fs::create_dir_all(root.join(dir)).ok()?;
            fs::write(root.join(dir).join("bundle_plugin.py"), "").ok()?;
        }
        Some((temp_dir, root))
    }

    fn settings(base: &Path) -> PipelineSettings {
        PipelineSettings {
            manifest_filename: "bundle_plugin.py".to_string(),
            transform: TransformOptions::new(base, "coreGlobal"),
        }
    }

    #[test]
    fn test_drops_invalid_descriptor_and_continues() {
        let Some((temp_dir, root)) = tree(&["a", "b"]) else {
            return;
        };
        let mut invalid = descriptor("broken");
        invalid.async_file = None;
        let extractor = CannedExtractor {
            by_dir: vec![("a", vec![invalid]), ("b", vec![descriptor("fine")])],
        };
        let diagnostics = RecordingDiagnostics::new();

        let result = run_pipeline(
            &[root],
            &extractor,
            &settings(temp_dir.path()),
            |_| Externals::new(),
            &diagnostics,
        );

        assert!(result.is_ok());
        let bundles = result.unwrap_or_default();
        assert_eq!(bundles.len(), 1);
        assert_eq!(bundles[0].name(), "fine");
        assert_eq!(diagnostics.errors().len(), 1);
    }

    #[test]
    fn test_resolver_not_called_without_core() {
        let Some((temp_dir, root)) = tree(&["a"]) else {
            return;
        };
        let extractor = CannedExtractor {
            by_dir: vec![("a", vec![descriptor("learn")])],
        };
        let calls = Cell::new(0);
        let diagnostics = RecordingDiagnostics::new();

        let bundles = run_pipeline(
            &[root],
            &extractor,
            &settings(temp_dir.path()),
            |_| {
                calls.set(calls.get() + 1);
                Externals::new()
            },
            &diagnostics,
        )
        .unwrap_or_default();

        assert_eq!(bundles.len(), 1);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_empty_tree_warns_and_returns_nothing() {
        let Some((temp_dir, root)) = tree(&[]) else {
            return;
        };
        let _ = fs::create_dir_all(&root);
        let extractor = CannedExtractor { by_dir: Vec::new() };
        let diagnostics = RecordingDiagnostics::new();

        let result = run_pipeline(
            &[root],
            &extractor,
            &settings(temp_dir.path()),
            |_| Externals::new(),
            &diagnostics,
        );
        assert!(result.is_ok_and(|b| b.is_empty()));
        assert_eq!(diagnostics.warnings().len(), 1);
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let extractor = CannedExtractor { by_dir: Vec::new() };
        let diagnostics = RecordingDiagnostics::new();
        let result = run_pipeline(
            &[PathBuf::from("/tmp/bundlegen_missing_root_67890")],
            &extractor,
            &settings(Path::new("/tmp")),
            |_| Externals::new(),
            &diagnostics,
        );
        assert!(matches!(result, Err(ExtractError::Scan(_))));
    }

    #[test]
    fn test_config_alias_resolver_uses_core_token() {
        let resolver = config_alias_resolver(&Config::default());
        let aliases = resolver("appGlobal");
        assert_eq!(
            aliases.get("vuex").map(String::as_str),
            Some("appGlobal.lib.vuex")
        );
    }
}
