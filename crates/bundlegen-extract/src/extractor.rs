//! Descriptor extraction through an external interpreter

use crate::errors::ExtractError;
use crate::module_id::module_identifier;
use crate::process::{self, Invocation};
use bundlegen_config::config::{MODULE_PLACEHOLDER, ROOTS_PLACEHOLDER};
use bundlegen_config::{resolve_interpreter, Config, ExtractionMode};
use bundlegen_manifest::{parse_descriptor_array, parse_descriptor_lines, ExtractedDescriptors};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Turns discovered manifests into raw descriptors
pub trait Extract {
    /// Extract descriptors for `manifests` found under `roots`.
    ///
    /// Results come back in manifest order. Any failure is fatal for the run.
    fn extract(
        &self,
        roots: &[PathBuf],
        manifests: &[PathBuf],
    ) -> Result<Vec<ExtractedDescriptors>, ExtractError>;
}

/// Runs the configured interpreter, once per manifest or once per run
#[derive(Debug, Clone)]
pub struct InterpreterExtractor {
    pub interpreter: PathBuf,
    pub mode: ExtractionMode,
    pub per_manifest_args: Vec<String>,
    pub batch_args: Vec<String>,
    /// Working directory of the interpreter and anchor for module identifiers
    pub base_dir: PathBuf,
    pub jobs: usize,
    pub timeout: Option<Duration>,
}

impl InterpreterExtractor {
    pub fn new(interpreter: impl Into<PathBuf>, base_dir: impl Into<PathBuf>) -> Self {
        let defaults = Config::default();
        InterpreterExtractor {
            interpreter: interpreter.into(),
            mode: ExtractionMode::PerManifest,
            per_manifest_args: defaults.per_manifest_args(),
            batch_args: defaults.batch_args(),
            base_dir: base_dir.into(),
            jobs: 1,
            timeout: None,
        }
    }

    /// Build from configuration, resolving the interpreter on `PATH`
    pub fn from_config(config: &Config, base_dir: &Path) -> Result<Self, ExtractError> {
        let interpreter = resolve_interpreter(config)?;
        debug!("Using interpreter {:?}", interpreter);
        Ok(InterpreterExtractor {
            interpreter,
            mode: config.mode(),
            per_manifest_args: config.per_manifest_args(),
            batch_args: config.batch_args(),
            base_dir: base_dir.to_path_buf(),
            jobs: config.jobs(),
            timeout: config.timeout(),
        })
    }

    pub fn with_mode(mut self, mode: ExtractionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_per_manifest_args(mut self, args: Vec<String>) -> Self {
        self.per_manifest_args = args;
        self
    }

    pub fn with_batch_args(mut self, args: Vec<String>) -> Self {
        self.batch_args = args;
        self
    }

    /// Invocation describing a single manifest
    pub fn manifest_invocation(
        &self,
        manifest: &Path,
        roots: &[PathBuf],
    ) -> Result<Invocation, ExtractError> {
        let module = module_identifier(manifest, &self.base_dir, roots)?;
        let args = self
            .per_manifest_args
            .iter()
            .map(|arg| arg.replace(MODULE_PLACEHOLDER, &module))
            .collect();
        Ok(process::invocation(&self.interpreter, args, &self.base_dir))
    }

    /// Invocation describing every plugin under `roots`
    pub fn batch_invocation(&self, roots: &[PathBuf]) -> Invocation {
        let mut args = Vec::with_capacity(self.batch_args.len() + roots.len());
        for arg in &self.batch_args {
            if arg == ROOTS_PLACEHOLDER {
                args.extend(roots.iter().map(|r| r.display().to_string()));
            } else {
                args.push(arg.clone());
            }
        }
        process::invocation(&self.interpreter, args, &self.base_dir)
    }

    /// Run the interpreter for one manifest; stdout is newline-delimited JSON
    pub fn extract_manifest(
        &self,
        manifest: &Path,
        roots: &[PathBuf],
    ) -> Result<ExtractedDescriptors, ExtractError> {
        let invocation = self.manifest_invocation(manifest, roots)?;
        let stdout = process::run(&invocation, self.timeout)?;
        let origin = manifest.display().to_string();
        let records = parse_descriptor_lines(&stdout).map_err(|source| ExtractError::Malformed {
            origin: origin.clone(),
            source,
        })?;

        let mut extracted = ExtractedDescriptors {
            origin,
            ..Default::default()
        };
        for record in records {
            match record {
                Ok(descriptor) => extracted.descriptors.push(descriptor),
                Err(rejected) => extracted.rejected.push(rejected),
            }
        }
        debug!(
            "{} declared {} bundle(s), {} rejected",
            extracted.origin,
            extracted.descriptors.len(),
            extracted.rejected.len()
        );
        Ok(extracted)
    }

    /// Run the interpreter once for all roots; stdout is a JSON array.
    ///
    /// Each descriptor is attributed to its `module_path` (or the batch
    /// command when it has none) so collisions can still be traced.
    pub fn extract_batch(&self, roots: &[PathBuf]) -> Result<Vec<ExtractedDescriptors>, ExtractError> {
        let invocation = self.batch_invocation(roots);
        let command = invocation.display();
        let stdout = process::run(&invocation, self.timeout)?;
        let records = parse_descriptor_array(&stdout).map_err(|source| {
            ExtractError::Malformed {
                origin: command.clone(),
                source,
            }
        })?;
        info!("Batch extraction returned {} descriptor(s)", records.len());

        Ok(records
            .into_iter()
            .map(|record| match record {
                Ok(descriptor) => ExtractedDescriptors {
                    origin: descriptor
                        .module_path
                        .clone()
                        .unwrap_or_else(|| command.clone()),
                    descriptors: vec![descriptor],
                    rejected: Vec::new(),
                },
                Err(rejected) => ExtractedDescriptors {
                    origin: command.clone(),
                    descriptors: Vec::new(),
                    rejected: vec![rejected],
                },
            })
            .collect())
    }

    fn extract_each(
        &self,
        roots: &[PathBuf],
        manifests: &[PathBuf],
    ) -> Result<Vec<ExtractedDescriptors>, ExtractError> {
        if self.jobs <= 1 || manifests.len() <= 1 {
            return manifests
                .iter()
                .map(|manifest| self.extract_manifest(manifest, roots))
                .collect();
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()
            .map_err(|e| ExtractError::ThreadPool(e.to_string()))?;

        // Indexed collect keeps manifest order.
        pool.install(|| {
            manifests
                .par_iter()
                .map(|manifest| self.extract_manifest(manifest, roots))
                .collect()
        })
    }
}

impl Extract for InterpreterExtractor {
    fn extract(
        &self,
        roots: &[PathBuf],
        manifests: &[PathBuf],
    ) -> Result<Vec<ExtractedDescriptors>, ExtractError> {
        match self.mode {
            ExtractionMode::PerManifest => self.extract_each(roots, manifests),
            ExtractionMode::Batch => self.extract_batch(roots),
        }
    }
}
