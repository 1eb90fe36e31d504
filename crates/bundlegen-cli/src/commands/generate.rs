use crate::errors::CliError;
use crate::GlobalOpts;
use anyhow::{Context, Result};
use bundlegen_config::{Config, ExtractionMode};
use bundlegen_extract::{config_alias_resolver, generate_with_config};
use bundlegen_logger as logger;
use bundlegen_manifest::{BundleConfig, ConsoleDiagnostics};
use clap::Args;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

#[derive(Args, Debug, Clone)]
pub struct GenerateCommand {
    /// Directory to search for plugin manifests (repeat for several roots)
    #[arg(long = "root", value_name = "DIR", required = true)]
    pub roots: Vec<PathBuf>,

    /// Working directory of the interpreter and context of every bundle
    /// (default: current directory)
    #[arg(long, value_name = "DIR")]
    pub base_dir: Option<PathBuf>,

    /// Evaluate all manifests in a single interpreter process
    #[arg(long)]
    pub batch: bool,

    /// Number of interpreter processes to run at once
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Kill an interpreter process still running after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Interpreter to run instead of the configured one
    #[arg(long, value_name = "PROGRAM")]
    pub interpreter: Option<String>,

    /// Write the configurations to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl GenerateCommand {
    /// Fold command-line flags over the loaded configuration
    fn apply_overrides(&self, config: &mut Config) -> Result<(), CliError> {
        if self.batch {
            config.mode = Some(ExtractionMode::Batch);
        }
        if let Some(jobs) = self.jobs {
            if jobs == 0 {
                return Err(CliError::InvalidFlag {
                    flag: "jobs",
                    reason: "must be at least 1".to_string(),
                });
            }
            config.jobs = Some(jobs);
        }
        if let Some(secs) = self.timeout {
            if secs == 0 {
                return Err(CliError::InvalidFlag {
                    flag: "timeout",
                    reason: "must be at least 1 second".to_string(),
                });
            }
            config.timeout_secs = Some(secs);
        }
        if let Some(ref interpreter) = self.interpreter {
            config.interpreter = Some(interpreter.clone());
        }
        Ok(())
    }
}

pub fn handle_generate(cmd: GenerateCommand, _opts: &GlobalOpts) -> Result<()> {
    debug!("generate: {:?}", cmd);
    let mut config = Config::load().context("Failed to load configuration")?;
    cmd.apply_overrides(&mut config)?;

    let base_dir = match cmd.base_dir {
        Some(ref dir) => dir.clone(),
        None => std::env::current_dir().context("Failed to read the current directory")?,
    };
    logger::debug(&format!("Base directory: {}", base_dir.display()));
    logger::debug(&format!("Extraction mode: {}", config.mode()));

    let resolver = config_alias_resolver(&config);

    logger::spinner_start("Generating bundle configurations");
    let bundles = match generate_with_config(
        &config,
        &cmd.roots,
        &base_dir,
        resolver,
        &ConsoleDiagnostics,
    ) {
        Ok(bundles) => {
            logger::spinner_stop();
            bundles
        }
        Err(e) => {
            logger::spinner_error("Bundle generation failed");
            return Err(e).context("Bundle generation failed");
        }
    };

    write_bundles(&bundles, cmd.output.as_ref())
}

fn write_bundles(bundles: &[BundleConfig], output: Option<&PathBuf>) -> Result<()> {
    let json = serde_json::to_string_pretty(bundles).map_err(CliError::from)?;

    match output {
        Some(path) => {
            fs::write(path, format!("{}\n", json)).map_err(|source| CliError::Output {
                path: path.clone(),
                source,
            })?;
            logger::success(&format!(
                "Wrote {} bundle configuration(s) to {}",
                bundles.len(),
                path.display()
            ));
        }
        None => println!("{}", json),
    }
    Ok(())
}
