use crate::GlobalOpts;
use anyhow::{Context, Result};
use bundlegen_config::Config;
use bundlegen_extract::{canonical_base_dir, canonical_roots, module_identifier};
use bundlegen_logger as logger;
use bundlegen_manifest::scan_manifests;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug, Clone)]
pub struct ScanCommand {
    /// Directory to search for plugin manifests (repeat for several roots)
    #[arg(long = "root", value_name = "DIR", required = true)]
    pub roots: Vec<PathBuf>,

    /// Also print the module identifier each manifest is imported as,
    /// relative to this directory
    #[arg(long, value_name = "DIR")]
    pub base_dir: Option<PathBuf>,
}

pub fn handle_scan(cmd: ScanCommand, _opts: &GlobalOpts) -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    let manifests = scan_manifests(&cmd.roots, config.manifest_filename())
        .context("Manifest scan failed")?;

    if manifests.is_empty() {
        logger::warn(&format!(
            "No '{}' manifests found",
            config.manifest_filename()
        ));
        return Ok(());
    }

    match cmd.base_dir {
        Some(ref base_dir) => {
            let base_dir = canonical_base_dir(base_dir)?;
            let roots = canonical_roots(&cmd.roots)?;
            for manifest in &manifests {
                let canonical = manifest
                    .canonicalize()
                    .with_context(|| format!("Cannot resolve {}", manifest.display()))?;
                let module = module_identifier(&canonical, &base_dir, &roots)?;
                println!("{}\t{}", manifest.display(), module);
            }
        }
        None => {
            for manifest in &manifests {
                println!("{}", manifest.display());
            }
        }
    }

    logger::info(&format!("Found {} manifest(s)", manifests.len()));
    Ok(())
}
