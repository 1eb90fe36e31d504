use crate::GlobalOpts;
use anyhow::{bail, Context, Result};
use bundlegen_config::Config;
use bundlegen_logger as logger;
use clap::Subcommand;
use colored::Colorize;
use std::fs;

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Print the configured values
    Show,
    /// Set a configuration value
    Set { key: String, value: String },
    /// Get or set the path to the config file.
    /// If `new_path` is provided, the CLI will use that file from now on.
    /// If omitted, the CLI will print the current configuration file path.
    Path {
        /// Optional new config path to set
        new_path: Option<String>,
    },
}

pub fn handle_config(action: ConfigAction, opts: &GlobalOpts) -> Result<()> {
    match action {
        ConfigAction::Show => show(opts),
        ConfigAction::Set { key, value } => set(&key, &value),
        ConfigAction::Path { new_path } => path(new_path),
    }
}

fn show(opts: &GlobalOpts) -> Result<()> {
    let config = Config::load().context("Failed to load config")?;

    println!("{}", "Configuration:".bold().green());
    if config.is_empty() {
        if opts.verbosity_level() > 0 {
            println!("  {}", "(empty)".yellow());
        }
        return Ok(());
    }

    for (key, value) in config.values_iter() {
        println!("  {}: {}", key.cyan(), value);
    }
    if !config.aliases.is_empty() {
        println!("  {}:", "aliases".cyan());
        for (id, path) in &config.aliases {
            println!("    {} = {}", id, path);
        }
    }
    Ok(())
}

fn set(key: &str, value: &str) -> Result<()> {
    let mut config = Config::load().context("Failed to load config")?;

    if !Config::known_keys().contains(&key) {
        bail!(
            "Unknown config key: {}. Supported keys: {}",
            key,
            Config::known_keys().join(", ")
        );
    }

    config.set(key, value)?;
    config.save().context("Failed to save config")?;
    logger::success(&format!("Set {} = {}", key, value));
    Ok(())
}

fn path(new_path: Option<String>) -> Result<()> {
    let config_path = Config::path()?;
    let pointer_path = Config::pointer_path()?;
    logger::debug(&format!("Reading config from: {}", config_path.display()));

    match new_path {
        Some(p) => {
            if let Some(parent) = pointer_path.parent() {
                fs::create_dir_all(parent).context("Failed to set config path")?;
            }
            fs::write(&pointer_path, p.as_bytes()).context("Failed to set config path")?;
            logger::success(&format!("Config path set to {}", p));
        }
        None => {
            println!("{}", config_path.display());

            if let Ok(contents) = fs::read_to_string(&pointer_path) {
                let trimmed = contents.trim();
                if !trimmed.is_empty() {
                    println!("{} {}", "overridden-by".cyan(), trimmed);
                }
            }
        }
    }
    Ok(())
}
