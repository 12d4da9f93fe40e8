//! Configuration inspection commands

use anyhow::{Context, Result};
use settle_core::config::{self, SettleConfig};
use std::path::Path;

/// Print the effective configuration as TOML
pub async fn run_show(path: Option<&Path>) -> Result<()> {
    let config = config::load_or_default(path)
        .context("Failed to load configuration")?;
    print!("{}", config.to_toml()?);
    Ok(())
}

/// Show the config file path and optionally create it
pub async fn run_path(create: bool) -> Result<()> {
    let config_path = config::config_file_path()
        .context("Could not determine config file path")?;

    if create && !config_path.exists() {
        config::save(&SettleConfig::default(), &config_path)?;
        println!("Created config file at: {}", config_path.display());
    } else if config_path.exists() {
        println!("{}", config_path.display());
    } else {
        println!("{}", config_path.display());
        eprintln!("File does not exist. Use --create to create it.");
    }

    Ok(())
}

/// Show example configuration
pub async fn run_example() -> Result<()> {
    print!("{}", config::example_config());
    Ok(())
}
