//! Implementation of the `flushlog config` command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use crate::domain::models::LoggerConfig;

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Print the built-in default document for this log file instead
    #[arg(long)]
    pub default_for: Option<PathBuf>,
}

pub fn execute(args: ConfigArgs, config_path: Option<&Path>) -> Result<()> {
    let config = match args.default_for {
        Some(log_file) => LoggerConfig::default_for(log_file),
        None => super::load_config(config_path)?,
    };

    let yaml = serde_yaml::to_string(&config).context("Failed to serialize configuration")?;
    print!("{yaml}");
    Ok(())
}
