//! Command-line interface
//!
//! `flushlog run` emits records through the configured pipeline and
//! `flushlog config` prints the effective configuration.

pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::config::ConfigArgs;
use commands::run::RunArgs;

#[derive(Parser)]
#[command(name = "flushlog")]
#[command(about = "Structured logging with buffered, rotation-aware file sinks", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Logger configuration file (defaults to logger-conf.yaml plus FLUSHLOG_* overrides)
    #[arg(short, long, global = true, env = "FLUSHLOG_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Emit log records through the configured pipeline
    Run(RunArgs),

    /// Print the effective configuration as YAML
    Config(ConfigArgs),
}

/// Report a command failure on stderr and exit non-zero
pub fn handle_error(err: &anyhow::Error) -> ! {
    eprintln!("Error: {err:#}");
    std::process::exit(1);
}
