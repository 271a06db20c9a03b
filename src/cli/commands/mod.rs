//! CLI command implementations.

pub mod config;
pub mod run;

use std::path::Path;

use anyhow::Result;

use crate::domain::models::LoggerConfig;
use crate::infrastructure::config::ConfigLoader;

/// Load the configuration named on the command line, or the default hierarchy
pub(crate) fn load_config(path: Option<&Path>) -> Result<LoggerConfig> {
    match path {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}
