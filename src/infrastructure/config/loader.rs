use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::LoggerConfig;
use crate::infrastructure::logging::parse_level;

/// Default configuration file, relative to the working directory
pub const DEFAULT_CONFIG_FILE: &str = "logger-conf.yaml";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid log level in core {core}: {level}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel { core: usize, level: String },

    #[error("Invalid stacktrace level in core {core}: {level}")]
    InvalidStacktraceLevel { core: usize, level: String },

    #[error("Log file {0} is used by more than one core")]
    DuplicateSinkPath(PathBuf),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. logger-conf.yaml in the working directory
    /// 3. Environment variables (FLUSHLOG_* prefix, `__` separates nested keys)
    pub fn load() -> Result<LoggerConfig> {
        let config: LoggerConfig = Figment::new()
            .merge(Serialized::defaults(LoggerConfig::default()))
            .merge(Yaml::file(DEFAULT_CONFIG_FILE))
            .merge(Env::prefixed("FLUSHLOG_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<LoggerConfig> {
        let config: LoggerConfig = Figment::new()
            .merge(Serialized::defaults(LoggerConfig::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &LoggerConfig) -> Result<(), ConfigError> {
        let mut paths = HashSet::new();

        for (index, core) in config.effective_cores().iter().enumerate() {
            if parse_level(&core.level).is_err() {
                return Err(ConfigError::InvalidLogLevel {
                    core: index,
                    level: core.level.clone(),
                });
            }

            if !core.stacktrace.is_empty() && parse_level(&core.stacktrace).is_err() {
                return Err(ConfigError::InvalidStacktraceLevel {
                    core: index,
                    level: core.stacktrace.clone(),
                });
            }

            // Two sinks on one file would interleave their buffers
            let path = &core.output.path;
            if !path.as_os_str().is_empty() && !paths.insert(path.clone()) {
                return Err(ConfigError::DuplicateSinkPath(path.clone()));
            }
        }

        Ok(())
    }
}
