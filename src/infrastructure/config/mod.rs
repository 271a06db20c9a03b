//! Logger configuration loading
//!
//! Defaults, then `logger-conf.yaml`, then `FLUSHLOG_*` environment
//! variables, merged with figment and validated before use.

pub mod loader;

pub use loader::{ConfigError, ConfigLoader, DEFAULT_CONFIG_FILE};
