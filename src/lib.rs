//! Flushlog - structured logging with buffered, rotation-aware file sinks
//!
//! Log records are produced with `tracing` and routed through one layer per
//! configured core. File-backed cores write into a [`BufferedFileSink`]: bytes
//! are queued in memory, flushed by a background timer, and can be moved to a
//! fresh file after external rotation with [`BufferedFileSink::restart`].
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): configuration models and the log target port
//! - **Infrastructure Layer** (`infrastructure`): the sink, its flush worker,
//!   the tracing pipeline, rotation and configuration loading
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use flushlog::{Logger, LoggerConfig, ServiceInfo};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let guard = Logger::init(&LoggerConfig::default_for("app.log"), ServiceInfo::default())?;
//!     tracing::info!("Works perfectly");
//!     guard.shutdown().await?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod domain;
pub mod infrastructure;

pub use infrastructure::logging;

// Re-export commonly used types for convenience
pub use domain::models::{
    CoreConfig, Encoding, LoggerConfig, OutputConfig, ServiceInfo, SinkConfig,
};
pub use domain::ports::{LogTarget, TargetOpener};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use infrastructure::logging::{Logger, LoggerGuard};
pub use infrastructure::sink::{BufferedFileSink, FileOpener, SinkError, SinkWriter};
