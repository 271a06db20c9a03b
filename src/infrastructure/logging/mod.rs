//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber:
//! - One layer per configured core, each with its own level and encoding
//! - Buffered file sinks behind file-backed cores
//! - Size-triggered rotation and SIGHUP reopening

pub mod logger;
pub mod rotation;
#[cfg(unix)]
pub mod signals;

pub use logger::{parse_level, Logger, LoggerGuard, Pipeline};
pub use rotation::LogRotator;
#[cfg(unix)]
pub use signals::{reopen_all, spawn_rotation_listener};
