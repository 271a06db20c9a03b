//! Infrastructure layer module
//!
//! This module contains the adapters behind the domain ports:
//! - Buffered file sink and its flush worker
//! - Logging pipeline (tracing-subscriber layers, rotation, SIGHUP reopen)
//! - Configuration management

pub mod config;
pub mod logging;
pub mod sink;
