//! Domain layer
//!
//! Configuration models and the port through which sinks reach their storage.

pub mod models;
pub mod ports;
