//! Port trait definitions (Hexagonal Architecture)
//!
//! - LogTarget: a byte destination that can report close failures
//! - TargetOpener: produces a fresh LogTarget for a path, on start and on restart

pub mod log_target;

pub use log_target::{LogTarget, TargetOpener};
