//! Buffered file sink
//!
//! - `buffered`: the sink, its lock-guarded buffer and the restart primitive
//! - `worker`: periodic flushing and the shutdown handshake
//! - `file`: the default file-backed target
//! - `memory`: in-memory targets for tests

pub mod buffered;
pub mod errors;
pub mod file;
pub mod memory;
mod worker;

pub use buffered::{BufferedFileSink, SinkWriter};
pub use errors::SinkError;
pub use file::FileOpener;
pub use memory::{MemoryOpener, MemoryTarget};
