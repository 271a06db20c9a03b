use std::io;
use std::path::Path;

/// Byte destination a sink buffers in front of.
///
/// `close` consumes the target and reports failures that dropping it would
/// swallow, so shutdown can surface them to the caller.
pub trait LogTarget: io::Write + Send + 'static {
    /// Release the target, returning any error from the final sync or close
    fn close(self) -> io::Result<()>;
}

/// Factory for [`LogTarget`]s bound to a path.
///
/// A sink keeps its opener for its whole lifetime and calls it again on
/// restart, so every call must yield a fresh handle to whatever currently
/// exists at `path`, creating it if absent and appending if present.
pub trait TargetOpener: Send + Sync + 'static {
    /// Target type produced by this opener
    type Target: LogTarget;

    /// Open `path` for appending
    fn open(&self, path: &Path) -> io::Result<Self::Target>;
}
