//! Sink error types

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced by [`BufferedFileSink`](super::BufferedFileSink)
#[derive(Error, Debug)]
pub enum SinkError {
    /// The file could not be opened or created, at construction or restart
    #[error("Failed to open log file {path}: {source}")]
    Open {
        /// Path that was being opened
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Appending to the buffer forced a drain that failed
    #[error("Write failed: {0}")]
    Write(#[source] io::Error),

    /// Draining the buffer into the file failed; the bytes stay buffered
    #[error("Flush failed: {0}")]
    Flush(#[source] io::Error),

    /// Closing the file handle failed
    #[error("Close failed: {0}")]
    Close(#[source] io::Error),

    /// The file handle was closed by `stop_worker`
    #[error("Sink is closed")]
    Closed,

    /// The background flusher needs a Tokio runtime to be spawned on
    #[error("No Tokio runtime available to run the flush worker")]
    NoRuntime,

    /// A flush or close running on the blocking pool panicked or was cancelled
    #[error("Blocking log I/O failed: {0}")]
    Blocking(#[source] tokio::task::JoinError),

    /// The flush worker exited without acknowledging the stop request
    #[error("Flush worker exited before acknowledging shutdown")]
    WorkerGone,
}

impl SinkError {
    /// Map into an `io::Error` for the `std::io::Write` surface
    pub fn into_io(self) -> io::Error {
        match self {
            Self::Write(e) | Self::Flush(e) | Self::Close(e) | Self::Open { source: e, .. } => e,
            Self::Closed => io::Error::new(io::ErrorKind::BrokenPipe, Self::Closed),
            other => io::Error::other(other),
        }
    }
}
