//! Buffered, auto-flushing, restartable file sink
//!
//! All bytes pass through one `BufWriter` bound to the currently open target.
//! The writer and its target live in a single slot behind one mutex, so a
//! buffer is only ever drained into the handle it was created for. A
//! background [`worker`](super::worker) flushes the slot on a timer and closes
//! it on shutdown.

use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::{debug, warn};
use tracing_subscriber::fmt::MakeWriter;

use super::errors::SinkError;
use super::file::FileOpener;
use super::worker::{self, StopRequest};
use crate::domain::models::SinkConfig;
use crate::domain::ports::log_target::{LogTarget, TargetOpener};

/// Buffer and handle, updated together
enum Slot<T: Write> {
    Open(BufWriter<T>),
    Closed,
}

/// State shared between the sink and its flush worker
pub(super) struct Shared<O: TargetOpener> {
    config: SinkConfig,
    opener: O,
    slot: Mutex<Slot<O::Target>>,
}

fn open_writer<O: TargetOpener>(
    opener: &O,
    config: &SinkConfig,
) -> Result<BufWriter<O::Target>, SinkError> {
    let target = opener.open(&config.path).map_err(|source| SinkError::Open {
        path: config.path.clone(),
        source,
    })?;
    Ok(BufWriter::with_capacity(config.buffer_capacity(), target))
}

impl<O: TargetOpener> Shared<O> {
    fn lock(&self) -> MutexGuard<'_, Slot<O::Target>> {
        // A panic mid-write leaves at worst a partial record; keep logging.
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(super) fn path(&self) -> &Path {
        &self.config.path
    }

    fn write(&self, buf: &[u8]) -> Result<usize, SinkError> {
        match &mut *self.lock() {
            Slot::Open(writer) => {
                writer.write_all(buf).map_err(SinkError::Write)?;
                Ok(buf.len())
            }
            Slot::Closed => Err(SinkError::Closed),
        }
    }

    pub(super) fn flush(&self) -> Result<(), SinkError> {
        Self::flush_slot(&mut self.lock())
    }

    fn flush_slot(slot: &mut Slot<O::Target>) -> Result<(), SinkError> {
        match slot {
            Slot::Open(writer) if !writer.buffer().is_empty() => {
                writer.flush().map_err(SinkError::Flush)
            }
            _ => Ok(()),
        }
    }

    fn restart(&self) -> Result<(), SinkError> {
        // Records emitted while the slot is locked would re-enter this sink,
        // so the guard is released before closing and logging.
        let previous = {
            let mut slot = self.lock();

            Self::flush_slot(&mut slot)?;
            let fresh = open_writer(&self.opener, &self.config)?;
            std::mem::replace(&mut *slot, Slot::Open(fresh))
        };

        match previous {
            Slot::Open(old) => {
                let (target, _) = old.into_parts();
                target.close().map_err(SinkError::Close)?;
                debug!(path = %self.config.path.display(), "log file reopened");
            }
            Slot::Closed => {
                debug!(path = %self.config.path.display(), "closed log file reopened");
            }
        }
        Ok(())
    }

    /// Final flush and close. The flush error wins over the close error.
    pub(super) fn shutdown(&self) -> Result<(), SinkError> {
        let (flushed, previous) = {
            let mut slot = self.lock();
            let flushed = Self::flush_slot(&mut slot);
            (flushed, std::mem::replace(&mut *slot, Slot::Closed))
        };

        let closed = match previous {
            Slot::Open(writer) => {
                let (target, unwritten) = writer.into_parts();
                if let Ok(bytes) = &unwritten {
                    if !bytes.is_empty() {
                        warn!(
                            path = %self.config.path.display(),
                            bytes = bytes.len(),
                            "discarding unflushed log bytes on close"
                        );
                    }
                }
                target.close().map_err(SinkError::Close)
            }
            Slot::Closed => Ok(()),
        };

        flushed.and(closed)
    }

    fn buffered_len(&self) -> usize {
        match &*self.lock() {
            Slot::Open(writer) => writer.buffer().len(),
            Slot::Closed => 0,
        }
    }
}

enum Backing<O: TargetOpener> {
    Disabled,
    Enabled {
        shared: Arc<Shared<O>>,
        stop: Mutex<Option<oneshot::Sender<StopRequest>>>,
    },
}

/// Thread-safe buffered log file.
///
/// Writes only queue bytes in memory; they reach the file on [`flush`],
/// when the buffer overflows, on every tick of the background worker, on
/// [`restart`] and on [`stop_worker`].
///
/// A sink built from a config with an empty path is disabled: writes report
/// zero bytes and every other operation succeeds without doing anything.
///
/// [`flush`]: Self::flush
/// [`restart`]: Self::restart
/// [`stop_worker`]: Self::stop_worker
pub struct BufferedFileSink<O: TargetOpener = FileOpener> {
    backing: Backing<O>,
}

impl BufferedFileSink<FileOpener> {
    /// Open the file named by `config` and start its flush worker.
    ///
    /// Must be called from within a Tokio runtime when `config.path` is set.
    ///
    /// # Errors
    /// Returns [`SinkError::Open`] if the file cannot be opened or created,
    /// and [`SinkError::NoRuntime`] outside a Tokio runtime.
    pub fn open(config: SinkConfig) -> Result<Self, SinkError> {
        Self::with_opener(config, FileOpener)
    }
}

impl<O: TargetOpener> BufferedFileSink<O> {
    /// Build a sink whose targets come from `opener`
    pub fn with_opener(config: SinkConfig, opener: O) -> Result<Self, SinkError> {
        if !config.is_enabled() {
            return Ok(Self::disabled());
        }

        let runtime = Handle::try_current().map_err(|_| SinkError::NoRuntime)?;
        let period = config.flush_interval();

        let writer = open_writer(&opener, &config)?;
        let shared = Arc::new(Shared {
            config,
            opener,
            slot: Mutex::new(Slot::Open(writer)),
        });

        let (stop_tx, stop_rx) = oneshot::channel();
        runtime.spawn(worker::run(Arc::clone(&shared), period, stop_rx));

        Ok(Self {
            backing: Backing::Enabled {
                shared,
                stop: Mutex::new(Some(stop_tx)),
            },
        })
    }

    /// A sink without a backing file
    pub const fn disabled() -> Self {
        Self {
            backing: Backing::Disabled,
        }
    }

    /// Whether a file backs this sink
    pub fn is_enabled(&self) -> bool {
        matches!(self.backing, Backing::Enabled { .. })
    }

    /// Configured file path, `None` when disabled
    pub fn path(&self) -> Option<&Path> {
        match &self.backing {
            Backing::Enabled { shared, .. } => Some(shared.path()),
            Backing::Disabled => None,
        }
    }

    /// Bytes currently waiting in the buffer
    pub fn buffered_len(&self) -> usize {
        match &self.backing {
            Backing::Enabled { shared, .. } => shared.buffered_len(),
            Backing::Disabled => 0,
        }
    }

    /// Queue `buf` as one uninterrupted record.
    ///
    /// Returns the number of bytes queued, zero for a disabled sink.
    pub fn write(&self, buf: &[u8]) -> Result<usize, SinkError> {
        match &self.backing {
            Backing::Enabled { shared, .. } => shared.write(buf),
            Backing::Disabled => Ok(0),
        }
    }

    /// Drain buffered bytes into the current file handle.
    ///
    /// Does no I/O when nothing is buffered. On failure the bytes stay
    /// buffered for the next attempt.
    pub fn flush(&self) -> Result<(), SinkError> {
        match &self.backing {
            Backing::Enabled { shared, .. } => shared.flush(),
            Backing::Disabled => Ok(()),
        }
    }

    /// Flush into the current handle, then reopen the configured path.
    ///
    /// Call this after an external process renamed or removed the file:
    /// bytes queued before the call land in the old file, bytes queued after
    /// it in whatever file now exists at the path. If the flush or the reopen
    /// fails the old handle stays in place and the call can be retried.
    pub fn restart(&self) -> Result<(), SinkError> {
        match &self.backing {
            Backing::Enabled { shared, .. } => shared.restart(),
            Backing::Disabled => Ok(()),
        }
    }

    /// Alias of [`restart`](Self::restart) for callers that treat sync as reopen
    pub fn sync(&self) -> Result<(), SinkError> {
        self.restart()
    }

    /// Stop the flush worker and wait until it has flushed and closed the file.
    ///
    /// Returns the final flush error, or else the close error. Later calls
    /// are no-ops, as is stopping a disabled sink.
    pub async fn stop_worker(&self) -> Result<(), SinkError> {
        let Backing::Enabled { stop, .. } = &self.backing else {
            return Ok(());
        };

        let Some(stop_tx) = stop.lock().unwrap_or_else(PoisonError::into_inner).take() else {
            return Ok(());
        };

        let (ack_tx, ack_rx) = oneshot::channel();
        stop_tx.send(ack_tx).map_err(|_| SinkError::WorkerGone)?;
        ack_rx.await.map_err(|_| SinkError::WorkerGone)?
    }
}

impl<O: TargetOpener> Default for BufferedFileSink<O> {
    fn default() -> Self {
        Self::disabled()
    }
}

impl<O: TargetOpener> std::fmt::Debug for BufferedFileSink<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferedFileSink")
            .field("path", &self.path())
            .finish_non_exhaustive()
    }
}

impl<O: TargetOpener> Write for &BufferedFileSink<O> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.is_enabled() {
            // Swallow instead of Ok(0), which `write_all` treats as an error.
            return Ok(buf.len());
        }
        let sink: &BufferedFileSink<O> = self;
        sink.write(buf).map_err(SinkError::into_io)
    }

    fn flush(&mut self) -> io::Result<()> {
        let sink: &BufferedFileSink<O> = self;
        sink.flush().map_err(SinkError::into_io)
    }
}

/// Cloneable handle to a sink, usable as a `tracing_subscriber` writer
pub struct SinkWriter<O: TargetOpener = FileOpener>(Arc<BufferedFileSink<O>>);

impl<O: TargetOpener> SinkWriter<O> {
    pub fn new(sink: Arc<BufferedFileSink<O>>) -> Self {
        Self(sink)
    }

    /// The sink behind this handle
    pub fn sink(&self) -> &Arc<BufferedFileSink<O>> {
        &self.0
    }
}

impl<O: TargetOpener> Clone for SinkWriter<O> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<O: TargetOpener> Write for SinkWriter<O> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Write::write(&mut &*self.0, buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Write::flush(&mut &*self.0)
    }
}

impl<'a, O: TargetOpener> MakeWriter<'a> for SinkWriter<O> {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
