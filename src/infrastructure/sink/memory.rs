//! In-memory log targets for testing
//!
//! [`MemoryOpener`] stands in for [`FileOpener`](super::FileOpener): each
//! `open` starts a new generation (the equivalent of a fresh file after
//! rotation), call counters expose how much I/O reached the target, and
//! failure switches inject errors on demand.

use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::domain::ports::log_target::{LogTarget, TargetOpener};

#[derive(Debug, Default)]
struct MemoryState {
    generations: Mutex<Vec<Vec<u8>>>,
    write_calls: AtomicUsize,
    flush_calls: AtomicUsize,
    closes: AtomicUsize,
    fail_open: AtomicBool,
    fail_write: AtomicBool,
    fail_flush: AtomicBool,
    fail_close: AtomicBool,
}

impl MemoryState {
    fn injected(flag: &AtomicBool, what: &str) -> io::Result<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(io::Error::other(format!("injected {what} failure")));
        }
        Ok(())
    }
}

/// Opener whose targets live in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryOpener {
    state: Arc<MemoryState>,
}

impl MemoryOpener {
    /// Opener with no targets and every failure switch off
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of targets opened so far
    pub fn opens(&self) -> usize {
        self.lock_generations().len()
    }

    /// Bytes received by the `generation`-th opened target
    pub fn contents(&self, generation: usize) -> Vec<u8> {
        self.lock_generations()
            .get(generation)
            .cloned()
            .unwrap_or_default()
    }

    /// Bytes received by the most recently opened target
    pub fn latest(&self) -> Vec<u8> {
        self.lock_generations().last().cloned().unwrap_or_default()
    }

    /// `write` calls that reached any target
    pub fn write_calls(&self) -> usize {
        self.state.write_calls.load(Ordering::SeqCst)
    }

    /// `flush` calls that reached any target
    pub fn flush_calls(&self) -> usize {
        self.state.flush_calls.load(Ordering::SeqCst)
    }

    /// Targets closed so far
    pub fn closes(&self) -> usize {
        self.state.closes.load(Ordering::SeqCst)
    }

    /// Make subsequent `open` calls fail
    pub fn fail_open(&self, fail: bool) {
        self.state.fail_open.store(fail, Ordering::SeqCst);
    }

    pub fn fail_write(&self, fail: bool) {
        self.state.fail_write.store(fail, Ordering::SeqCst);
    }

    pub fn fail_flush(&self, fail: bool) {
        self.state.fail_flush.store(fail, Ordering::SeqCst);
    }

    pub fn fail_close(&self, fail: bool) {
        self.state.fail_close.store(fail, Ordering::SeqCst);
    }

    fn lock_generations(&self) -> std::sync::MutexGuard<'_, Vec<Vec<u8>>> {
        self.state
            .generations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl TargetOpener for MemoryOpener {
    type Target = MemoryTarget;

    fn open(&self, _path: &Path) -> io::Result<MemoryTarget> {
        MemoryState::injected(&self.state.fail_open, "open")?;

        let mut generations = self.lock_generations();
        generations.push(Vec::new());
        Ok(MemoryTarget {
            state: Arc::clone(&self.state),
            generation: generations.len() - 1,
        })
    }
}

/// A single opened in-memory target
#[derive(Debug)]
pub struct MemoryTarget {
    state: Arc<MemoryState>,
    generation: usize,
}

impl io::Write for MemoryTarget {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.state.write_calls.fetch_add(1, Ordering::SeqCst);
        MemoryState::injected(&self.state.fail_write, "write")?;

        let mut generations = self
            .state
            .generations
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        generations[self.generation].extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.state.flush_calls.fetch_add(1, Ordering::SeqCst);
        MemoryState::injected(&self.state.fail_flush, "flush")
    }
}

impl LogTarget for MemoryTarget {
    fn close(self) -> io::Result<()> {
        self.state.closes.fetch_add(1, Ordering::SeqCst);
        MemoryState::injected(&self.state.fail_close, "close")
    }
}
