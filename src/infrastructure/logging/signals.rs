//! Reopen log files on SIGHUP
//!
//! External rotators (logrotate and friends) rename the live file and then
//! send SIGHUP; reacting with a restart moves the sinks onto the new file.

use std::sync::Arc;

use tokio::signal::unix::{signal, SignalKind};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::domain::ports::log_target::TargetOpener;
use crate::infrastructure::sink::BufferedFileSink;

/// Spawn a task that restarts every sink whenever the process receives SIGHUP.
///
/// The task runs until aborted.
///
/// # Errors
/// Returns an error if the signal handler cannot be registered.
pub fn spawn_rotation_listener<O: TargetOpener>(
    sinks: Vec<Arc<BufferedFileSink<O>>>,
) -> std::io::Result<JoinHandle<()>> {
    let mut hangups = signal(SignalKind::hangup())?;

    Ok(tokio::spawn(async move {
        while hangups.recv().await.is_some() {
            info!(sinks = sinks.len(), "SIGHUP received, reopening log files");
            reopen_all(&sinks);
        }
    }))
}

/// Restart every sink, logging failures
pub fn reopen_all<O: TargetOpener>(sinks: &[Arc<BufferedFileSink<O>>]) {
    for sink in sinks {
        if let Err(e) = sink.restart() {
            warn!(
                path = ?sink.path(),
                error = %e,
                "failed to reopen log file"
            );
        }
    }
}
