//! Background flush scheduler
//!
//! One Tokio task per enabled sink. It flushes the sink every period and
//! owns the shutdown handshake: a stop request carries the sender on which
//! the task reports the result of its final flush and close, so the caller
//! cannot observe completion before the file is closed. File I/O runs on
//! the blocking pool so a slow disk never stalls the runtime's workers.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::buffered::Shared;
use super::errors::SinkError;
use crate::domain::ports::log_target::TargetOpener;

/// Acknowledgement channel sent along with a stop request
pub(super) type StopRequest = oneshot::Sender<Result<(), SinkError>>;

/// Flush `shared` every `period` until a stop request arrives or the sink is dropped
pub(super) async fn run<O: TargetOpener>(
    shared: Arc<Shared<O>>,
    period: Duration,
    mut stop_rx: oneshot::Receiver<StopRequest>,
) {
    // First tick one full period from now
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let path = shared.path().display().to_string();
    let mut failed_flushes: u64 = 0;

    debug!(path = %path, period_secs = period.as_secs(), "flush worker started");

    loop {
        tokio::select! {
            request = &mut stop_rx => {
                let result = blocking(&shared, Shared::shutdown).await;

                match request {
                    Ok(ack) => {
                        if let Err(Err(e)) = ack.send(result) {
                            warn!(path = %path, error = %e, "stop requester went away; final flush or close failed");
                        }
                    }
                    // Sink dropped without an explicit stop
                    Err(_) => {
                        if let Err(e) = result {
                            warn!(path = %path, error = %e, "log close file error");
                        }
                    }
                }
                break;
            }

            _ = ticker.tick() => {
                match blocking(&shared, Shared::flush).await {
                    Ok(()) => {
                        if failed_flushes > 0 {
                            info!(path = %path, failed_flushes, "log flush recovered");
                            failed_flushes = 0;
                        }
                    }
                    Err(e) => {
                        failed_flushes += 1;
                        warn!(path = %path, error = %e, failed_flushes, "log flush error");
                    }
                }
            }
        }
    }

    debug!(path = %path, "flush worker stopped");
}

/// Run a sink operation on the blocking pool
async fn blocking<O: TargetOpener>(
    shared: &Arc<Shared<O>>,
    op: fn(&Shared<O>) -> Result<(), SinkError>,
) -> Result<(), SinkError> {
    let shared = Arc::clone(shared);
    task::spawn_blocking(move || op(&*shared))
        .await
        .map_err(SinkError::Blocking)?
}
