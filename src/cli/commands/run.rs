//! Implementation of the `flushlog run` command.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use tracing::Instrument;

use crate::domain::models::{LoggerConfig, ServiceInfo};
use crate::infrastructure::logging::{LogRotator, Logger, LoggerGuard};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Project name attached to every record
    #[arg(long, default_value = "testProject")]
    pub project: String,

    /// Service name attached to every record
    #[arg(long, default_value = "testService")]
    pub service: String,

    /// Branch attached to every record
    #[arg(long, default_value = "testBranch")]
    pub branch: String,

    /// Version attached to every record
    #[arg(long, default_value = "testVersion")]
    pub version: String,

    /// Ignore configuration and log to stdout plus this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Keep emitting a heartbeat record until Ctrl-C
    #[arg(long)]
    pub follow: bool,

    /// Seconds between heartbeat records in follow mode
    #[arg(long, default_value = "1")]
    pub interval: u64,

    /// Rotate file sinks once they reach this many bytes (follow mode)
    #[arg(long)]
    pub max_file_size: Option<u64>,
}

pub async fn execute(args: RunArgs, config_path: Option<&Path>) -> Result<()> {
    let config = match &args.log_file {
        Some(log_file) => LoggerConfig::default_for(log_file),
        None => super::load_config(config_path)?,
    };

    let service = ServiceInfo {
        project: args.project.clone(),
        service: args.service.clone(),
        branch: args.branch.clone(),
        version: args.version.clone(),
    };

    let guard = Logger::init(&config, service).context("Failed to initialize logger")?;
    let span = guard.service_span();

    let result = async {
        tracing::info!("Works perfectly");

        if args.follow {
            follow(&args, &guard).await?;
        }
        Ok::<_, anyhow::Error>(())
    }
    .instrument(span)
    .await;

    let shutdown = guard
        .shutdown()
        .await
        .context("Failed to flush log files on shutdown");

    result.and(shutdown)
}

async fn follow(args: &RunArgs, guard: &LoggerGuard) -> Result<()> {
    #[cfg(unix)]
    let listener = crate::infrastructure::logging::spawn_rotation_listener(guard.sinks().to_vec())
        .context("Failed to register SIGHUP handler")?;

    let rotators: Vec<_> = match args.max_file_size {
        Some(limit) => guard
            .sinks()
            .iter()
            .map(|sink| {
                LogRotator::new(limit).spawn_periodic(Arc::clone(sink), Duration::from_secs(1))
            })
            .collect(),
        None => Vec::new(),
    };

    let mut heartbeat = tokio::time::interval(Duration::from_secs(args.interval.max(1)));
    let mut beats: u64 = 0;

    loop {
        tokio::select! {
            _ = heartbeat.tick() => {
                beats += 1;
                tracing::info!(beats, "heartbeat");
            }
            signal = tokio::signal::ctrl_c() => {
                signal.context("Failed to listen for Ctrl-C")?;
                tracing::info!(beats, "shutting down");
                break;
            }
        }
    }

    for rotator in rotators {
        rotator.abort();
    }
    #[cfg(unix)]
    listener.abort();

    Ok(())
}
