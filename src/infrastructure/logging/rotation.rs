//! Size-triggered log rotation
//!
//! Renames an oversized log file to `<name>.<timestamp>` and restarts the
//! sink writing to it. Bytes the sink buffered before the rename end up in
//! the archived file; bytes written afterwards go to a fresh file at the
//! original path.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::ports::log_target::TargetOpener;
use crate::infrastructure::sink::BufferedFileSink;

/// Rotates a sink's file once it reaches a size limit
#[derive(Debug, Clone)]
pub struct LogRotator {
    /// Maximum file size in bytes before rotation
    max_file_size: u64,
}

impl LogRotator {
    pub const fn new(max_file_size: u64) -> Self {
        Self { max_file_size }
    }

    /// Check if the file at `log_path` has reached the size limit
    pub async fn should_rotate(&self, log_path: impl AsRef<Path>) -> Result<bool> {
        let log_path = log_path.as_ref();

        let size = match tokio::fs::metadata(log_path).await {
            Ok(metadata) => metadata.len(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e).context("failed to get log file metadata"),
        };

        debug!(
            path = %log_path.display(),
            size = size,
            max_size = self.max_file_size,
            "checking if log rotation needed"
        );

        Ok(size >= self.max_file_size)
    }

    /// Rotate the sink's file if it is too large.
    ///
    /// Buffered bytes are counted as part of the file, so a sink that holds
    /// most of its data in memory still rotates on time.
    ///
    /// # Returns
    /// Path of the archived file when a rotation happened
    pub async fn rotate_if_needed<O: TargetOpener>(
        &self,
        sink: &BufferedFileSink<O>,
    ) -> Result<Option<PathBuf>> {
        let Some(log_path) = sink.path() else {
            return Ok(None);
        };

        sink.flush().context("failed to flush log before rotation check")?;
        if !self.should_rotate(log_path).await? {
            return Ok(None);
        }

        let rotated_path = rotated_path(log_path);
        tokio::fs::rename(log_path, &rotated_path)
            .await
            .context("failed to rotate log file")?;
        sink.restart().context("failed to reopen log file after rotation")?;

        info!(
            old_path = %log_path.display(),
            new_path = %rotated_path.display(),
            "rotated log file"
        );

        Ok(Some(rotated_path))
    }

    /// Check the sink every `interval` until the task is aborted
    pub fn spawn_periodic<O: TargetOpener>(
        self,
        sink: Arc<BufferedFileSink<O>>,
        interval: Duration,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval_timer = tokio::time::interval(interval);

            loop {
                interval_timer.tick().await;

                if let Err(e) = self.rotate_if_needed(&sink).await {
                    warn!(error = %e, "failed to run periodic rotation");
                }
            }
        })
    }
}

/// `<path>.<YYYYmmdd_HHMMSS>`, with a counter suffix if that name is taken
fn rotated_path(log_path: &Path) -> PathBuf {
    let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
    let base = format!("{}.{timestamp}", log_path.display());

    let mut candidate = PathBuf::from(&base);
    let mut counter = 1;
    while candidate.exists() {
        candidate = PathBuf::from(format!("{base}.{counter}"));
        counter += 1;
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::SinkConfig;
    use tempfile::TempDir;

    fn open_sink(path: &Path) -> BufferedFileSink {
        BufferedFileSink::open(SinkConfig::new(path)).unwrap()
    }

    #[tokio::test]
    async fn test_should_rotate_when_file_exceeds_size() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("test.log");
        std::fs::write(&log_path, vec![0u8; 2048]).unwrap();

        let rotator = LogRotator::new(1024);
        assert!(rotator.should_rotate(&log_path).await.unwrap());
    }

    #[tokio::test]
    async fn test_should_not_rotate_when_file_missing() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("nonexistent.log");

        let rotator = LogRotator::new(1024);
        assert!(!rotator.should_rotate(&log_path).await.unwrap());
    }

    #[tokio::test]
    async fn test_rotate_if_needed_moves_buffered_bytes_to_archive() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("app.log");
        let sink = open_sink(&log_path);

        sink.write(&vec![b'a'; 2048]).unwrap();

        let rotator = LogRotator::new(1024);
        let rotated = rotator.rotate_if_needed(&sink).await.unwrap().unwrap();

        assert!(rotated
            .file_name()
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("app.log."));
        assert_eq!(std::fs::read(&rotated).unwrap().len(), 2048);

        sink.write(b"fresh").unwrap();
        sink.flush().unwrap();
        assert_eq!(std::fs::read(&log_path).unwrap(), b"fresh");

        sink.stop_worker().await.unwrap();
    }

    #[tokio::test]
    async fn test_rotate_if_needed_does_nothing_when_small() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("app.log");
        let sink = open_sink(&log_path);
        sink.write(b"small").unwrap();

        let rotator = LogRotator::new(1024);
        assert!(rotator.rotate_if_needed(&sink).await.unwrap().is_none());

        let entries: Vec<_> = std::fs::read_dir(temp_dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);

        sink.stop_worker().await.unwrap();
    }

    #[tokio::test]
    async fn test_disabled_sink_never_rotates() {
        let rotator = LogRotator::new(0);
        let sink: BufferedFileSink = BufferedFileSink::disabled();
        assert!(rotator.rotate_if_needed(&sink).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_multiple_rotations_get_distinct_names() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("app.log");
        let sink = open_sink(&log_path);
        let rotator = LogRotator::new(16);

        for _ in 0..3 {
            sink.write(&[b'x'; 32]).unwrap();
            rotator.rotate_if_needed(&sink).await.unwrap().unwrap();
        }
        sink.stop_worker().await.unwrap();

        // three archives plus the live file
        let entries: Vec<_> = std::fs::read_dir(temp_dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 4);
    }
}
