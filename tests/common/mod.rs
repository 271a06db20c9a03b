//! Common test utilities for integration tests

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Create a temporary directory for test isolation
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// A temp directory and the path of `app.log` inside it
#[allow(dead_code)]
pub fn temp_log_path() -> (TempDir, PathBuf) {
    let dir = temp_dir();
    let path = dir.path().join("app.log");
    (dir, path)
}

/// Read a file, treating a missing file as empty
#[allow(dead_code)]
pub fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap_or_default()
}

/// Wait for a condition to be true with timeout
///
/// Polls the predicate every 50ms until it returns true or timeout is reached.
#[allow(dead_code)]
pub async fn wait_for<F>(mut predicate: F, timeout_ms: u64) -> bool
where
    F: FnMut() -> bool,
{
    let start = std::time::Instant::now();
    let timeout = std::time::Duration::from_millis(timeout_ms);

    while start.elapsed() < timeout {
        if predicate() {
            return true;
        }
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }

    predicate()
}
