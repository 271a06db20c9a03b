//! File-backed log targets

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;

use crate::domain::ports::log_target::{LogTarget, TargetOpener};

/// Opens log files in create + append mode, owner read/write
#[derive(Debug, Clone, Copy, Default)]
pub struct FileOpener;

impl TargetOpener for FileOpener {
    type Target = File;

    fn open(&self, path: &Path) -> io::Result<File> {
        let mut options = OpenOptions::new();
        options.create(true).append(true);

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o644);
        }

        options.open(path)
    }
}

impl LogTarget for File {
    fn close(self) -> io::Result<()> {
        // Dropping a File discards close errors; syncing first surfaces deferred write failures.
        self.sync_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_open_creates_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("new.log");

        let file = FileOpener.open(&path).unwrap();
        file.close().unwrap();

        assert!(path.exists());
    }

    #[test]
    fn test_open_appends_to_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("app.log");
        std::fs::write(&path, b"first\n").unwrap();

        let mut file = FileOpener.open(&path).unwrap();
        file.write_all(b"second\n").unwrap();
        file.close().unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn test_open_fails_in_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing").join("app.log");

        assert!(FileOpener.open(&path).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_new_file_is_owner_writable() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("perm.log");
        FileOpener.open(&path).unwrap().close().unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o600, 0o600);
    }
}
