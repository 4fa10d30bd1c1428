//! Per-request working directories.
//!
//! A [`WorkDir`] is an exclusively owned, uniquely named directory under the
//! system temp location. It is released exactly once: either explicitly via
//! [`WorkDir::release`] or when it is dropped. Release never fails; deletion
//! errors are only logged.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// File name used for materialized authentication cookies.
pub const COOKIES_FILE_NAME: &str = "cookies.txt";

/// Temporary working directory owned by a single request.
#[derive(Debug)]
pub struct WorkDir {
    dir: Option<TempDir>,
    path: PathBuf,
}

impl WorkDir {
    /// Create a new, collision-free directory whose name starts with `prefix`.
    pub fn acquire(prefix: &str) -> mg_core::Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(prefix)
            .tempdir()
            .map_err(|e| mg_core::Error::Internal(format!("failed to create working directory: {e}")))?;
        let path = dir.path().to_path_buf();

        tracing::debug!("Acquired working directory {}", path.display());

        Ok(Self {
            dir: Some(dir),
            path,
        })
    }

    /// Path to the directory. Still valid (but no longer existing) after
    /// release.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path for a named file inside the directory.
    pub fn file(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }

    /// Materialize an authentication blob as a cookie file inside the
    /// directory and return its path.
    pub fn write_cookies(&self, contents: &[u8]) -> mg_core::Result<PathBuf> {
        let path = self.file(COOKIES_FILE_NAME);

        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&path)?;
        file.write_all(contents)?;
        Ok(path)
    }

    /// Whether [`WorkDir::release`] already ran.
    pub fn is_released(&self) -> bool {
        self.dir.is_none()
    }

    /// Recursively delete the directory. Safe to call more than once.
    pub fn release(&mut self) {
        let Some(dir) = self.dir.take() else {
            return;
        };

        match dir.close() {
            Ok(()) => tracing::debug!("Released working directory {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("Working directory {} was already gone", self.path.display());
            }
            Err(e) => tracing::warn!(
                "Failed to remove working directory {}: {e}",
                self.path.display()
            ),
        }
    }
}

impl Drop for WorkDir {
    fn drop(&mut self) {
        self.release();
    }
}
