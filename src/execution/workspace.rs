//! Per-job working directories, removed when the job ends

use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A job's working directory on disk.
///
/// The directory is created up front and removed when the guard drops,
/// whichever way the job ends. Dropping mid-run (a cancelled task) still
/// cleans up.
#[derive(Debug)]
pub struct Workspace {
    path: PathBuf,
    keep: bool,
}

impl Workspace {
    /// Create the directory, including missing parents
    pub fn create(path: PathBuf) -> io::Result<Self> {
        std::fs::create_dir_all(&path)?;
        debug!("Created workspace {}", path.display());
        Ok(Self { path, keep: false })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Leave the directory on disk after the job ends
    pub fn keep(&mut self) {
        self.keep = true;
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if self.keep {
            debug!("Keeping workspace {}", self.path.display());
            return;
        }
        if let Err(e) = std::fs::remove_dir_all(&self.path) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!("Failed to remove workspace {}: {}", self.path.display(), e);
            }
        }
    }
}
