use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{PageliftError, Result};

/// Every local path one invocation created, in creation order.
///
/// Files are recorded only after they were fully written, so the set never
/// names a path that does not exist.
#[derive(Debug, Default)]
pub struct TemporaryArtifacts {
    files: Vec<PathBuf>,
    dirs: Vec<PathBuf>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CleanupSummary {
    pub removed: usize,
    pub failures: usize,
}

impl TemporaryArtifacts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_file(&mut self, path: impl Into<PathBuf>) {
        self.files.push(path.into());
    }

    /// Creates a single directory level and records it. An existing directory
    /// is left alone and not recorded.
    pub fn create_dir(&mut self, path: &Path) -> Result<()> {
        match fs::create_dir(path) {
            Ok(()) => {
                self.dirs.push(path.to_path_buf());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
            Err(e) => Err(PageliftError::Io(e)),
        }
    }

    /// Removes files one at a time, then directories innermost first.
    /// Individual failures are logged and counted, never returned.
    pub fn cleanup(self) -> CleanupSummary {
        info!("Cleaning up temporary files...");
        let mut summary = CleanupSummary::default();

        for file in &self.files {
            match fs::remove_file(file) {
                Ok(()) => {
                    summary.removed += 1;
                    info!("Removed temporary file: {}", file.display());
                }
                Err(e) => {
                    summary.failures += 1;
                    let err = PageliftError::Cleanup(e.to_string());
                    warn!("Error removing file {}: {}", file.display(), err);
                }
            }
        }

        for dir in self.dirs.iter().rev() {
            match fs::remove_dir(dir) {
                Ok(()) => {
                    summary.removed += 1;
                    info!("Removed temporary directory: {}", dir.display());
                }
                Err(e) => {
                    summary.failures += 1;
                    let err = PageliftError::Cleanup(e.to_string());
                    warn!("Error removing directory {}: {}", dir.display(), err);
                }
            }
        }

        summary
    }
}
