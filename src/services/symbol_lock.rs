//! Per-symbol advisory lock
//!
//! Two runs against the same output directory must not compute and write the
//! same symbol at once. The lock is a hidden `.{SYMBOL}.lock` file in the
//! output directory held with an exclusive `fs2` lock for the guard's lifetime.

use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{AppError, Result};

/// Held lock for one symbol; released on drop
#[derive(Debug)]
pub struct SymbolLock {
    file: File,
    path: PathBuf,
}

impl SymbolLock {
    /// Try to take the lock without blocking
    ///
    /// Returns `AppError::Lock` when another process holds it.
    pub fn acquire(output_dir: &Path, symbol: &str) -> Result<Self> {
        let path = lock_path(output_dir, symbol);
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| AppError::Io(format!("Failed to open lock file {}: {}", path.display(), e)))?;

        file.try_lock_exclusive().map_err(|e| {
            AppError::Lock(format!("{} is being merged by another process ({})", symbol, e))
        })?;

        debug!(symbol, lock = %path.display(), "Acquired symbol lock");
        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for SymbolLock {
    fn drop(&mut self) {
        // The file stays behind; deleting it would let a waiter lock an orphaned inode.
        let _ = FileExt::unlock(&self.file);
    }
}

/// Lock file location for `symbol`
pub fn lock_path(output_dir: &Path, symbol: &str) -> PathBuf {
    output_dir.join(format!(".{}.lock", symbol.to_uppercase()))
}
