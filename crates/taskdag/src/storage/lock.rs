//! Advisory lock over a taskdag repository.
//!
//! Every command loads the whole data file, works on it in memory and writes
//! it back. The lock turns that load-mutate-save sequence into a single
//! transaction across processes: writers take it exclusively, readers take it
//! shared, and it is held until the guard is dropped.

use crate::error::Result;
use fs4::tokio::AsyncFileExt;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};

/// How a repository lock is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    /// Many readers at once, no writer.
    Shared,
    /// A single writer, no readers.
    Exclusive,
}

/// A held lock on a repository's lock file.
///
/// Unlocking happens when the underlying file is closed, so dropping the
/// guard releases the lock.
#[derive(Debug)]
pub struct RepositoryLock {
    // Held for its lock only
    _file: File,
    path: PathBuf,
    mode: LockMode,
}

impl RepositoryLock {
    /// Acquire the lock at `path`, creating the file if needed.
    ///
    /// Blocks until the lock is available.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock file cannot be opened or locked.
    pub async fn acquire(path: &Path, mode: LockMode) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .await?;

        match mode {
            LockMode::Shared => file.lock_shared()?,
            LockMode::Exclusive => file.lock_exclusive()?,
        }
        tracing::debug!(path = %path.display(), ?mode, "Acquired repository lock");

        Ok(Self {
            _file: file,
            path: path.to_path_buf(),
            mode,
        })
    }

    /// The mode the lock is held in.
    pub fn mode(&self) -> LockMode {
        self.mode
    }

    /// Path of the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
