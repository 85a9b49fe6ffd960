//! Application context for CLI command execution.
//!
//! # Example
//!
//! ```no_run
//! use taskdag::app::App;
//! use std::path::Path;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let app = App::read_only(Path::new(".")).await?;
//!     println!("task prefix: {}", app.prefix());
//!     Ok(())
//! }
//! ```

use crate::commands::init::{
    find_taskdag_root, TaskdagConfig, CONFIG_FILE_NAME, LOCK_FILE_NAME, TASKDAG_DIR_NAME,
};
use crate::error::{ConfigError, Result, StorageError};
use crate::storage::lock::{LockMode, RepositoryLock};
use crate::storage::{create_storage, StorageBackend, TaskStorage};
use std::path::{Path, PathBuf};

/// Application context for CLI operations.
///
/// Holds the storage loaded from the nearest `.taskdag/` directory along
/// with the configuration it was built from.
///
/// The repository lock is taken before anything is read and released when
/// the `App` is dropped, so a command's read-validate-write sequence never
/// interleaves with another process working on the same repository.
pub struct App {
    storage: Box<dyn TaskStorage>,

    /// Path to the taskdag directory (.taskdag)
    taskdag_dir: PathBuf,

    /// Task ID prefix from configuration
    prefix: String,

    backend: StorageBackend,

    lock: RepositoryLock,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("taskdag_dir", &self.taskdag_dir)
            .field("prefix", &self.prefix)
            .field("backend", &self.backend)
            .field("lock", &self.lock.mode())
            .field("storage", &"<dyn TaskStorage>")
            .finish()
    }
}

impl App {
    /// Open the repository containing `working_dir` for reading and writing.
    ///
    /// Searches up the directory tree for `.taskdag/`, takes the repository
    /// lock exclusively, then loads its configuration and opens the
    /// configured storage. Waits while any other `App` holds the lock.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No taskdag repository is found in the directory tree
    /// - The lock file cannot be opened or locked
    /// - Configuration cannot be loaded
    /// - The data file exists but cannot be read
    pub async fn from_directory(working_dir: &Path) -> Result<Self> {
        Self::open(working_dir, LockMode::Exclusive).await
    }

    /// Open the repository containing `working_dir` for queries only.
    ///
    /// The lock is shared, so readers do not wait for each other but do wait
    /// for a writer to finish. [`save`](Self::save) is refused.
    ///
    /// # Errors
    ///
    /// Same as [`from_directory`](Self::from_directory).
    pub async fn read_only(working_dir: &Path) -> Result<Self> {
        Self::open(working_dir, LockMode::Shared).await
    }

    async fn open(working_dir: &Path, mode: LockMode) -> Result<Self> {
        let root_dir = find_taskdag_root(working_dir).ok_or(ConfigError::NotInitialized)?;

        let taskdag_dir = root_dir.join(TASKDAG_DIR_NAME);
        let lock = RepositoryLock::acquire(&taskdag_dir.join(LOCK_FILE_NAME), mode).await?;
        let config = TaskdagConfig::load(&taskdag_dir.join(CONFIG_FILE_NAME)).await?;

        let backend = config.storage.to_backend(&root_dir)?;
        let storage = create_storage(backend.clone(), config.task_prefix.clone()).await?;

        tracing::debug!(root = %root_dir.display(), ?backend, ?mode, "Opened taskdag repository");

        Ok(Self {
            storage,
            taskdag_dir,
            prefix: config.task_prefix,
            backend,
            lock,
        })
    }

    /// Get a mutable reference to the storage.
    pub fn storage_mut(&mut self) -> &mut dyn TaskStorage {
        self.storage.as_mut()
    }

    /// Get an immutable reference to the storage.
    pub fn storage(&self) -> &dyn TaskStorage {
        self.storage.as_ref()
    }

    /// Get the task ID prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Get the path to the taskdag directory.
    pub fn taskdag_dir(&self) -> &Path {
        &self.taskdag_dir
    }

    /// The data file, if the backend persists to one.
    pub fn data_file(&self) -> Option<&Path> {
        self.backend.data_path()
    }

    /// Save storage state to persistent storage.
    ///
    /// If the save fails, in-memory state is reloaded from disk so it does
    /// not drift from what was actually persisted.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::ReadOnly`] if the `App` was opened with
    /// [`read_only`](Self::read_only), or the storage's save error.
    pub async fn save(&mut self) -> Result<()> {
        if self.lock.mode() != LockMode::Exclusive {
            return Err(StorageError::ReadOnly.into());
        }
        if let Err(e) = self.storage.save().await {
            tracing::warn!(error = %e, "Save failed, reloading from disk");
            if let Err(reload_err) = self.storage.reload().await {
                tracing::warn!(error = %reload_err, "Reload after failed save also failed");
            }
            return Err(e);
        }
        Ok(())
    }
}
