//! Storage abstraction layer for taskdag.
//!
//! This module provides the core storage trait and factory for creating
//! storage backends:
//!
//! - **In-memory**: the dependency graph held in RAM, lost on exit
//! - **JSONL**: the in-memory backend loaded from and saved to a JSON Lines
//!   file
//!
//! # Architecture
//!
//! The storage layer uses an async trait so the CLI can hold any backend as
//! a `Box<dyn TaskStorage>`. Graph rules (cycle rejection, status
//! propagation) live in [`crate::graph`]; backends only decide how the graph
//! is locked and persisted.
//!
//! # Example
//!
//! ```no_run
//! use taskdag::domain::{NewTask, TaskStatus};
//! use taskdag::storage::{create_storage, StorageBackend};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let mut storage = create_storage(StorageBackend::InMemory, "proj".to_string()).await?;
//!
//!     let schema = storage.create(NewTask::new("Design schema")).await?;
//!     let api = storage.create(NewTask::new("Build API")).await?;
//!     storage.add_dependency(&api.id, &schema.id).await?;
//!
//!     let outcome = storage.change_status(&schema.id, TaskStatus::Completed).await?;
//!     println!("{} dependent(s) updated", outcome.cascade.len());
//!     Ok(())
//! }
//! ```

use crate::domain::{
    GraphSnapshot, NewTask, StatusChange, StatusOutcome, Task, TaskFilter, TaskId, TaskRecord,
    TaskStatus,
};
use crate::error::Result;
use async_trait::async_trait;
use in_memory::LoadWarning;
use std::path::{Path, PathBuf};

pub mod in_memory;
pub mod lock;

/// Core storage trait for task and dependency management.
///
/// # Method Categories
///
/// - **Tasks**: `create`, `get`, `list`
/// - **Graph mutations**: `add_dependency`, `change_status`, `recompute`
/// - **Graph queries**: `dependencies`, `dependents`, `would_create_cycle`,
///   `find_path`, `snapshot`
/// - **Batch Operations**: `import_records`, `export_records`
/// - **Persistence**: `save`, `reload`
///
/// # Error Handling
///
/// Mutations validate before they change anything; on error the stored
/// graph is exactly as it was. Unknown IDs fail with `TaskNotFound`.
#[async_trait]
pub trait TaskStorage: Send + Sync {
    // ========== Tasks ==========

    /// Create a task, with optional initial prerequisites.
    ///
    /// All-or-nothing: if the title is invalid or any prerequisite is
    /// unknown, no task is created. The new task starts `pending`.
    async fn create(&mut self, new_task: NewTask) -> Result<Task>;

    /// Look up a task by ID.
    async fn get(&self, id: &TaskId) -> Result<Option<Task>>;

    /// Tasks matching the filter, sorted by ID.
    async fn list(&self, filter: &TaskFilter) -> Result<Vec<Task>>;

    // ========== Graph mutations ==========

    /// Add the dependency `task -> depends_on`.
    ///
    /// Fails with `TaskNotFound`, `SelfDependency`, `DuplicateEdge` or
    /// `CycleDetected`, checked in that order. Does not recompute statuses.
    async fn add_dependency(&mut self, task: &TaskId, depends_on: &TaskId) -> Result<()>;

    /// Set a task's status and cascade the change to its dependents.
    ///
    /// Returns the direct change, including the status it replaced, and
    /// the cascade in the order it was applied. Both are taken from one
    /// critical section.
    async fn change_status(&mut self, id: &TaskId, status: TaskStatus) -> Result<StatusOutcome>;

    /// Re-derive a task's status from its prerequisites.
    ///
    /// If the status moves, the change is cascaded like a direct status
    /// change. The returned list starts with the task's own change.
    async fn recompute(&mut self, id: &TaskId) -> Result<Vec<StatusChange>>;

    // ========== Graph queries ==========

    /// Direct prerequisites of a task, sorted.
    async fn dependencies(&self, id: &TaskId) -> Result<Vec<TaskId>>;

    /// Tasks that directly depend on this task, sorted.
    async fn dependents(&self, id: &TaskId) -> Result<Vec<TaskId>>;

    /// Dry run of the cycle check `add_dependency` would perform.
    async fn would_create_cycle(&self, task: &TaskId, depends_on: &TaskId) -> Result<bool>;

    /// A prerequisite path from `from` to `to`, both included.
    async fn find_path(&self, from: &TaskId, to: &TaskId) -> Result<Option<Vec<TaskId>>>;

    /// Consistent view of every task and edge, sorted by ID.
    async fn snapshot(&self) -> Result<GraphSnapshot>;

    // ========== Batch Operations ==========

    /// Merge records into storage.
    ///
    /// Records with known IDs, invalid data, or edges that are orphaned or
    /// would close a cycle are skipped and reported, not rejected.
    async fn import_records(&mut self, records: Vec<TaskRecord>) -> Result<Vec<LoadWarning>>;

    /// All tasks as persistence records, sorted by ID.
    async fn export_records(&self) -> Result<Vec<TaskRecord>>;

    // ========== Persistence ==========

    /// Save changes to persistent storage.
    ///
    /// A no-op for purely in-memory storage.
    async fn save(&self) -> Result<()>;

    /// Reload state from persistent storage, discarding unsaved changes.
    ///
    /// Used after a failed `save()` to bring memory back in line with disk.
    async fn reload(&mut self) -> Result<()>;
}

/// Storage backend configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// In-memory storage (ephemeral)
    InMemory,

    /// In-memory storage persisted to a JSONL file
    Jsonl(PathBuf),
}

impl StorageBackend {
    /// Returns the data file path for file-based backends.
    pub fn data_path(&self) -> Option<&Path> {
        match self {
            StorageBackend::Jsonl(path) => Some(path),
            StorageBackend::InMemory => None,
        }
    }
}

/// Wrapper that adds JSONL file persistence to in-memory storage.
///
/// Every operation is delegated; `save()` writes the whole graph to `path`
/// atomically and `reload()` rebuilds the inner storage from it.
struct JsonlBackedStorage {
    inner: Box<dyn TaskStorage>,
    path: PathBuf,
    prefix: String,
}

impl JsonlBackedStorage {
    async fn open(path: PathBuf, prefix: String) -> Result<Self> {
        let inner = load_or_empty(&path, &prefix).await?;
        Ok(Self {
            inner,
            path,
            prefix,
        })
    }
}

/// Load the file if it exists, otherwise start empty (first run).
async fn load_or_empty(path: &Path, prefix: &str) -> Result<Box<dyn TaskStorage>> {
    if !path.exists() {
        return Ok(in_memory::new_in_memory_storage(prefix.to_string()));
    }

    let (storage, warnings) = in_memory::load_from_jsonl(path, prefix.to_string()).await?;
    for warning in &warnings {
        tracing::warn!(%warning, "JSONL load warning");
    }
    Ok(Box::new(storage))
}

#[async_trait]
impl TaskStorage for JsonlBackedStorage {
    async fn create(&mut self, new_task: NewTask) -> Result<Task> {
        self.inner.create(new_task).await
    }

    async fn get(&self, id: &TaskId) -> Result<Option<Task>> {
        self.inner.get(id).await
    }

    async fn list(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        self.inner.list(filter).await
    }

    async fn add_dependency(&mut self, task: &TaskId, depends_on: &TaskId) -> Result<()> {
        self.inner.add_dependency(task, depends_on).await
    }

    async fn change_status(
        &mut self,
        id: &TaskId,
        status: TaskStatus,
    ) -> Result<StatusOutcome> {
        self.inner.change_status(id, status).await
    }

    async fn recompute(&mut self, id: &TaskId) -> Result<Vec<StatusChange>> {
        self.inner.recompute(id).await
    }

    async fn dependencies(&self, id: &TaskId) -> Result<Vec<TaskId>> {
        self.inner.dependencies(id).await
    }

    async fn dependents(&self, id: &TaskId) -> Result<Vec<TaskId>> {
        self.inner.dependents(id).await
    }

    async fn would_create_cycle(&self, task: &TaskId, depends_on: &TaskId) -> Result<bool> {
        self.inner.would_create_cycle(task, depends_on).await
    }

    async fn find_path(&self, from: &TaskId, to: &TaskId) -> Result<Option<Vec<TaskId>>> {
        self.inner.find_path(from, to).await
    }

    async fn snapshot(&self) -> Result<GraphSnapshot> {
        self.inner.snapshot().await
    }

    async fn import_records(&mut self, records: Vec<TaskRecord>) -> Result<Vec<LoadWarning>> {
        self.inner.import_records(records).await
    }

    async fn export_records(&self) -> Result<Vec<TaskRecord>> {
        self.inner.export_records().await
    }

    async fn save(&self) -> Result<()> {
        in_memory::save_to_jsonl(self.inner.as_ref(), &self.path).await
    }

    async fn reload(&mut self) -> Result<()> {
        self.inner = load_or_empty(&self.path, &self.prefix).await?;
        Ok(())
    }
}

/// Create a storage instance for the given backend.
///
/// # Arguments
///
/// * `backend` - The storage backend to use
/// * `prefix` - The prefix for generated task IDs (e.g., "proj")
///
/// # Errors
///
/// - `Error::Io` if the JSONL file exists but cannot be read
pub async fn create_storage(backend: StorageBackend, prefix: String) -> Result<Box<dyn TaskStorage>> {
    match backend {
        StorageBackend::InMemory => Ok(in_memory::new_in_memory_storage(prefix)),
        StorageBackend::Jsonl(path) => Ok(Box::new(JsonlBackedStorage::open(path, prefix).await?)),
    }
}
