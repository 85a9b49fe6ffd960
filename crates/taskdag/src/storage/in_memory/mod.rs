//! In-memory storage backend built on [`TaskGraph`](crate::graph::TaskGraph).
//!
//! All data is held in RAM. Persistence is layered on top by
//! [`load_from_jsonl`] and [`save_to_jsonl`], which the JSONL-backed storage
//! in the parent module calls; on its own this backend's `save()` and
//! `reload()` are no-ops.
//!
//! # Thread Safety
//!
//! The graph lives behind `Arc<tokio::sync::RwLock<_>>`. Mutations (task
//! creation, edge insertion with its cycle check, a status change with its
//! whole cascade) hold the write guard from validation to commit, so no
//! reader ever observes a half-applied change. Queries share the read guard
//! and run concurrently with each other. No guard is held across file I/O.
//!
//! Cloning an [`InMemoryStorage`] yields another handle to the same graph.

mod inner;
mod jsonl;
mod trait_impl;

use crate::storage::TaskStorage;
use inner::InMemoryStorageInner;
use std::sync::Arc;
use tokio::sync::RwLock;

pub use jsonl::{load_from_jsonl, save_to_jsonl, LoadWarning};

/// Thread-safe in-memory storage handle.
#[derive(Debug, Clone)]
pub struct InMemoryStorage {
    inner: Arc<RwLock<InMemoryStorageInner>>,
}

impl InMemoryStorage {
    /// Create an empty storage whose generated IDs start with `prefix`.
    pub fn new(prefix: String) -> Self {
        Self::from_inner(InMemoryStorageInner::new(prefix))
    }

    fn from_inner(inner: InMemoryStorageInner) -> Self {
        Self {
            inner: Arc::new(RwLock::new(inner)),
        }
    }
}

/// Create a new boxed in-memory storage instance.
///
/// # Example
///
/// ```
/// use taskdag::storage::in_memory::new_in_memory_storage;
/// use taskdag::storage::TaskStorage;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let storage = new_in_memory_storage("proj".to_string());
///     let snapshot = storage.snapshot().await.unwrap();
///     assert!(snapshot.tasks.is_empty());
/// }
/// ```
pub fn new_in_memory_storage(prefix: String) -> Box<dyn TaskStorage> {
    Box::new(InMemoryStorage::new(prefix))
}
