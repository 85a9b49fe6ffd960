//! Dependency graph subsystem.
//!
//! - [`store`]: the [`GraphStore`] contract and its petgraph-backed
//!   implementation [`TaskGraph`]
//! - [`cycle`]: reachability check run before an edge is committed
//! - [`propagate`]: the status derivation rule and its cascade
//! - [`mutation`]: the validated entry points that tie the three together
//!
//! # Edge Direction Convention
//!
//! Edges point from **dependent -> prerequisite**. For a task `A` that
//! depends on `B`, the edge is `A -> B`; `B` is among `A`'s
//! [`neighbors`](GraphStore::neighbors) and `A` is among `B`'s
//! [`dependents`](GraphStore::dependents).
//!
//! The checker and propagator are generic over [`GraphStore`], so they work
//! against any store that honors the contract, not only [`TaskGraph`].

pub mod cycle;
pub mod mutation;
pub mod propagate;
pub mod store;

use crate::domain::{TaskId, TaskStatus};
use crate::error::Result;

pub use cycle::{find_path, would_create_cycle};
pub use mutation::{request_add_dependency, request_status_change};
pub use propagate::{derive_status, propagate_from, recompute};
pub use store::TaskGraph;

/// Read/write access to task statuses and dependency edges.
///
/// Every method that takes an ID fails with
/// [`Error::TaskNotFound`](crate::error::Error::TaskNotFound) when the task
/// does not exist. Results always reflect the committed edge set.
pub trait GraphStore {
    /// Whether a task with this ID exists.
    fn contains(&self, id: &TaskId) -> bool;

    /// IDs the task directly depends on (its prerequisites).
    fn neighbors(&self, id: &TaskId) -> Result<Vec<TaskId>>;

    /// IDs of tasks that directly depend on this task.
    fn dependents(&self, id: &TaskId) -> Result<Vec<TaskId>>;

    /// Insert the edge `task -> depends_on` without checking for cycles.
    ///
    /// Fails with [`Error::DuplicateEdge`](crate::error::Error::DuplicateEdge)
    /// if the identical ordered pair already exists. Callers are responsible
    /// for every other validation.
    fn add_edge(&mut self, task: &TaskId, depends_on: &TaskId) -> Result<()>;

    /// Current status of a task.
    fn status(&self, id: &TaskId) -> Result<TaskStatus>;

    /// Overwrite a task's status.
    fn set_status(&mut self, id: &TaskId, status: TaskStatus) -> Result<()>;
}
