//! Validated graph mutations.
//!
//! These are the only paths through which edges are created and statuses are
//! changed by request. Each one validates against the current graph without
//! touching it, then commits in a single step, so a rejected request leaves
//! no trace. Callers that share a graph must hold exclusive access for the
//! whole call (the in-memory storage holds its write lock).

use super::cycle::would_create_cycle;
use super::propagate::propagate_from;
use super::GraphStore;
use crate::domain::{StatusChange, StatusOutcome, TaskId, TaskStatus};
use crate::error::{Error, Result};

/// Add the dependency `task -> depends_on` after validating it.
///
/// Validation order:
///
/// 1. both tasks exist (`TaskNotFound`)
/// 2. `task != depends_on` (`SelfDependency`)
/// 3. the edge is new (`DuplicateEdge`)
/// 4. no path `depends_on ->* task` exists (`CycleDetected`)
///
/// Adding an edge does not recompute any status; derived statuses only move
/// when a status changes.
pub fn request_add_dependency<G>(graph: &mut G, task: &TaskId, depends_on: &TaskId) -> Result<()>
where
    G: GraphStore + ?Sized,
{
    for id in [task, depends_on] {
        if !graph.contains(id) {
            return Err(Error::TaskNotFound(id.clone()));
        }
    }

    if task == depends_on {
        return Err(Error::SelfDependency(task.clone()));
    }

    if graph.neighbors(task)?.contains(depends_on) {
        return Err(Error::DuplicateEdge {
            task: task.clone(),
            depends_on: depends_on.clone(),
        });
    }

    if would_create_cycle(graph, task, depends_on)? {
        tracing::debug!(task = %task, depends_on = %depends_on, "Rejected dependency: cycle");
        return Err(Error::CycleDetected {
            task: task.clone(),
            depends_on: depends_on.clone(),
        });
    }

    graph.add_edge(task, depends_on)?;
    tracing::info!(task = %task, depends_on = %depends_on, "Dependency added");
    Ok(())
}

/// Set a task's status directly and cascade the change downstream.
///
/// The status is applied unconditionally (even if unchanged), then every
/// dependent is re-evaluated as described in [`propagate`](super::propagate).
/// Returns the direct change, with the status it replaced, alongside the
/// cascade. The cascade does not include the direct change.
pub fn request_status_change<G>(
    graph: &mut G,
    task: &TaskId,
    status: TaskStatus,
) -> Result<StatusOutcome>
where
    G: GraphStore + ?Sized,
{
    let previous = graph.status(task)?;
    graph.set_status(task, status)?;

    let cascade = propagate_from(graph, task)?;
    tracing::info!(
        task = %task,
        from = %previous,
        to = %status,
        cascaded = cascade.len(),
        "Status changed"
    );
    Ok(StatusOutcome {
        change: StatusChange {
            task: task.clone(),
            from: previous,
            to: status,
        },
        cascade,
    })
}
