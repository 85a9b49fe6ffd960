//! Status derivation and propagation.
//!
//! A task's derived status depends only on the current statuses of its
//! direct prerequisites:
//!
//! 1. any prerequisite `blocked` -> `blocked`
//! 2. otherwise, every prerequisite `completed` -> `in_progress`
//! 3. otherwise (including no prerequisites at all) -> `pending`
//!
//! `completed` is never derived. It only appears through a direct status
//! change.
//!
//! # Cascade Order
//!
//! After a task changes, [`propagate_from`] collects every task downstream
//! of it and visits them in topological order (Kahn's algorithm restricted
//! to the affected subgraph). A task is recomputed only if one of its
//! prerequisites changed during this run, so each task is evaluated at most
//! once and only after all of its affected prerequisites have settled.

use super::GraphStore;
use crate::domain::{StatusChange, TaskId, TaskStatus};
use crate::error::Result;
use std::collections::{HashMap, HashSet, VecDeque};

/// Apply the derivation rule to a set of prerequisite statuses.
pub fn derive_status<I>(prerequisites: I) -> TaskStatus
where
    I: IntoIterator<Item = TaskStatus>,
{
    let mut any = false;
    let mut all_completed = true;

    for status in prerequisites {
        any = true;
        match status {
            TaskStatus::Blocked => return TaskStatus::Blocked,
            TaskStatus::Completed => {}
            TaskStatus::Pending | TaskStatus::InProgress => all_completed = false,
        }
    }

    if any && all_completed {
        TaskStatus::InProgress
    } else {
        TaskStatus::Pending
    }
}

/// Recompute one task from its prerequisites and store the result.
///
/// Returns the change if the status moved, `None` if it was already at the
/// derived value.
pub fn recompute<G>(graph: &mut G, id: &TaskId) -> Result<Option<StatusChange>>
where
    G: GraphStore + ?Sized,
{
    let prerequisites = graph
        .neighbors(id)?
        .iter()
        .map(|prereq| graph.status(prereq))
        .collect::<Result<Vec<_>>>()?;

    let current = graph.status(id)?;
    let derived = derive_status(prerequisites);
    if derived == current {
        return Ok(None);
    }

    graph.set_status(id, derived)?;
    Ok(Some(StatusChange {
        task: id.clone(),
        from: current,
        to: derived,
    }))
}

/// Propagate a status change on `changed` to everything downstream of it.
///
/// Returns the applied changes in the order they happened. Running it again
/// without an intervening status change returns an empty list.
///
/// # Errors
///
/// Returns `Error::TaskNotFound` if `changed` does not exist.
pub fn propagate_from<G>(graph: &mut G, changed: &TaskId) -> Result<Vec<StatusChange>>
where
    G: GraphStore + ?Sized,
{
    let direct = graph.dependents(changed)?;
    if direct.is_empty() {
        return Ok(Vec::new());
    }

    // Phase 1: everything reachable through dependent edges
    let mut affected: HashSet<TaskId> = HashSet::new();
    let mut queue: VecDeque<TaskId> = direct.iter().cloned().collect();
    while let Some(id) = queue.pop_front() {
        if affected.insert(id.clone()) {
            queue.extend(graph.dependents(&id)?);
        }
    }

    // Phase 2: in-degree of each affected task, counting only affected prerequisites
    let mut in_degree: HashMap<TaskId, usize> = HashMap::with_capacity(affected.len());
    for id in &affected {
        let count = graph
            .neighbors(id)?
            .iter()
            .filter(|prereq| affected.contains(*prereq))
            .count();
        in_degree.insert(id.clone(), count);
    }

    // Phase 3: Kahn's order, recomputing only tasks with a changed prerequisite
    let mut ready: Vec<TaskId> = in_degree
        .iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(id, _)| id.clone())
        .collect();
    ready.sort();
    let mut ready: VecDeque<TaskId> = ready.into();

    let mut dirty: HashSet<TaskId> = direct.into_iter().collect();
    let mut changes = Vec::new();

    while let Some(id) = ready.pop_front() {
        let downstream = graph.dependents(&id)?;

        if dirty.contains(&id) {
            if let Some(change) = recompute(graph, &id)? {
                tracing::debug!(task = %change.task, from = %change.from, to = %change.to, "Status propagated");
                dirty.extend(downstream.iter().cloned());
                changes.push(change);
            }
        }

        let mut next: Vec<TaskId> = Vec::new();
        for dependent in downstream {
            if let Some(degree) = in_degree.get_mut(&dependent) {
                *degree -= 1;
                if *degree == 0 {
                    next.push(dependent);
                }
            }
        }
        next.sort();
        ready.extend(next);
    }

    Ok(changes)
}
