//! Cycle detection for proposed dependency edges.
//!
//! Adding `task -> depends_on` closes a cycle exactly when `task` is already
//! reachable from `depends_on` by following prerequisite edges. The search
//! is an explicit-stack DFS with a visited set, so it terminates on any
//! graph and never recurses.

use super::GraphStore;
use crate::domain::TaskId;
use crate::error::Result;
use std::collections::{HashMap, HashSet};

/// Whether adding `task -> depends_on` would create a cycle.
///
/// Self-dependency is a separate error and should be rejected before this
/// is called; for `task == depends_on` this returns `true`.
///
/// # Errors
///
/// Returns `Error::TaskNotFound` if `depends_on` does not exist.
pub fn would_create_cycle<G>(graph: &G, task: &TaskId, depends_on: &TaskId) -> Result<bool>
where
    G: GraphStore + ?Sized,
{
    Ok(find_path(graph, depends_on, task)?.is_some())
}

/// Find a prerequisite path from `from` to `to`.
///
/// Returns the IDs along the path, both endpoints included, or `None` if
/// `to` is unreachable. Nodes unreachable from `from` are never visited.
/// O(V + E).
pub fn find_path<G>(graph: &G, from: &TaskId, to: &TaskId) -> Result<Option<Vec<TaskId>>>
where
    G: GraphStore + ?Sized,
{
    // Node -> the node we reached it from
    let mut parent: HashMap<TaskId, TaskId> = HashMap::new();
    let mut visited: HashSet<TaskId> = HashSet::new();
    let mut stack = vec![from.clone()];

    while let Some(current) = stack.pop() {
        if &current == to {
            let mut path = vec![current];
            while let Some(prev) = path.last().and_then(|last| parent.get(last)) {
                path.push(prev.clone());
            }
            path.reverse();
            tracing::debug!(from = %from, to = %to, visited = visited.len(), "Path found");
            return Ok(Some(path));
        }

        if !visited.insert(current.clone()) {
            continue;
        }

        for next in graph.neighbors(&current)? {
            if !visited.contains(&next) {
                // First discovery wins so the reconstructed path stays a simple path
                parent.entry(next.clone()).or_insert_with(|| current.clone());
                stack.push(next);
            }
        }
    }

    tracing::debug!(from = %from, to = %to, visited = visited.len(), "No path");
    Ok(None)
}
