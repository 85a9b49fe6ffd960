//! Petgraph-backed graph store.

use super::GraphStore;
use crate::domain::{DependencyEdge, GraphSnapshot, Task, TaskId, TaskNode, TaskStatus};
use crate::error::{Error, Result};
use chrono::Utc;
use petgraph::algo;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::HashMap;

/// Tasks and their dependency edges.
///
/// # Graph Representation
///
/// Uses petgraph's `DiGraph` with edges directed from **dependent to
/// prerequisite**. Nodes hold the `TaskId`; edges carry no weight. Nodes are
/// never removed, so a `NodeIndex` stays valid for the lifetime of the graph.
#[derive(Debug, Default, Clone)]
pub struct TaskGraph {
    /// Tasks indexed by ID for O(1) lookups
    tasks: HashMap<TaskId, Task>,

    /// Dependency graph. Edge direction: source (dependent) -> target (prerequisite).
    graph: DiGraph<TaskId, ()>,

    /// Mapping from TaskId to graph NodeIndex.
    ///
    /// Every task in `tasks` has an entry here.
    node_map: HashMap<TaskId, NodeIndex>,
}

impl TaskGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the graph holds no tasks.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Number of dependency edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Add a task as an isolated node.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` if a task with the same ID already exists.
    pub fn insert_task(&mut self, task: Task) -> Result<()> {
        if self.tasks.contains_key(&task.id) {
            return Err(Error::Validation(format!(
                "Task {} already exists",
                task.id
            )));
        }
        let node = self.graph.add_node(task.id.clone());
        self.node_map.insert(task.id.clone(), node);
        self.tasks.insert(task.id.clone(), task);
        Ok(())
    }

    /// Look up a task.
    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.get(id)
    }

    /// Iterate over all tasks in arbitrary order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    /// Whether the exact edge `task -> depends_on` exists.
    pub fn has_edge(&self, task: &TaskId, depends_on: &TaskId) -> bool {
        match (self.node_map.get(task), self.node_map.get(depends_on)) {
            (Some(from), Some(to)) => self.graph.find_edge(*from, *to).is_some(),
            _ => false,
        }
    }

    /// All edges, sorted.
    pub fn edges(&self) -> Vec<DependencyEdge> {
        let mut edges: Vec<DependencyEdge> = self
            .graph
            .edge_references()
            .map(|edge| DependencyEdge {
                task: self.graph[edge.source()].clone(),
                depends_on: self.graph[edge.target()].clone(),
            })
            .collect();
        edges.sort();
        edges
    }

    /// Whether the edge set is free of cycles.
    ///
    /// Insertion through [`request_add_dependency`](super::request_add_dependency)
    /// keeps this true; it exists to verify graphs assembled some other way.
    pub fn is_acyclic(&self) -> bool {
        !algo::is_cyclic_directed(&self.graph)
    }

    /// Read-only view of every task and edge, sorted by ID.
    pub fn snapshot(&self) -> GraphSnapshot {
        let mut tasks: Vec<TaskNode> = self
            .tasks
            .values()
            .map(|task| TaskNode {
                id: task.id.clone(),
                title: task.title.clone(),
                status: task.status,
            })
            .collect();
        tasks.sort_by(|a, b| a.id.cmp(&b.id));

        GraphSnapshot {
            tasks,
            edges: self.edges(),
        }
    }

    fn node(&self, id: &TaskId) -> Result<NodeIndex> {
        self.node_map
            .get(id)
            .copied()
            .ok_or_else(|| Error::TaskNotFound(id.clone()))
    }
}

impl GraphStore for TaskGraph {
    fn contains(&self, id: &TaskId) -> bool {
        self.tasks.contains_key(id)
    }

    fn neighbors(&self, id: &TaskId) -> Result<Vec<TaskId>> {
        let node = self.node(id)?;
        Ok(self
            .graph
            .edges(node)
            .map(|edge| self.graph[edge.target()].clone())
            .collect())
    }

    fn dependents(&self, id: &TaskId) -> Result<Vec<TaskId>> {
        let node = self.node(id)?;
        Ok(self
            .graph
            .edges_directed(node, Direction::Incoming)
            .map(|edge| self.graph[edge.source()].clone())
            .collect())
    }

    fn add_edge(&mut self, task: &TaskId, depends_on: &TaskId) -> Result<()> {
        let from = self.node(task)?;
        let to = self.node(depends_on)?;

        // find_edge is O(e') in the outgoing edges of `from`
        if self.graph.find_edge(from, to).is_some() {
            return Err(Error::DuplicateEdge {
                task: task.clone(),
                depends_on: depends_on.clone(),
            });
        }

        self.graph.add_edge(from, to, ());
        Ok(())
    }

    fn status(&self, id: &TaskId) -> Result<TaskStatus> {
        self.tasks
            .get(id)
            .map(|task| task.status)
            .ok_or_else(|| Error::TaskNotFound(id.clone()))
    }

    fn set_status(&mut self, id: &TaskId, status: TaskStatus) -> Result<()> {
        let task = self
            .tasks
            .get_mut(id)
            .ok_or_else(|| Error::TaskNotFound(id.clone()))?;
        if task.status != status {
            task.status = status;
            task.updated_at = Utc::now();
        }
        Ok(())
    }
}
