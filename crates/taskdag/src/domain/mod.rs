//! Domain types for task tracking.
//!
//! This module contains the core domain types: tasks, their status, the
//! dependency edges between them, and the read-only snapshot handed to
//! renderers.

use crate::error::Error;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum length of a task title in characters.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Unique identifier for a task
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl TaskId {
    /// Create a new task ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Status of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started, or waiting on prerequisites
    #[default]
    Pending,

    /// All prerequisites are done and work can proceed
    InProgress,

    /// Done. Only ever set directly, never derived
    Completed,

    /// At least one prerequisite is blocked
    Blocked,
}

impl TaskStatus {
    /// All statuses in display order.
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Completed,
        TaskStatus::Blocked,
    ];

    /// The snake_case wire name of this status.
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Blocked => "blocked",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = Error;

    /// Parses a status name. Accepts `in-progress` as an alias for
    /// `in_progress`; anything else outside the four names is
    /// [`Error::InvalidStatus`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "pending" => Ok(TaskStatus::Pending),
            "in_progress" | "in-progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            "blocked" => Ok(TaskStatus::Blocked),
            other => Err(Error::InvalidStatus(other.to_string())),
        }
    }
}

/// A unit of work tracked in the dependency graph.
///
/// Edges are not stored on the task; the graph store is the only owner of
/// dependency data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier, immutable once assigned
    pub id: TaskId,

    /// Short single-line title
    pub title: String,

    /// Current status
    pub status: TaskStatus,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last time the title or status changed
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Validate the task's fields.
    pub fn validate(&self) -> Result<(), String> {
        validate_title(&self.title)
    }
}

/// Validate a task title: non-empty, single line, at most [`MAX_TITLE_LENGTH`] characters.
pub fn validate_title(title: &str) -> Result<(), String> {
    if title.trim().is_empty() {
        return Err("Title cannot be empty".to_string());
    }
    let len = title.chars().count();
    if len > MAX_TITLE_LENGTH {
        return Err(format!(
            "Title cannot exceed {} characters, got {} characters",
            MAX_TITLE_LENGTH, len
        ));
    }
    if title.contains('\n') || title.contains('\r') {
        return Err("Title cannot contain newline characters".to_string());
    }
    Ok(())
}

/// Data for creating a new task
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    /// Task title
    pub title: String,

    /// Prerequisites the new task depends on
    pub depends_on: Vec<TaskId>,
}

impl NewTask {
    /// Create a task request with no prerequisites.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            depends_on: Vec::new(),
        }
    }

    /// Validate the request before any ID is generated.
    pub fn validate(&self) -> Result<(), String> {
        validate_title(&self.title)
    }
}

/// Directed dependency: `task` requires `depends_on` to be satisfied first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DependencyEdge {
    /// The dependent task
    pub task: TaskId,

    /// The prerequisite task
    pub depends_on: TaskId,
}

impl DependencyEdge {
    /// Create an edge `task -> depends_on`
    pub fn new(task: impl Into<TaskId>, depends_on: impl Into<TaskId>) -> Self {
        Self {
            task: task.into(),
            depends_on: depends_on.into(),
        }
    }
}

impl fmt::Display for DependencyEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.task, self.depends_on)
    }
}

/// One status transition applied during propagation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    /// Task whose status changed
    pub task: TaskId,

    /// Status before the change
    pub from: TaskStatus,

    /// Status after the change
    pub to: TaskStatus,
}

/// Outcome of a direct status change.
///
/// `change.from` is the status the task had when the change was applied,
/// read under the same exclusive access as the write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusOutcome {
    /// The direct change itself (`from` may equal `to`)
    pub change: StatusChange,

    /// Changes applied to dependents, in propagation order
    pub cascade: Vec<StatusChange>,
}

/// A node in a [`GraphSnapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskNode {
    /// Task ID
    pub id: TaskId,

    /// Task title
    pub title: String,

    /// Current status
    pub status: TaskStatus,
}

/// Read-only view of the whole graph, sufficient to draw nodes and arrows.
///
/// Tasks and edges are sorted by ID so repeated snapshots of the same graph
/// serialize identically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    /// All tasks
    pub tasks: Vec<TaskNode>,

    /// All dependency edges
    pub edges: Vec<DependencyEdge>,
}

/// On-disk representation of a task, one per JSONL line.
///
/// Unlike [`Task`], the record carries the task's outgoing edges, since the
/// file is the only place they are persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Task ID
    pub id: TaskId,

    /// Task title
    pub title: String,

    /// Status at save time
    pub status: TaskStatus,

    /// Prerequisites, sorted
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<TaskId>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl TaskRecord {
    /// Split the record into the task and its outgoing edges.
    pub fn into_parts(self) -> (Task, Vec<TaskId>) {
        let task = Task {
            id: self.id,
            title: self.title,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        };
        (task, self.depends_on)
    }

    /// Build a record from a task and its prerequisites.
    pub fn from_parts(task: Task, mut depends_on: Vec<TaskId>) -> Self {
        depends_on.sort();
        Self {
            id: task.id,
            title: task.title,
            status: task.status,
            depends_on,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

/// Filter for listing tasks
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    /// Only tasks with this status
    pub status: Option<TaskStatus>,

    /// Limit number of results
    pub limit: Option<usize>,
}
