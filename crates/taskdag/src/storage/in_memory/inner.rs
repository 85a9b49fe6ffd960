//! Core in-memory storage data structures.
//!
//! This module contains the inner storage structure that holds all data
//! and is wrapped in `Arc<RwLock<>>` for thread safety.

use super::jsonl::LoadWarning;
use crate::domain::{NewTask, Task, TaskId, TaskRecord, TaskStatus};
use crate::error::{Error, Result, StorageError};
use crate::graph::{would_create_cycle, GraphStore, TaskGraph};
use crate::id_generation::TaskIdGenerator;
use chrono::Utc;
use std::collections::HashSet;

/// Inner storage structure (not thread-safe).
///
/// Owns the [`TaskGraph`] and the ID generator. Every ID in the graph is
/// registered with the generator so new IDs never collide with loaded ones.
#[derive(Debug)]
pub(crate) struct InMemoryStorageInner {
    pub(super) graph: TaskGraph,
    id_generator: TaskIdGenerator,
}

impl InMemoryStorageInner {
    /// Create a new empty storage instance
    pub(crate) fn new(prefix: String) -> Self {
        Self {
            graph: TaskGraph::new(),
            id_generator: TaskIdGenerator::new(prefix),
        }
    }

    /// Create a task and its initial edges as one step.
    ///
    /// Every prerequisite is checked before an ID is generated, so a rejected
    /// request leaves neither a task nor a partial edge set behind. The new
    /// task starts `pending`; its edges cannot close a cycle since nothing
    /// depends on it yet.
    pub(super) fn create_task(&mut self, new_task: NewTask) -> Result<Task> {
        new_task.validate().map_err(Error::Validation)?;

        let mut seen = HashSet::new();
        for dep in &new_task.depends_on {
            if !self.graph.contains(dep) {
                return Err(Error::TaskNotFound(dep.clone()));
            }
            if !seen.insert(dep) {
                return Err(Error::Validation(format!(
                    "Dependency {dep} listed more than once"
                )));
            }
        }

        let id = self
            .id_generator
            .generate(&new_task.title)
            .map_err(|e| StorageError::IdGeneration(e.to_string()))?;

        let now = Utc::now();
        let task = Task {
            id: TaskId::new(id),
            title: new_task.title,
            status: TaskStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        self.graph.insert_task(task.clone())?;
        for dep in &new_task.depends_on {
            self.graph.add_edge(&task.id, dep)?;
        }

        tracing::info!(
            task = %task.id,
            dependencies = new_task.depends_on.len(),
            "Task created"
        );
        Ok(task)
    }

    /// Merge numbered records into the graph.
    ///
    /// Runs in two passes: tasks first, then edges, so a record may depend on
    /// one that appears later in the input. Bad data is skipped and reported
    /// instead of failing the import. Statuses are taken as stored; nothing
    /// is recomputed.
    pub(super) fn import<I>(&mut self, records: I) -> Result<Vec<LoadWarning>>
    where
        I: IntoIterator<Item = (usize, TaskRecord)>,
    {
        let mut warnings = Vec::new();
        let mut pending_edges = Vec::new();

        for (line_number, record) in records {
            let (task, depends_on) = record.into_parts();

            if self.graph.contains(&task.id) {
                warnings.push(LoadWarning::DuplicateTask {
                    task_id: task.id,
                    line_number,
                });
                continue;
            }
            if let Err(error) = task.validate() {
                warnings.push(LoadWarning::InvalidTaskData {
                    task_id: task.id,
                    line_number,
                    error,
                });
                continue;
            }

            self.id_generator.register_id(task.id.as_str());
            pending_edges.push((task.id.clone(), depends_on));
            self.graph.insert_task(task)?;
        }

        for (task, depends_on) in pending_edges {
            for dep in depends_on {
                if !self.graph.contains(&dep) {
                    warnings.push(LoadWarning::OrphanedDependency {
                        from: task.clone(),
                        to: dep,
                    });
                    continue;
                }
                if self.graph.has_edge(&task, &dep) {
                    continue;
                }
                if task == dep || would_create_cycle(&self.graph, &task, &dep)? {
                    warnings.push(LoadWarning::CircularDependency {
                        from: task.clone(),
                        to: dep,
                    });
                    continue;
                }
                self.graph.add_edge(&task, &dep)?;
            }
        }

        Ok(warnings)
    }

    /// Every task as a record with its prerequisites, sorted by ID.
    pub(super) fn export(&self) -> Result<Vec<TaskRecord>> {
        let mut records = self
            .graph
            .tasks()
            .map(|task| {
                let depends_on = self.graph.neighbors(&task.id)?;
                Ok(TaskRecord::from_parts(task.clone(), depends_on))
            })
            .collect::<Result<Vec<_>>>()?;
        records.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(records)
    }
}
