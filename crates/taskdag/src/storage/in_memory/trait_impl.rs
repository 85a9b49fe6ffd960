//! TaskStorage trait implementation for in-memory storage.

use super::{InMemoryStorage, LoadWarning};
use crate::domain::{
    GraphSnapshot, NewTask, StatusChange, StatusOutcome, Task, TaskFilter, TaskId, TaskRecord,
    TaskStatus,
};
use crate::error::{Error, Result};
use crate::graph::{self, GraphStore};
use crate::storage::TaskStorage;
use async_trait::async_trait;

#[async_trait]
impl TaskStorage for InMemoryStorage {
    async fn create(&mut self, new_task: NewTask) -> Result<Task> {
        let mut inner = self.inner.write().await;
        inner.create_task(new_task)
    }

    async fn get(&self, id: &TaskId) -> Result<Option<Task>> {
        let inner = self.inner.read().await;
        Ok(inner.graph.task(id).cloned())
    }

    async fn list(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        let inner = self.inner.read().await;

        let mut tasks: Vec<Task> = inner
            .graph
            .tasks()
            .filter(|task| filter.status.is_none_or(|status| task.status == status))
            .cloned()
            .collect();
        tasks.sort_by(|a, b| a.id.cmp(&b.id));

        if let Some(limit) = filter.limit {
            tasks.truncate(limit);
        }
        Ok(tasks)
    }

    async fn add_dependency(&mut self, task: &TaskId, depends_on: &TaskId) -> Result<()> {
        let mut inner = self.inner.write().await;
        graph::request_add_dependency(&mut inner.graph, task, depends_on)
    }

    async fn change_status(
        &mut self,
        id: &TaskId,
        status: TaskStatus,
    ) -> Result<StatusOutcome> {
        let mut inner = self.inner.write().await;
        graph::request_status_change(&mut inner.graph, id, status)
    }

    async fn recompute(&mut self, id: &TaskId) -> Result<Vec<StatusChange>> {
        let mut inner = self.inner.write().await;

        let Some(change) = graph::recompute(&mut inner.graph, id)? else {
            return Ok(Vec::new());
        };
        let mut changes = vec![change];
        changes.extend(graph::propagate_from(&mut inner.graph, id)?);
        Ok(changes)
    }

    async fn dependencies(&self, id: &TaskId) -> Result<Vec<TaskId>> {
        let inner = self.inner.read().await;
        let mut ids = inner.graph.neighbors(id)?;
        ids.sort();
        Ok(ids)
    }

    async fn dependents(&self, id: &TaskId) -> Result<Vec<TaskId>> {
        let inner = self.inner.read().await;
        let mut ids = inner.graph.dependents(id)?;
        ids.sort();
        Ok(ids)
    }

    async fn would_create_cycle(&self, task: &TaskId, depends_on: &TaskId) -> Result<bool> {
        let inner = self.inner.read().await;
        for id in [task, depends_on] {
            if !inner.graph.contains(id) {
                return Err(Error::TaskNotFound(id.clone()));
            }
        }
        graph::would_create_cycle(&inner.graph, task, depends_on)
    }

    async fn find_path(&self, from: &TaskId, to: &TaskId) -> Result<Option<Vec<TaskId>>> {
        let inner = self.inner.read().await;
        if !inner.graph.contains(to) {
            return Err(Error::TaskNotFound(to.clone()));
        }
        graph::find_path(&inner.graph, from, to)
    }

    async fn snapshot(&self) -> Result<GraphSnapshot> {
        let inner = self.inner.read().await;
        Ok(inner.graph.snapshot())
    }

    async fn import_records(&mut self, records: Vec<TaskRecord>) -> Result<Vec<LoadWarning>> {
        let mut inner = self.inner.write().await;
        let numbered = records
            .into_iter()
            .enumerate()
            .map(|(index, record)| (index + 1, record));
        inner.import(numbered)
    }

    async fn export_records(&self) -> Result<Vec<TaskRecord>> {
        let inner = self.inner.read().await;
        inner.export()
    }

    async fn save(&self) -> Result<()> {
        // Nothing to persist
        Ok(())
    }

    async fn reload(&mut self) -> Result<()> {
        Ok(())
    }
}
