//! Error types for taskdag operations.
//!
//! Graph errors (`SelfDependency`, `CycleDetected`, `DuplicateEdge`,
//! `TaskNotFound`, `InvalidStatus`) are raised before any mutation happens,
//! so a failed request always leaves the graph exactly as it was.

use crate::domain::TaskId;
use std::io;
use thiserror::Error;

/// The error type for taskdag operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A task was asked to depend on itself.
    #[error("Task {0} cannot depend on itself")]
    SelfDependency(TaskId),

    /// Adding the edge would close a cycle in the dependency graph.
    #[error("Adding dependency {task} -> {depends_on} would create a cycle")]
    CycleDetected {
        /// The dependent task
        task: TaskId,
        /// The prerequisite that already (transitively) depends on `task`
        depends_on: TaskId,
    },

    /// The exact ordered edge is already present.
    #[error("Dependency already exists: {task} -> {depends_on}")]
    DuplicateEdge {
        /// The dependent task
        task: TaskId,
        /// The prerequisite task
        depends_on: TaskId,
    },

    /// Referenced task id does not exist.
    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    /// Status value outside `pending`, `in_progress`, `completed`, `blocked`.
    #[error("Invalid status '{0}'. Valid statuses: pending, in_progress, completed, blocked")]
    InvalidStatus(String),

    /// Task data failed validation (title rules, id format).
    #[error("Validation failed: {0}")]
    Validation(String),

    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON error occurred.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Storage backend error.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors raised while locating, reading or writing `.taskdag/config.yaml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No `.taskdag/` directory was found walking up from the working directory.
    #[error("Not a taskdag repository (or any parent up to the filesystem root). Run 'taskdag init' first")]
    NotInitialized,

    /// `init` was run where a `.taskdag/` directory already exists.
    #[error("taskdag is already initialized in this directory. Found existing '{0}'")]
    AlreadyInitialized(String),

    /// Task ID prefix failed validation.
    #[error("Invalid prefix: {0}")]
    InvalidPrefix(String),

    /// Unknown storage backend name in the config file.
    #[error("Unknown storage backend '{0}'. Valid backends: memory, ephemeral")]
    UnknownBackend(String),

    /// YAML could not be parsed or produced.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Storage backend errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A record could not be serialized for persistence.
    #[error("Serialization failed: {0}")]
    Serialization(serde_json::Error),

    /// The data file is structurally unusable.
    #[error("Invalid data file format: {0}")]
    InvalidFormat(String),

    /// Task ID generation gave up.
    #[error("ID generation failed: {0}")]
    IdGeneration(String),

    /// A save was attempted through a repository opened for reading only.
    #[error("Repository was opened read-only; changes cannot be saved")]
    ReadOnly,
}

/// A specialized Result type for taskdag operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_error_names_both_tasks() {
        let err = Error::CycleDetected {
            task: TaskId::new("proj-c"),
            depends_on: TaskId::new("proj-a"),
        };
        let msg = err.to_string();
        assert!(msg.contains("proj-c -> proj-a"));
        assert!(msg.contains("cycle"));
    }

    #[test]
    fn test_config_error_is_transparent() {
        let err: Error = ConfigError::NotInitialized.into();
        assert!(err.to_string().starts_with("Not a taskdag repository"));
    }

    #[test]
    fn test_invalid_status_lists_valid_values() {
        let err = Error::InvalidStatus("done".to_string());
        assert!(err.to_string().contains("in_progress"));
    }
}
