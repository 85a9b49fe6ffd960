//! JSONL persistence for in-memory storage.
//!
//! One [`TaskRecord`] per line. Loading is resilient: anything that cannot
//! be used is skipped and reported as a [`LoadWarning`]. Saving writes a
//! temporary file and renames it over the original.

use super::inner::InMemoryStorageInner;
use super::InMemoryStorage;
use crate::domain::{TaskId, TaskRecord};
use crate::error::{Error, Result, StorageError};
use crate::storage::TaskStorage;
use std::fmt;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};

/// Non-fatal problems found while loading a JSONL file.
///
/// The load continues past each of these; the affected line or edge is
/// left out of the resulting storage.
///
/// ```no_run
/// # use taskdag::storage::in_memory::{load_from_jsonl, LoadWarning};
/// # use std::path::Path;
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> anyhow::Result<()> {
/// let (_storage, warnings) =
///     load_from_jsonl(Path::new(".taskdag/tasks.jsonl"), "proj".to_string()).await?;
///
/// for warning in &warnings {
///     eprintln!("warning: {warning}");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    /// Line is not a valid task record.
    ///
    /// **Effect**: Line is skipped entirely.
    MalformedJson {
        /// 1-based line number
        line_number: usize,
        /// Parser message
        error: String,
    },

    /// Record parsed but failed validation (empty or multi-line title, ...).
    ///
    /// **Effect**: The task is skipped, along with its outgoing edges.
    InvalidTaskData {
        /// ID from the record
        task_id: TaskId,
        /// 1-based line number
        line_number: usize,
        /// Validation message
        error: String,
    },

    /// A task with the same ID was already loaded.
    ///
    /// **Effect**: The first occurrence wins; this line is skipped.
    DuplicateTask {
        /// Repeated ID
        task_id: TaskId,
        /// 1-based line number of the skipped copy
        line_number: usize,
    },

    /// Dependency references a task that isn't in the file.
    ///
    /// **Effect**: The edge is skipped; the task itself is loaded.
    OrphanedDependency {
        /// Dependent task
        from: TaskId,
        /// Missing prerequisite
        to: TaskId,
    },

    /// Dependency would close a cycle with edges loaded before it.
    ///
    /// **Effect**: The edge is skipped so the loaded graph stays acyclic.
    CircularDependency {
        /// Dependent task
        from: TaskId,
        /// Prerequisite
        to: TaskId,
    },
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedJson { line_number, error } => {
                write!(f, "line {line_number}: malformed record: {error}")
            }
            Self::InvalidTaskData {
                task_id,
                line_number,
                error,
            } => write!(f, "line {line_number}: invalid task {task_id}: {error}"),
            Self::DuplicateTask {
                task_id,
                line_number,
            } => write!(f, "line {line_number}: duplicate task {task_id} skipped"),
            Self::OrphanedDependency { from, to } => {
                write!(f, "dependency {from} -> {to} skipped: {to} does not exist")
            }
            Self::CircularDependency { from, to } => {
                write!(f, "dependency {from} -> {to} skipped: it would create a cycle")
            }
        }
    }
}

/// Load storage from a JSONL file.
///
/// Blank lines are ignored, and lines that are not valid UTF-8 are reported
/// as malformed like any other unparsable line. Records are imported in two passes (tasks, then
/// edges), so the order of lines in the file does not matter.
///
/// # Errors
///
/// Only I/O failures are errors; data problems become warnings.
pub async fn load_from_jsonl(
    path: &Path,
    prefix: String,
) -> Result<(InMemoryStorage, Vec<LoadWarning>)> {
    let file = File::open(path).await?;
    let mut reader = BufReader::new(file);
    let mut warnings = Vec::new();
    let mut records = Vec::new();
    let mut line_number = 0;
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        line_number += 1;

        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line,
            Err(e) => {
                warnings.push(LoadWarning::MalformedJson {
                    line_number,
                    error: e.to_string(),
                });
                continue;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<TaskRecord>(line) {
            Ok(record) => records.push((line_number, record)),
            Err(e) => warnings.push(LoadWarning::MalformedJson {
                line_number,
                error: e.to_string(),
            }),
        }
    }

    let mut inner = InMemoryStorageInner::new(prefix);
    warnings.extend(inner.import(records)?);

    tracing::debug!(
        path = %path.display(),
        tasks = inner.graph.len(),
        edges = inner.graph.edge_count(),
        warnings = warnings.len(),
        "Loaded JSONL"
    );

    Ok((InMemoryStorage::from_inner(inner), warnings))
}

/// Save storage to a JSONL file with atomic writes.
///
/// Records are written sorted by ID with sorted dependencies, so saving an
/// unchanged graph produces an identical file. The data goes to a `.tmp`
/// sibling first and is renamed over `path` once flushed; if anything fails
/// the original file is untouched.
pub async fn save_to_jsonl(storage: &dyn TaskStorage, path: &Path) -> Result<()> {
    let records = storage.export_records().await?;
    let temp_path = path.with_extension("tmp");

    let file = File::create(&temp_path).await.map_err(Error::Io)?;
    let mut writer = BufWriter::new(file);

    for record in &records {
        let json = serde_json::to_string(record).map_err(StorageError::Serialization)?;
        writer.write_all(json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
    }

    writer.flush().await?;
    writer.into_inner().sync_all().await?;

    tokio::fs::rename(&temp_path, path).await?;

    tracing::debug!(path = %path.display(), tasks = records.len(), "Saved JSONL");
    Ok(())
}
