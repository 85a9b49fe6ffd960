//! Output formatting for CLI commands.
//!
//! Every printer comes in two layers: a public `print_*` function that
//! writes to stdout in the requested [`OutputMode`], and a private
//! `write_*_text` function generic over [`Write`] that the tests drive.
//!
//! Submodules:
//! - [`color`]: Color and styling helpers (semantic colors, status icons)
//! - [`dot`]: Graphviz export of a graph snapshot

pub mod color;
pub mod dot;

use crate::domain::{GraphSnapshot, StatusChange, Task, TaskId, TaskStatus};
use serde::Serialize;
use std::env;
use std::io::{self, Write};

pub use color::{error, success, warning};
pub use dot::render_dot;

use color::{arrow, bold, colored_status_icon, colorize_id, colorize_status, dimmed};

// ============================================================================
// Output Configuration
// ============================================================================

/// Settings that control how text output is styled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Whether to use ASCII-only icons instead of Unicode.
    pub use_ascii: bool,
    /// Whether to use colors in output.
    pub use_colors: bool,
}

impl OutputConfig {
    /// Create a new OutputConfig with explicit values.
    pub fn new(use_ascii: bool, use_colors: bool) -> Self {
        Self {
            use_ascii,
            use_colors,
        }
    }

    /// Create an OutputConfig by reading from environment variables.
    ///
    /// Reads:
    /// - `TASKDAG_ASCII`: "1" or "true" for ASCII-only icons (default: false)
    /// - `NO_COLOR`: any value disables colors
    /// - `TASKDAG_COLOR`: "0" or "false" disables colors (default: true)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env), with variables read through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let use_ascii = match lookup("TASKDAG_ASCII") {
            Some(v) if v == "1" || v.eq_ignore_ascii_case("true") => true,
            Some(v) if v == "0" || v.eq_ignore_ascii_case("false") || v.is_empty() => false,
            Some(v) => {
                tracing::warn!(
                    env_var = "TASKDAG_ASCII",
                    value = %v,
                    "Invalid value (expected '1', 'true', '0', or 'false'), using default"
                );
                false
            }
            None => false,
        };

        // https://no-color.org/
        let use_colors = lookup("NO_COLOR").is_none()
            && lookup("TASKDAG_COLOR")
                .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
                .unwrap_or(true);

        Self {
            use_ascii,
            use_colors,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            use_ascii: false,
            use_colors: true,
        }
    }
}

/// Output format mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text format
    Text,
    /// JSON format for programmatic use
    Json,
}

/// Format for the whole-graph snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GraphFormat {
    /// One line per task with its prerequisites
    #[default]
    Text,
    /// The snapshot serialized as JSON
    Json,
    /// Graphviz DOT
    Dot,
}

/// Summary shown by `taskdag info`
#[derive(Debug, Clone, Serialize)]
pub struct RepoInfo {
    /// Task ID prefix
    pub prefix: String,
    /// Persisted data file, if any
    pub data_file: Option<String>,
    /// Number of tasks
    pub tasks: usize,
    /// Number of dependency edges
    pub dependencies: usize,
    /// Task count per status, in [`TaskStatus::ALL`] order
    pub by_status: Vec<(TaskStatus, usize)>,
}

impl RepoInfo {
    /// Tally a snapshot.
    pub fn from_snapshot(prefix: &str, data_file: Option<String>, snapshot: &GraphSnapshot) -> Self {
        let by_status = TaskStatus::ALL
            .iter()
            .map(|status| {
                let count = snapshot
                    .tasks
                    .iter()
                    .filter(|task| task.status == *status)
                    .count();
                (*status, count)
            })
            .collect();

        Self {
            prefix: prefix.to_string(),
            data_file,
            tasks: snapshot.tasks.len(),
            dependencies: snapshot.edges.len(),
            by_status,
        }
    }
}

#[derive(Serialize)]
struct TaskDetails<'a> {
    #[serde(flatten)]
    task: &'a Task,
    depends_on: &'a [TaskId],
    dependents: &'a [TaskId],
}

#[derive(Serialize)]
struct StatusUpdate<'a> {
    task: &'a TaskId,
    from: TaskStatus,
    to: TaskStatus,
    cascade: &'a [StatusChange],
}

#[derive(Serialize)]
struct CycleCheck<'a> {
    task: &'a TaskId,
    depends_on: &'a TaskId,
    would_create_cycle: bool,
    /// Existing path from `depends_on` back to `task`
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<&'a [TaskId]>,
}

#[derive(Serialize)]
struct DependencyList<'a> {
    task: &'a TaskId,
    #[serde(skip_serializing_if = "Option::is_none")]
    depends_on: Option<&'a [TaskId]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dependents: Option<&'a [TaskId]>,
}

// ============================================================================
// Public Dispatch Functions
// ============================================================================

fn with_stdout<F>(f: F) -> io::Result<()>
where
    F: FnOnce(&mut io::StdoutLock<'static>, &OutputConfig) -> io::Result<()>,
{
    let mut handle = io::stdout().lock();
    let config = OutputConfig::from_env();
    f(&mut handle, &config)
}

/// Print a task in the specified format
pub fn print_task(task: &Task, mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Text => with_stdout(|w, config| write_task_line(w, task, config)),
        OutputMode::Json => print_json(task),
    }
}

/// Print a list of tasks in the specified format
pub fn print_tasks(tasks: &[Task], mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Text => with_stdout(|w, config| write_tasks_text(w, tasks, config)),
        OutputMode::Json => print_json(&tasks),
    }
}

/// Print a task with its direct prerequisites and dependents
pub fn print_task_details(
    task: &Task,
    depends_on: &[TaskId],
    dependents: &[TaskId],
    mode: OutputMode,
) -> io::Result<()> {
    match mode {
        OutputMode::Text => with_stdout(|w, config| {
            write_task_details_text(w, task, depends_on, dependents, config)
        }),
        OutputMode::Json => print_json(&TaskDetails {
            task,
            depends_on,
            dependents,
        }),
    }
}

/// Print a direct status change and the cascade it caused
pub fn print_status_change(
    task: &TaskId,
    from: TaskStatus,
    to: TaskStatus,
    cascade: &[StatusChange],
    mode: OutputMode,
) -> io::Result<()> {
    match mode {
        OutputMode::Text => {
            with_stdout(|w, config| write_status_change_text(w, task, from, to, cascade, config))
        }
        OutputMode::Json => print_json(&StatusUpdate {
            task,
            from,
            to,
            cascade,
        }),
    }
}

/// Print the direct prerequisites (or dependents, if `reverse`) of a task
pub fn print_dependencies(
    task: &TaskId,
    ids: &[TaskId],
    reverse: bool,
    mode: OutputMode,
) -> io::Result<()> {
    match mode {
        OutputMode::Text => {
            with_stdout(|w, config| write_dependencies_text(w, task, ids, reverse, config))
        }
        OutputMode::Json => print_json(&DependencyList {
            task,
            depends_on: (!reverse).then_some(ids),
            dependents: reverse.then_some(ids),
        }),
    }
}

/// Print the result of a dry-run cycle check for `task -> depends_on`
pub fn print_cycle_check(
    task: &TaskId,
    depends_on: &TaskId,
    path: Option<&[TaskId]>,
    mode: OutputMode,
) -> io::Result<()> {
    match mode {
        OutputMode::Text => {
            with_stdout(|w, config| write_cycle_check_text(w, task, depends_on, path, config))
        }
        OutputMode::Json => print_json(&CycleCheck {
            task,
            depends_on,
            would_create_cycle: path.is_some(),
            path,
        }),
    }
}

/// Print the whole graph
pub fn print_snapshot(snapshot: &GraphSnapshot, format: GraphFormat) -> io::Result<()> {
    match format {
        GraphFormat::Text => with_stdout(|w, config| write_snapshot_text(w, snapshot, config)),
        GraphFormat::Json => print_json(snapshot),
        GraphFormat::Dot => print_message(render_dot(snapshot).trim_end()),
    }
}

/// Print repository information
pub fn print_info(info: &RepoInfo, mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Text => with_stdout(|w, config| write_info_text(w, info, config)),
        OutputMode::Json => print_json(info),
    }
}

/// Print a simple message
pub fn print_message(msg: &str) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{}", msg)
}

/// Print a JSON-formatted result for any serializable value
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(handle, "{}", json)
}

// ============================================================================
// Text Formatting
// ============================================================================

fn write_task_line<W: Write>(w: &mut W, task: &Task, config: &OutputConfig) -> io::Result<()> {
    writeln!(
        w,
        "{} {}  {}  {}",
        colored_status_icon(task.status, config),
        colorize_id(task.id.as_str(), config),
        colorize_status(task.status, config),
        task.title
    )
}

fn write_tasks_text<W: Write>(w: &mut W, tasks: &[Task], config: &OutputConfig) -> io::Result<()> {
    if tasks.is_empty() {
        return writeln!(w, "No tasks found.");
    }

    writeln!(w, "Found {} task(s):", tasks.len())?;
    writeln!(w)?;
    for task in tasks {
        write_task_line(w, task, config)?;
    }
    Ok(())
}

fn write_id_list<W: Write>(
    w: &mut W,
    title: &str,
    ids: &[TaskId],
    config: &OutputConfig,
) -> io::Result<()> {
    writeln!(w)?;
    writeln!(w, "{} ({}):", bold(title, config), ids.len())?;
    if ids.is_empty() {
        writeln!(w, "  {}", dimmed("(none)", config))?;
    }
    for id in ids {
        writeln!(w, "  {} {}", arrow(config), colorize_id(id.as_str(), config))?;
    }
    Ok(())
}

fn write_task_details_text<W: Write>(
    w: &mut W,
    task: &Task,
    depends_on: &[TaskId],
    dependents: &[TaskId],
    config: &OutputConfig,
) -> io::Result<()> {
    writeln!(
        w,
        "{} {}: {}",
        colored_status_icon(task.status, config),
        colorize_id(task.id.as_str(), config),
        task.title
    )?;
    writeln!(
        w,
        "  {} {}",
        dimmed("Status: ", config),
        colorize_status(task.status, config)
    )?;
    writeln!(
        w,
        "  {} {}",
        dimmed("Created:", config),
        task.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    writeln!(
        w,
        "  {} {}",
        dimmed("Updated:", config),
        task.updated_at.format("%Y-%m-%d %H:%M:%S UTC")
    )?;

    write_id_list(w, "Depends on", depends_on, config)?;
    write_id_list(w, "Dependents", dependents, config)
}

fn write_status_change_text<W: Write>(
    w: &mut W,
    task: &TaskId,
    from: TaskStatus,
    to: TaskStatus,
    cascade: &[StatusChange],
    config: &OutputConfig,
) -> io::Result<()> {
    writeln!(
        w,
        "{} {}: {} {} {}",
        success("Updated", config),
        colorize_id(task.as_str(), config),
        colorize_status(from, config),
        arrow(config),
        colorize_status(to, config)
    )?;

    if cascade.is_empty() {
        return Ok(());
    }

    writeln!(w, "Cascaded to {} dependent(s):", cascade.len())?;
    for change in cascade {
        writeln!(
            w,
            "  {} {}: {} {} {}",
            colored_status_icon(change.to, config),
            colorize_id(change.task.as_str(), config),
            colorize_status(change.from, config),
            arrow(config),
            colorize_status(change.to, config)
        )?;
    }
    Ok(())
}

fn write_dependencies_text<W: Write>(
    w: &mut W,
    task: &TaskId,
    ids: &[TaskId],
    reverse: bool,
    config: &OutputConfig,
) -> io::Result<()> {
    let (empty, heading) = if reverse {
        ("No tasks depend on", "Tasks depending on")
    } else {
        ("No dependencies for", "Dependencies of")
    };

    if ids.is_empty() {
        return writeln!(w, "{} {}.", empty, colorize_id(task.as_str(), config));
    }

    writeln!(w, "{} {}:", heading, colorize_id(task.as_str(), config))?;
    for id in ids {
        writeln!(w, "  {} {}", arrow(config), colorize_id(id.as_str(), config))?;
    }
    Ok(())
}

fn write_cycle_check_text<W: Write>(
    w: &mut W,
    task: &TaskId,
    depends_on: &TaskId,
    path: Option<&[TaskId]>,
    config: &OutputConfig,
) -> io::Result<()> {
    let edge = format!("{} {} {}", task, arrow(config), depends_on);
    let Some(path) = path else {
        return writeln!(w, "{} {} is safe to add.", success("OK", config), edge);
    };

    // The existing path leads back to `task`; the new edge would close it
    let mut cycle: Vec<String> = vec![task.to_string()];
    cycle.extend(path.iter().map(TaskId::to_string));
    let separator = format!(" {} ", arrow(config));

    writeln!(w, "{} {} would create a cycle:", error("Cycle", config), edge)?;
    writeln!(w, "  {}", cycle.join(&separator))
}

fn write_snapshot_text<W: Write>(
    w: &mut W,
    snapshot: &GraphSnapshot,
    config: &OutputConfig,
) -> io::Result<()> {
    if snapshot.tasks.is_empty() {
        return writeln!(w, "No tasks found.");
    }

    for task in &snapshot.tasks {
        writeln!(
            w,
            "{} {}  {}",
            colored_status_icon(task.status, config),
            colorize_id(task.id.as_str(), config),
            task.title
        )?;

        // Edges are sorted by dependent, so each task's run is contiguous
        for edge in snapshot.edges.iter().filter(|e| e.task == task.id) {
            writeln!(
                w,
                "    {} {}",
                arrow(config),
                colorize_id(edge.depends_on.as_str(), config)
            )?;
        }
    }
    writeln!(w)?;
    writeln!(
        w,
        "{} task(s), {} dependenc{}",
        snapshot.tasks.len(),
        snapshot.edges.len(),
        if snapshot.edges.len() == 1 { "y" } else { "ies" }
    )
}

fn write_info_text<W: Write>(w: &mut W, info: &RepoInfo, config: &OutputConfig) -> io::Result<()> {
    writeln!(w, "{}", bold("taskdag repository", config))?;
    writeln!(w, "  {} {}", dimmed("Prefix:      ", config), info.prefix)?;
    writeln!(
        w,
        "  {} {}",
        dimmed("Data file:   ", config),
        info.data_file.as_deref().unwrap_or("(not persisted)")
    )?;
    writeln!(w, "  {} {}", dimmed("Tasks:       ", config), info.tasks)?;
    writeln!(w, "  {} {}", dimmed("Dependencies:", config), info.dependencies)?;
    for (status, count) in &info.by_status {
        writeln!(
            w,
            "    {} {:<12} {}",
            colored_status_icon(*status, config),
            colorize_status(*status, config),
            count
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DependencyEdge, TaskNode};
    use chrono::Utc;
    use std::collections::HashMap;

    fn plain() -> OutputConfig {
        OutputConfig::new(true, false)
    }

    fn task(id: &str, title: &str, status: TaskStatus) -> Task {
        let now = Utc::now();
        Task {
            id: TaskId::new(id),
            title: title.to_string(),
            status,
            created_at: now,
            updated_at: now,
        }
    }

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        let mut buffer = Vec::new();
        f(&mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_output_config_from_lookup() {
        let config = OutputConfig::from_lookup(lookup(&[]));
        assert_eq!(config, OutputConfig::default());

        let config = OutputConfig::from_lookup(lookup(&[("TASKDAG_ASCII", "1")]));
        assert!(config.use_ascii);

        let config = OutputConfig::from_lookup(lookup(&[("TASKDAG_ASCII", "maybe")]));
        assert!(!config.use_ascii);

        let config = OutputConfig::from_lookup(lookup(&[("NO_COLOR", "")]));
        assert!(!config.use_colors, "NO_COLOR should disable colors");

        for value in ["0", "false", "FALSE"] {
            let config = OutputConfig::from_lookup(lookup(&[("TASKDAG_COLOR", value)]));
            assert!(!config.use_colors, "TASKDAG_COLOR={value} should disable colors");
        }

        let config = OutputConfig::from_lookup(lookup(&[("TASKDAG_COLOR", "1")]));
        assert!(config.use_colors);
    }

    #[test]
    fn test_tasks_text() {
        let tasks = vec![
            task("proj-a1", "Write parser", TaskStatus::InProgress),
            task("proj-b2", "Ship", TaskStatus::Pending),
        ];

        let output = render(|w| write_tasks_text(w, &tasks, &plain()));
        assert!(output.starts_with("Found 2 task(s):"));
        assert!(output.contains("> proj-a1  in_progress  Write parser"));
        assert!(output.contains("o proj-b2  pending  Ship"));

        let output = render(|w| write_tasks_text(w, &[], &plain()));
        assert_eq!(output, "No tasks found.\n");
    }

    #[test]
    fn test_task_details_text() {
        let t = task("proj-a1", "Build", TaskStatus::Blocked);
        let output = render(|w| {
            write_task_details_text(w, &t, &[TaskId::new("proj-zz")], &[], &plain())
        });

        assert!(output.contains("x proj-a1: Build"));
        assert!(output.contains("Depends on (1):"));
        assert!(output.contains("-> proj-zz"));
        assert!(output.contains("Dependents (0):"));
        assert!(output.contains("(none)"));
    }

    #[test]
    fn test_task_details_json_flattens_task() {
        let t = task("proj-a1", "Build", TaskStatus::Pending);
        let deps = vec![TaskId::new("proj-b2")];
        let json = serde_json::to_value(TaskDetails {
            task: &t,
            depends_on: &deps,
            dependents: &[],
        })
        .unwrap();

        assert_eq!(json["id"], "proj-a1");
        assert_eq!(json["status"], "pending");
        assert_eq!(json["depends_on"][0], "proj-b2");
        assert!(json["dependents"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_status_change_text_lists_cascade() {
        let cascade = vec![StatusChange {
            task: TaskId::new("proj-b2"),
            from: TaskStatus::Pending,
            to: TaskStatus::InProgress,
        }];
        let output = render(|w| {
            write_status_change_text(
                w,
                &TaskId::new("proj-c3"),
                TaskStatus::Pending,
                TaskStatus::Completed,
                &cascade,
                &plain(),
            )
        });

        assert!(output.contains("Updated proj-c3: pending -> completed"));
        assert!(output.contains("Cascaded to 1 dependent(s):"));
        assert!(output.contains("proj-b2: pending -> in_progress"));
    }

    #[test]
    fn test_cycle_check_text() {
        let a = TaskId::new("proj-a");
        let c = TaskId::new("proj-c");
        let path = vec![c.clone(), TaskId::new("proj-b"), a.clone()];

        let output = render(|w| write_cycle_check_text(w, &c, &a, None, &plain()));
        assert_eq!(output, "OK proj-c -> proj-a is safe to add.\n");

        // adding a -> c where c already reaches a
        let output = render(|w| write_cycle_check_text(w, &a, &c, Some(&path), &plain()));
        assert!(output.contains("would create a cycle"));
        assert!(output.contains("proj-a -> proj-c -> proj-b -> proj-a"));
    }

    #[test]
    fn test_dependencies_text() {
        let id = TaskId::new("proj-a");
        let output = render(|w| write_dependencies_text(w, &id, &[], true, &plain()));
        assert_eq!(output, "No tasks depend on proj-a.\n");

        let ids = vec![TaskId::new("proj-b")];
        let output = render(|w| write_dependencies_text(w, &id, &ids, false, &plain()));
        assert!(output.starts_with("Dependencies of proj-a:"));
        assert!(output.contains("-> proj-b"));
    }

    #[test]
    fn test_snapshot_text_and_info() {
        let snapshot = GraphSnapshot {
            tasks: vec![
                TaskNode {
                    id: TaskId::new("proj-a"),
                    title: "A".to_string(),
                    status: TaskStatus::Pending,
                },
                TaskNode {
                    id: TaskId::new("proj-b"),
                    title: "B".to_string(),
                    status: TaskStatus::Completed,
                },
            ],
            edges: vec![DependencyEdge::new("proj-a", "proj-b")],
        };

        let output = render(|w| write_snapshot_text(w, &snapshot, &plain()));
        assert!(output.contains("o proj-a  A\n    -> proj-b\n"));
        assert!(output.contains("2 task(s), 1 dependency"));

        let info = RepoInfo::from_snapshot("proj", None, &snapshot);
        assert_eq!(info.tasks, 2);
        assert_eq!(info.dependencies, 1);
        assert!(info.by_status.contains(&(TaskStatus::Completed, 1)));

        let output = render(|w| write_info_text(w, &info, &plain()));
        assert!(output.contains("(not persisted)"));
        assert!(output.contains("completed"));
    }
}
