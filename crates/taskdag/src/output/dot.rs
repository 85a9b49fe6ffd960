//! Graphviz DOT export of a [`GraphSnapshot`].
//!
//! Only nodes and arrows are emitted; layout is left to Graphviz. Arrows
//! point from dependent to prerequisite, matching the graph's own edges.

use crate::domain::{GraphSnapshot, TaskStatus};
use std::fmt::Write;

fn fill_color(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Pending => "white",
        TaskStatus::InProgress => "lightyellow",
        TaskStatus::Completed => "palegreen",
        TaskStatus::Blocked => "lightpink",
    }
}

/// Quote a string as a DOT identifier.
fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Render the snapshot as a `digraph`.
pub fn render_dot(snapshot: &GraphSnapshot) -> String {
    let mut dot = String::from("digraph taskdag {\n  node [shape=box, style=filled];\n");

    // write! into a String cannot fail
    for task in &snapshot.tasks {
        let label = format!("{}\n{}\n[{}]", task.id, task.title, task.status);
        let _ = writeln!(
            dot,
            "  {} [label={}, fillcolor={}];",
            quote(task.id.as_str()),
            quote(&label),
            fill_color(task.status)
        );
    }

    for edge in &snapshot.edges {
        let _ = writeln!(
            dot,
            "  {} -> {};",
            quote(edge.task.as_str()),
            quote(edge.depends_on.as_str())
        );
    }

    dot.push_str("}\n");
    dot
}
