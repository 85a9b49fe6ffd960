//! Color and styling helpers for CLI output.
//!
//! Semantic Color Theme:
//!   - Success/Done:  green  (completed status, completed actions)
//!   - Active:        yellow (in_progress)
//!   - Error/Blocked: red    (blocked status, failures)
//!   - Reference:     cyan   (task IDs, arrows)
//!   - Muted:         dimmed (field labels)
//!   - Default:       white  (pending status)

use crate::domain::TaskStatus;
use colored::{ColoredString, Colorize};

use super::OutputConfig;

fn styled(text: &str, config: &OutputConfig, style: impl FnOnce(&str) -> ColoredString) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    style(text).to_string()
}

/// Apply semantic "success" color (green) to text.
pub fn success(text: &str, config: &OutputConfig) -> String {
    styled(text, config, |t| t.green())
}

/// Apply semantic "error" color (red) to text.
pub fn error(text: &str, config: &OutputConfig) -> String {
    styled(text, config, |t| t.red())
}

/// Apply semantic "warning" color (yellow) to text.
pub fn warning(text: &str, config: &OutputConfig) -> String {
    styled(text, config, |t| t.yellow())
}

/// Apply dimmed style to text (for labels/field names).
pub(crate) fn dimmed(text: &str, config: &OutputConfig) -> String {
    styled(text, config, |t| t.dimmed())
}

/// Apply bold style to text (for section headers).
pub(crate) fn bold(text: &str, config: &OutputConfig) -> String {
    styled(text, config, |t| t.bold())
}

/// Colorize a task ID (cyan).
pub(crate) fn colorize_id(id: &str, config: &OutputConfig) -> String {
    styled(id, config, |t| t.cyan())
}

/// Apply color to status text based on task status.
pub(crate) fn colorize_status(status: TaskStatus, config: &OutputConfig) -> String {
    styled(status.as_str(), config, |t| paint_status(t, status))
}

/// Get a colored status icon, with ASCII fallback support.
pub(crate) fn colored_status_icon(status: TaskStatus, config: &OutputConfig) -> String {
    let icon = if config.use_ascii {
        match status {
            TaskStatus::Pending => "o",
            TaskStatus::InProgress => ">",
            TaskStatus::Blocked => "x",
            TaskStatus::Completed => "+",
        }
    } else {
        match status {
            TaskStatus::Pending => "○",
            TaskStatus::InProgress => "▶",
            TaskStatus::Blocked => "✗",
            TaskStatus::Completed => "✓",
        }
    };

    styled(icon, config, |t| paint_status(t, status))
}

/// Arrow used between a dependent and its prerequisite.
pub(crate) fn arrow(config: &OutputConfig) -> String {
    let arrow = if config.use_ascii { "->" } else { "→" };
    styled(arrow, config, |t| t.cyan())
}

fn paint_status(text: &str, status: TaskStatus) -> ColoredString {
    match status {
        TaskStatus::Pending => text.white(),
        TaskStatus::InProgress => text.yellow(),
        TaskStatus::Blocked => text.red(),
        TaskStatus::Completed => text.green(),
    }
}
