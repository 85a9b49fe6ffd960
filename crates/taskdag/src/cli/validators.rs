//! CLI input validation functions.
//!
//! These validators are used by clap's `value_parser` attribute to validate
//! user input at parse time, providing immediate feedback for invalid values.

use crate::domain::{validate_title as validate_task_title, TaskStatus};

/// Validate task ID prefix format.
///
/// Delegates to `commands::init` so the rules live in one place.
pub fn validate_prefix(s: &str) -> Result<String, String> {
    use crate::commands::init;

    let trimmed = s.trim();
    init::validate_prefix(trimmed).map_err(|e| e.to_string())?;
    Ok(trimmed.to_string())
}

/// Validate task ID format.
///
/// Expected format: `prefix-suffix`, where the prefix follows the `init`
/// rules and the suffix is one or more ASCII alphanumerics.
///
/// Examples: `proj-a3f8`, `web-k2x9q`
pub fn validate_task_id(s: &str) -> Result<String, String> {
    let s = s.trim();

    if s.is_empty() {
        return Err("Task ID cannot be empty".to_string());
    }

    let Some((prefix, suffix)) = s.split_once('-') else {
        return Err(format!(
            "Invalid task ID format: '{}'. Expected format: prefix-suffix (e.g., proj-a3f8)",
            s
        ));
    };

    validate_prefix(prefix).map_err(|e| format!("Task ID {}", e.to_lowercase()))?;

    if suffix.is_empty() {
        return Err("Task ID suffix cannot be empty".to_string());
    }

    if !suffix.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err("Task ID suffix must contain only alphanumeric characters".to_string());
    }

    Ok(s.to_string())
}

/// Validate a task title.
pub fn validate_title(s: &str) -> Result<String, String> {
    let trimmed = s.trim();
    validate_task_title(trimmed)?;
    Ok(trimmed.to_string())
}

/// Parse a status name (`pending`, `in_progress`, `completed`, `blocked`).
pub fn parse_status(s: &str) -> Result<TaskStatus, String> {
    s.parse::<TaskStatus>().map_err(|e| e.to_string())
}
