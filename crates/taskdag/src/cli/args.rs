//! CLI argument structs for all commands.
//!
//! Each command has its own argument struct with clap derive attributes
//! for parsing and validation.

use clap::{Parser, Subcommand};

use super::types::GraphFormatArg;
use super::validators::{parse_status, validate_prefix, validate_task_id, validate_title};
use crate::domain::TaskStatus;

/// Arguments for the `init` command
#[derive(Parser, Debug, Clone)]
pub struct InitArgs {
    /// Task ID prefix (e.g., "proj" for "proj-a3f8")
    ///
    /// Must be 2-20 alphanumeric characters. This prefix is used for all
    /// task IDs in this repository.
    #[arg(short, long, value_parser = validate_prefix)]
    pub prefix: Option<String>,

    /// Suppress output messages
    #[arg(short, long)]
    pub quiet: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug, Clone)]
pub struct InfoArgs {}

/// Arguments for the `create` command
#[derive(Parser, Debug, Clone)]
pub struct CreateArgs {
    /// Task title (single line, at most 200 characters)
    #[arg(long, value_parser = validate_title)]
    pub title: String,

    /// Prerequisites (comma-separated task IDs)
    ///
    /// The task is only created if every listed prerequisite exists.
    #[arg(long, value_delimiter = ',', value_parser = validate_task_id)]
    pub deps: Vec<String>,
}

/// Arguments for the `list` command
#[derive(Parser, Debug, Clone)]
pub struct ListArgs {
    /// Filter by status
    #[arg(short, long, value_parser = parse_status)]
    pub status: Option<TaskStatus>,

    /// Maximum number of tasks to display
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}

/// Arguments for the `show` command
#[derive(Parser, Debug, Clone)]
pub struct ShowArgs {
    /// Task ID to display
    #[arg(value_parser = validate_task_id)]
    pub task_id: String,
}

/// Arguments for the `status` command
#[derive(Parser, Debug, Clone)]
pub struct StatusArgs {
    /// Task ID to update
    #[arg(value_parser = validate_task_id)]
    pub task_id: String,

    /// New status: pending, in_progress, completed or blocked
    #[arg(value_parser = parse_status)]
    pub status: TaskStatus,
}

/// Arguments for the `recompute` command
#[derive(Parser, Debug, Clone)]
pub struct RecomputeArgs {
    /// Task whose status should be re-derived from its prerequisites
    #[arg(value_parser = validate_task_id)]
    pub task_id: String,
}

/// Arguments for the `dep` command
#[derive(Parser, Debug, Clone)]
pub struct DepArgs {
    /// Dependency action
    #[command(subcommand)]
    pub action: DepAction,
}

/// Dependency management actions
#[derive(Subcommand, Debug, Clone)]
pub enum DepAction {
    /// Add a dependency: TASK cannot proceed until DEPENDS_ON is done
    ///
    /// Rejected if it would make a task depend on itself, already exists,
    /// or would create a cycle.
    Add {
        /// Dependent task
        #[arg(value_parser = validate_task_id)]
        task: String,

        /// Prerequisite task
        #[arg(value_parser = validate_task_id)]
        depends_on: String,
    },

    /// List the direct prerequisites of a task
    List {
        /// Task ID
        #[arg(value_parser = validate_task_id)]
        task_id: String,

        /// List the tasks that depend on this one instead
        #[arg(short, long)]
        reverse: bool,
    },

    /// Check whether adding a dependency would create a cycle, without adding it
    Check {
        /// Dependent task
        #[arg(value_parser = validate_task_id)]
        task: String,

        /// Prerequisite task
        #[arg(value_parser = validate_task_id)]
        depends_on: String,
    },
}

/// Arguments for the `graph` command
#[derive(Parser, Debug, Clone)]
pub struct GraphArgs {
    /// Output format (`--json` selects json)
    #[arg(short, long, value_enum, default_value_t = GraphFormatArg::Text)]
    pub format: GraphFormatArg,
}
