//! CLI argument parsing and command dispatch.
//!
//! This module provides the command-line interface for taskdag using clap's derive API.
//! Each command has its own argument struct with validation and helpful error messages.
//!
//! # Commands
//!
//! - `init`: Initialize a new taskdag repository
//! - `create`: Create a task, optionally with prerequisites
//! - `list`: List tasks with optional filters
//! - `show`: Show a task with its prerequisites and dependents
//! - `status`: Set a task's status and propagate the change
//! - `recompute`: Re-derive a task's status from its prerequisites
//! - `dep`: Add, list or dry-run-check dependencies
//! - `graph`: Print a snapshot of the whole graph
//!
//! # Global Flags
//!
//! - `--json`: Output in JSON format (applies to all commands)
//!
//! # Example
//!
//! ```bash
//! taskdag create --title "Write parser"
//! taskdag create --title "Write tests" --deps proj-a3f8
//! taskdag status proj-a3f8 completed
//! taskdag graph --format dot | dot -Tsvg > graph.svg
//! ```

mod args;
mod execute;
mod types;
mod validators;

use anyhow::Result;
use clap::{Parser, Subcommand};

pub use args::{
    CreateArgs, DepAction, DepArgs, GraphArgs, InfoArgs, InitArgs, ListArgs, RecomputeArgs,
    ShowArgs, StatusArgs,
};
pub use types::GraphFormatArg;
pub use validators::{parse_status, validate_prefix, validate_task_id, validate_title};

/// taskdag - task tracking on a cycle-free dependency graph
///
/// Tasks live in `.taskdag/tasks.jsonl`. A task is blocked while any
/// prerequisite is blocked, and moves to in progress once every
/// prerequisite is completed.
#[derive(Parser, Debug)]
#[command(name = "taskdag")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format for programmatic use
    #[arg(long, global = true)]
    pub json: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Initialize a new taskdag repository
    ///
    /// Creates the `.taskdag/` directory with configuration and an empty task file.
    Init(InitArgs),

    /// Show repository information
    ///
    /// Displays the data file, task prefix and counts per status.
    Info(InfoArgs),

    /// Create a new task
    ///
    /// New tasks start as pending. Every prerequisite given with `--deps`
    /// must already exist.
    Create(CreateArgs),

    /// List tasks with optional filters
    List(ListArgs),

    /// Show a task with its direct prerequisites and dependents
    Show(ShowArgs),

    /// Set a task's status
    ///
    /// Dependents are updated in dependency order: a blocked task blocks
    /// everything downstream, and a task whose prerequisites are all
    /// completed moves to in progress.
    Status(StatusArgs),

    /// Re-derive a task's status from its prerequisites and propagate
    Recompute(RecomputeArgs),

    /// Manage dependencies between tasks
    Dep(DepArgs),

    /// Print the whole graph as text, JSON or Graphviz DOT
    Graph(GraphArgs),
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse CLI arguments from an iterator (for testing)
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Output mode selected by the global flags
    pub fn output_mode(&self) -> crate::output::OutputMode {
        if self.json {
            crate::output::OutputMode::Json
        } else {
            crate::output::OutputMode::Text
        }
    }

    /// Execute the CLI command
    ///
    /// Commands that change the graph hold the repository lock exclusively
    /// from load through save; queries hold it shared.
    pub async fn execute(&self) -> Result<()> {
        use crate::app::App;

        let output_mode = self.output_mode();

        match &self.command {
            Some(Commands::Init(args)) => execute::execute_init(args, output_mode).await,
            Some(Commands::Info(args)) => {
                let app = App::read_only(&std::env::current_dir()?).await?;
                execute::execute_info(&app, args, output_mode).await
            }
            Some(Commands::Create(args)) => {
                let mut app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_create(&mut app, args, output_mode).await
            }
            Some(Commands::List(args)) => {
                let app = App::read_only(&std::env::current_dir()?).await?;
                execute::execute_list(&app, args, output_mode).await
            }
            Some(Commands::Show(args)) => {
                let app = App::read_only(&std::env::current_dir()?).await?;
                execute::execute_show(&app, args, output_mode).await
            }
            Some(Commands::Status(args)) => {
                let mut app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_status(&mut app, args, output_mode).await
            }
            Some(Commands::Recompute(args)) => {
                let mut app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_recompute(&mut app, args, output_mode).await
            }
            Some(Commands::Dep(args)) => {
                let current_dir = std::env::current_dir()?;
                let mut app = match args.action {
                    DepAction::Add { .. } => App::from_directory(&current_dir).await?,
                    DepAction::List { .. } | DepAction::Check { .. } => {
                        App::read_only(&current_dir).await?
                    }
                };
                execute::execute_dep(&mut app, args, output_mode).await
            }
            Some(Commands::Graph(args)) => {
                let app = App::read_only(&std::env::current_dir()?).await?;
                execute::execute_graph(&app, args, output_mode).await
            }
            None => {
                println!("taskdag dependency-aware task tracker");
                println!("Use --help for more information");
                Ok(())
            }
        }
    }
}
