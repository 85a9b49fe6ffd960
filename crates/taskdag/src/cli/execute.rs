//! Command execution logic.
//!
//! This module contains the implementation of all CLI commands.

use anyhow::Result;

use super::args::{
    CreateArgs, DepAction, DepArgs, GraphArgs, InfoArgs, InitArgs, ListArgs, RecomputeArgs,
    ShowArgs, StatusArgs,
};
use super::types::GraphFormatArg;
use crate::app::App;
use crate::domain::{NewTask, TaskFilter, TaskId};
use crate::error::Error;
use crate::output::{self, GraphFormat, OutputMode, RepoInfo};

/// Execute the init command
pub async fn execute_init(args: &InitArgs, output_mode: OutputMode) -> Result<()> {
    use crate::commands::init;

    let current_dir = std::env::current_dir()?;
    let result = init::init(&current_dir, args.prefix.as_deref()).await?;

    match output_mode {
        OutputMode::Json => {
            output::print_json(&serde_json::json!({
                "taskdag_dir": result.taskdag_dir.display().to_string(),
                "config_file": result.config_file.display().to_string(),
                "tasks_file": result.tasks_file.display().to_string(),
                "prefix": result.prefix,
            }))?;
        }
        OutputMode::Text if !args.quiet => {
            println!("Initialized taskdag in {}", result.taskdag_dir.display());
            println!("  Config: {}", result.config_file.display());
            println!("  Tasks:  {}", result.tasks_file.display());
            println!("  Task prefix: {}", result.prefix);
        }
        OutputMode::Text => {}
    }

    Ok(())
}

/// Execute the info command
pub async fn execute_info(app: &App, _args: &InfoArgs, output_mode: OutputMode) -> Result<()> {
    let snapshot = app.storage().snapshot().await?;
    let data_file = app.data_file().map(|p| p.display().to_string());
    let info = RepoInfo::from_snapshot(app.prefix(), data_file, &snapshot);

    output::print_info(&info, output_mode)?;
    Ok(())
}

/// Execute the create command
pub async fn execute_create(
    app: &mut App,
    args: &CreateArgs,
    output_mode: OutputMode,
) -> Result<()> {
    let new_task = NewTask {
        title: args.title.clone(),
        depends_on: args.deps.iter().map(TaskId::new).collect(),
    };

    let task = app.storage_mut().create(new_task).await?;
    app.save().await?;

    match output_mode {
        OutputMode::Json => output::print_task(&task, output_mode)?,
        OutputMode::Text => {
            println!("Created task: {}", task.id);
            output::print_task(&task, output_mode)?;
        }
    }
    Ok(())
}

/// Execute the list command
pub async fn execute_list(app: &App, args: &ListArgs, output_mode: OutputMode) -> Result<()> {
    let filter = TaskFilter {
        status: args.status,
        limit: args.limit,
    };

    let tasks = app.storage().list(&filter).await?;
    output::print_tasks(&tasks, output_mode)?;
    Ok(())
}

/// Execute the show command
pub async fn execute_show(app: &App, args: &ShowArgs, output_mode: OutputMode) -> Result<()> {
    let id = TaskId::new(&args.task_id);
    let storage = app.storage();

    let task = storage
        .get(&id)
        .await?
        .ok_or_else(|| Error::TaskNotFound(id.clone()))?;
    let depends_on = storage.dependencies(&id).await?;
    let dependents = storage.dependents(&id).await?;

    output::print_task_details(&task, &depends_on, &dependents, output_mode)?;
    Ok(())
}

/// Execute the status command
pub async fn execute_status(
    app: &mut App,
    args: &StatusArgs,
    output_mode: OutputMode,
) -> Result<()> {
    let id = TaskId::new(&args.task_id);

    let outcome = app.storage_mut().change_status(&id, args.status).await?;
    app.save().await?;

    let change = &outcome.change;
    output::print_status_change(
        &change.task,
        change.from,
        change.to,
        &outcome.cascade,
        output_mode,
    )?;
    Ok(())
}

/// Execute the recompute command
pub async fn execute_recompute(
    app: &mut App,
    args: &RecomputeArgs,
    output_mode: OutputMode,
) -> Result<()> {
    let id = TaskId::new(&args.task_id);

    let changes = app.storage_mut().recompute(&id).await?;
    let Some((own, cascade)) = changes.split_first() else {
        match output_mode {
            OutputMode::Json => output::print_json(&changes)?,
            OutputMode::Text => println!("{} is already up to date", id),
        }
        return Ok(());
    };
    app.save().await?;

    output::print_status_change(&id, own.from, own.to, cascade, output_mode)?;
    Ok(())
}

/// Execute the dep command
pub async fn execute_dep(app: &mut App, args: &DepArgs, output_mode: OutputMode) -> Result<()> {
    match &args.action {
        DepAction::Add { task, depends_on } => {
            let task_id = TaskId::new(task);
            let depends_on_id = TaskId::new(depends_on);

            app.storage_mut()
                .add_dependency(&task_id, &depends_on_id)
                .await?;
            app.save().await?;

            match output_mode {
                OutputMode::Json => {
                    output::print_json(&serde_json::json!({
                        "action": "add",
                        "task": task,
                        "depends_on": depends_on,
                        "status": "success"
                    }))?;
                }
                OutputMode::Text => {
                    println!("Added dependency: {} -> {}", task, depends_on);
                }
            }
        }
        DepAction::List { task_id, reverse } => {
            let id = TaskId::new(task_id);

            let ids = if *reverse {
                app.storage().dependents(&id).await?
            } else {
                app.storage().dependencies(&id).await?
            };

            output::print_dependencies(&id, &ids, *reverse, output_mode)?;
        }
        DepAction::Check { task, depends_on } => {
            let task_id = TaskId::new(task);
            let depends_on_id = TaskId::new(depends_on);
            let storage = app.storage();

            let path = if storage
                .would_create_cycle(&task_id, &depends_on_id)
                .await?
            {
                storage.find_path(&depends_on_id, &task_id).await?
            } else {
                None
            };

            output::print_cycle_check(&task_id, &depends_on_id, path.as_deref(), output_mode)?;
        }
    }

    Ok(())
}

/// Execute the graph command
pub async fn execute_graph(app: &App, args: &GraphArgs, output_mode: OutputMode) -> Result<()> {
    let format = match (output_mode, args.format) {
        (OutputMode::Json, GraphFormatArg::Text) => GraphFormat::Json,
        (_, format) => format.into(),
    };

    let snapshot = app.storage().snapshot().await?;
    output::print_snapshot(&snapshot, format)?;
    Ok(())
}
