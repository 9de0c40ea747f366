//! Command execution logic.
//!
//! This module contains the implementation of all CLI commands.

use anyhow::{Context, Result};

use super::args::{
    ChainArgs, CheckCycleArgs, DepAction, DepArgs, InitArgs, TaskAction, TaskArgs, ValidateArgs,
};
use crate::app::App;
use crate::domain::{
    DependencyId, DependencyUpdate, EdgeDirection, NewDependency, ProjectId, Task, TaskId,
};
use crate::error::Error;
use crate::output::{self, OutputMode};

/// Execute the init command
pub async fn execute_init(args: &InitArgs, output_mode: OutputMode) -> Result<()> {
    use crate::commands::init;

    let current_dir = std::env::current_dir()?;
    let result = init::init(&current_dir, args.backend.into()).await?;

    match output_mode {
        OutputMode::Json => {
            output::print_json(&serde_json::json!({
                "taskdeps_dir": result.taskdeps_dir.display().to_string(),
                "config_file": result.config_file.display().to_string(),
                "data_file": result.data_file.as_ref().map(|p| p.display().to_string()),
            }))?;
        }
        OutputMode::Text if !args.quiet => {
            println!("Initialized taskdeps in {}", result.taskdeps_dir.display());
            println!("  Config: {}", result.config_file.display());
            if let Some(data_file) = &result.data_file {
                println!("  Data:   {}", data_file.display());
            }
        }
        OutputMode::Text => {}
    }

    Ok(())
}

/// Execute a task subcommand
pub async fn execute_task(app: &App, args: &TaskArgs, output_mode: OutputMode) -> Result<()> {
    match &args.action {
        TaskAction::Add {
            id,
            title,
            status,
            project,
            start,
            due,
        } => {
            let mut task = Task::new(*id, title.clone(), (*status).into());
            task.project_id = project.map(ProjectId);
            task.start_date = *start;
            task.due_date = *due;

            let task = app.storage().upsert_task(task).await?;
            app.save().await?;

            match output_mode {
                OutputMode::Json => output::print_json(&task)?,
                OutputMode::Text => println!("Saved task {}: {}", task.id, task.title),
            }
        }
        TaskAction::List { project } => {
            let tasks = app.storage().list_tasks(project.map(ProjectId)).await?;
            output::print_tasks(&tasks, output_mode)?;
        }
        TaskAction::Show { id } => {
            let id = TaskId(*id);
            let task = app
                .storage()
                .get_task(id)
                .await?
                .with_context(|| format!("Task not found: {id}"))?;
            let predecessors = app.storage().find_by_successor(id).await?;
            let successors = app.storage().find_by_predecessor(id).await?;
            output::print_task_details(&task, &predecessors, &successors, output_mode)?;
        }
        TaskAction::Status { id, status, force } => {
            let id = TaskId(*id);
            let proposed = (*status).into();
            let outcome = match app.storage().set_task_status(id, proposed, *force).await {
                Ok(outcome) => outcome,
                Err(err @ Error::ConstraintViolation { .. }) => {
                    let report = app.storage().can_transition(id, proposed).await?;
                    output::print_report(&report, output_mode)?;
                    return Err(err.into());
                }
                Err(err) => return Err(err.into()),
            };
            app.save().await?;
            output::print_outcome(&outcome, output_mode)?;
        }
    }

    Ok(())
}

/// Execute a dep subcommand
pub async fn execute_dep(app: &App, args: &DepArgs, output_mode: OutputMode) -> Result<()> {
    match &args.action {
        DepAction::Add {
            predecessor,
            successor,
            dep_type,
            lag,
            metadata,
            actor,
        } => {
            let mut new = NewDependency::new(*predecessor, *successor, (*dep_type).into())
                .with_lag(*lag);
            new.metadata = metadata.clone().unwrap_or_default();
            new.created_by = actor.clone();

            let dep = app.storage().insert(new).await?;
            app.save().await?;

            match output_mode {
                OutputMode::Json => output::print_json(&dep)?,
                OutputMode::Text => println!(
                    "Added dependency #{}: {} --[{}]--> {}",
                    dep.id, dep.predecessor_id, dep.dep_type, dep.successor_id
                ),
            }
        }
        DepAction::Update {
            id,
            dep_type,
            lag,
            metadata,
            active,
            actor,
        } => {
            let changes = DependencyUpdate {
                dep_type: dep_type.map(Into::into),
                lag_hours: *lag,
                is_active: *active,
                metadata: metadata.clone(),
                updated_by: actor.clone(),
            };
            if changes.dep_type.is_none()
                && changes.lag_hours.is_none()
                && changes.is_active.is_none()
                && changes.metadata.is_none()
            {
                anyhow::bail!("Nothing to update. Pass --type, --lag, --metadata or --active");
            }

            let dep = app.storage().update(DependencyId(*id), changes).await?;
            app.save().await?;
            output::print_dependency(&dep, output_mode)?;
        }
        DepAction::Rm { id, actor } => {
            let dep = app
                .storage()
                .deactivate(DependencyId(*id), actor.clone())
                .await?;
            app.save().await?;

            match output_mode {
                OutputMode::Json => output::print_json(&dep)?,
                OutputMode::Text => println!("Deactivated dependency #{}", dep.id),
            }
        }
        DepAction::Show { id } => {
            let id = DependencyId(*id);
            let dep = app
                .storage()
                .get_dependency(id)
                .await?
                .with_context(|| format!("Dependency not found: {id}"))?;
            output::print_dependency(&dep, output_mode)?;
        }
        DepAction::List { task, direction } => {
            let direction: EdgeDirection = (*direction).into();
            let deps = app
                .storage()
                .dependencies_for(TaskId(*task), direction)
                .await?;
            let heading = match direction {
                EdgeDirection::Both => format!("Dependencies of task {task}"),
                EdgeDirection::Predecessor => format!("Predecessors of task {task}"),
                EdgeDirection::Successor => format!("Successors of task {task}"),
            };
            output::print_dependencies(&heading, &deps, output_mode)?;
        }
        DepAction::Project {
            project,
            include_inactive,
        } => {
            let deps = app
                .storage()
                .project_dependencies(ProjectId(*project), *include_inactive)
                .await?;
            output::print_dependencies(
                &format!("Dependencies in project {project}"),
                &deps,
                output_mode,
            )?;
        }
    }

    Ok(())
}

/// Execute the chain command
pub async fn execute_chain(app: &App, args: &ChainArgs, output_mode: OutputMode) -> Result<()> {
    let task = TaskId(args.task);
    let direction = args.direction.into();
    let deps = app.storage().walk(task, direction).await?;
    output::print_chain(task, direction, &deps, output_mode)?;
    Ok(())
}

/// Execute the check-cycle command
pub async fn execute_check_cycle(
    app: &App,
    args: &CheckCycleArgs,
    output_mode: OutputMode,
) -> Result<()> {
    let predecessor = TaskId(args.predecessor);
    let successor = TaskId(args.successor);
    let has_cycle = app
        .storage()
        .would_create_cycle(predecessor, successor)
        .await?;
    output::print_cycle_check(predecessor, successor, has_cycle, output_mode)?;
    Ok(())
}

/// Execute the validate command
pub async fn execute_validate(
    app: &App,
    args: &ValidateArgs,
    output_mode: OutputMode,
) -> Result<()> {
    let report = app
        .storage()
        .can_transition(TaskId(args.task), args.status.into())
        .await?;
    output::print_report(&report, output_mode)?;
    Ok(())
}
