//! Task command implementation.

use super::{report_action, report_empty, set_if_some};
use crate::cli::{IdArg, TaskAddArgs, TaskCommands, TaskEditArgs, TaskFields, TaskListArgs};
use crate::config::Workspace;
use crate::error::{DeskError, Result};
use crate::format::rich::{RichTaskTable, RichTaskTree};
use crate::format::{OutputContext, format_sub_task_line, format_task_line};
use crate::model::{SubTask, Task};
use crate::storage::SqliteStorage;
use crate::validation::validate_task;
use rich_rust::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

/// Execute the task command.
///
/// # Errors
///
/// Returns an error if validation or database operations fail.
pub fn execute(command: &TaskCommands, workspace: &Workspace, ctx: &OutputContext) -> Result<()> {
    match command {
        TaskCommands::Add(args) => task_add(args, workspace, ctx),
        TaskCommands::List(args) => task_list(args, workspace, ctx),
        TaskCommands::Show(args) => task_show(args, workspace, ctx),
        TaskCommands::Edit(args) => task_edit(args, workspace, ctx),
        TaskCommands::Rm(args) => task_rm(args, workspace, ctx),
    }
}

/// JSON output for `task show`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TaskDetails<'a> {
    #[serde(flatten)]
    task: &'a Task,
    sub_tasks: &'a [SubTask],
}

fn apply_fields(task: &mut Task, fields: &TaskFields) {
    set_if_some(&mut task.start_date, fields.start_date.as_ref());
    set_if_some(&mut task.end_date, fields.end_date.as_ref());
    set_if_some(&mut task.guide_link, fields.guide_link.as_ref());
    set_if_some(&mut task.description, fields.description.as_ref());
    set_if_some(&mut task.priority_note, fields.priority_note.as_ref());
}

/// A task's parent must exist and not be soft-deleted.
fn require_live_project(storage: &mut SqliteStorage, project_id: &str) -> Result<()> {
    let project = storage.projects().require(project_id)?;
    if project.is_deleted {
        return Err(DeskError::NotFound {
            store: "projects",
            key: project.id,
        });
    }
    Ok(())
}

fn task_add(args: &TaskAddArgs, workspace: &Workspace, ctx: &OutputContext) -> Result<()> {
    let mut task = Task::new(args.name.trim(), args.project.trim());
    task.priority = args.priority;
    task.is_daily = args.daily;
    apply_fields(&mut task, &args.fields);
    validate_task(&task)?;

    let mut storage = workspace.db.storage()?;
    require_live_project(&mut storage, &task.project_id)?;

    let id = storage.tasks().save(&mut task)?;
    info!(id = %id, project = %task.project_id, "Created task");
    report_action(ctx, "created", "tasks", &id, &task.name)
}

fn task_list(args: &TaskListArgs, workspace: &Workspace, ctx: &OutputContext) -> Result<()> {
    let (tasks, step_counts) = {
        let mut storage = workspace.db.storage()?;
        let mut tasks = if args.all {
            storage.tasks().list_including_deleted()?
        } else {
            storage.tasks().list()?
        };
        if let Some(project) = &args.project {
            tasks.retain(|t| &t.project_id == project);
        }
        if args.daily {
            tasks.retain(|t| t.is_daily);
        }

        let mut counts = BTreeMap::new();
        for task in &tasks {
            counts.insert(task.id.clone(), storage.sub_tasks().for_task(&task.id)?.len());
        }
        (tasks, counts)
    };

    if ctx.is_json() {
        return ctx.json(&tasks);
    }
    if ctx.is_quiet() {
        return Ok(());
    }
    if tasks.is_empty() {
        report_empty(ctx, "tasks");
        return Ok(());
    }

    if ctx.is_rich() {
        let theme = ctx.theme();
        let table = RichTaskTable::new(&tasks, &theme)
            .with_sub_task_counts(&step_counts)
            .build_table();
        Console::default().print_renderable(&table);
    } else {
        for task in &tasks {
            println!("{}", format_task_line(task, ctx.width()));
        }
    }
    Ok(())
}

fn task_show(args: &IdArg, workspace: &Workspace, ctx: &OutputContext) -> Result<()> {
    let (task, sub_tasks) = {
        let mut storage = workspace.db.storage()?;
        let task = storage.tasks().require(&args.id)?;
        let sub_tasks = storage.sub_tasks().for_task(&task.id)?;
        (task, sub_tasks)
    };

    if ctx.is_json() {
        return ctx.json(&TaskDetails {
            task: &task,
            sub_tasks: &sub_tasks,
        });
    }
    if ctx.is_quiet() {
        return Ok(());
    }

    if ctx.is_rich() {
        let console = Console::default();
        console.print_renderable(&RichTaskTree::new(&task, &sub_tasks).build_tree());
        if !task.description.trim().is_empty() {
            console.print_renderable(&Text::new(&task.description));
        }
    } else {
        println!("{}", format_task_line(&task, ctx.width()));
        for sub_task in &sub_tasks {
            println!("  - {}", format_sub_task_line(sub_task, ctx.width().saturating_sub(4)));
        }
    }
    Ok(())
}

fn task_edit(args: &TaskEditArgs, workspace: &Workspace, ctx: &OutputContext) -> Result<()> {
    let mut storage = workspace.db.storage()?;
    let mut task = storage.tasks().require(&args.id)?;

    if let Some(name) = &args.name {
        task.name = name.trim().to_string();
    }
    if let Some(project) = &args.project {
        let project = project.trim();
        if project != task.project_id {
            require_live_project(&mut storage, project)?;
        }
        task.project_id = project.to_string();
    }
    if let Some(priority) = args.priority {
        task.priority = priority;
    }
    if let Some(daily) = args.daily {
        task.is_daily = daily;
    }
    apply_fields(&mut task, &args.fields);
    validate_task(&task)?;

    storage.tasks().save(&mut task)?;
    report_action(ctx, "updated", "tasks", &task.id, &task.name)
}

fn task_rm(args: &IdArg, workspace: &Workspace, ctx: &OutputContext) -> Result<()> {
    let removed = workspace.db.storage()?.tasks().remove(&args.id)?;
    if removed {
        info!(id = %args.id, "Deleted task");
    }
    let status = if removed { "removed" } else { "not_found" };
    report_action(ctx, status, "tasks", &args.id, "task")
}
