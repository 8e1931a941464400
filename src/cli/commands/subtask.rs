//! Subtask command implementation.
//!
//! Steps are hard-deleted; `clear` removes every step of a task at once.

use super::{report_action, report_empty};
use crate::cli::{IdArg, SubtaskAddArgs, SubtaskCommands, TaskIdArg};
use crate::config::Workspace;
use crate::error::{DeskError, Result};
use crate::format::rich::RichTaskTree;
use crate::format::{OutputContext, format_sub_task_line};
use crate::model::SubTask;
use rich_rust::prelude::*;
use serde::Serialize;
use tracing::info;

/// Execute the subtask command.
///
/// # Errors
///
/// Returns an error if the task is unknown or a database operation fails.
pub fn execute(command: &SubtaskCommands, workspace: &Workspace, ctx: &OutputContext) -> Result<()> {
    match command {
        SubtaskCommands::Add(args) => subtask_add(args, workspace, ctx),
        SubtaskCommands::List(args) => subtask_list(args, workspace, ctx),
        SubtaskCommands::Rm(args) => subtask_rm(args, workspace, ctx),
        SubtaskCommands::Clear(args) => subtask_clear(args, workspace, ctx),
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClearResult<'a> {
    task_id: &'a str,
    removed: usize,
}

fn subtask_add(args: &SubtaskAddArgs, workspace: &Workspace, ctx: &OutputContext) -> Result<()> {
    let mut steps: Vec<SubTask> = args
        .names
        .iter()
        .map(|name| SubTask {
            name: name.trim().to_string(),
            description: args.description.clone().unwrap_or_default(),
            guide_link: args.guide_link.clone().unwrap_or_default(),
            ..SubTask::default()
        })
        .collect();
    if steps.iter().any(|s| s.name.is_empty()) {
        return Err(DeskError::validation("name", "subtask name cannot be empty"));
    }

    let mut storage = workspace.db.storage()?;
    storage.tasks().require(&args.task_id)?;
    let ids = storage.sub_tasks().save_for_task(&args.task_id, &mut steps)?;
    info!(task = %args.task_id, count = ids.len(), "Added subtasks");

    if ctx.is_json() {
        return ctx.json(&steps);
    }
    for step in &steps {
        report_action(ctx, "created", "sub_tasks", &step.id, &step.name)?;
    }
    Ok(())
}

fn subtask_list(args: &TaskIdArg, workspace: &Workspace, ctx: &OutputContext) -> Result<()> {
    let (task, steps) = {
        let mut storage = workspace.db.storage()?;
        let task = storage.tasks().require(&args.task_id)?;
        let steps = storage.sub_tasks().for_task(&task.id)?;
        (task, steps)
    };

    if ctx.is_json() {
        return ctx.json(&steps);
    }
    if ctx.is_quiet() {
        return Ok(());
    }
    if steps.is_empty() {
        report_empty(ctx, "subtasks");
        return Ok(());
    }

    if ctx.is_rich() {
        Console::default().print_renderable(&RichTaskTree::new(&task, &steps).build_tree());
    } else {
        for step in &steps {
            println!("{}", format_sub_task_line(step, ctx.width()));
        }
    }
    Ok(())
}

fn subtask_rm(args: &IdArg, workspace: &Workspace, ctx: &OutputContext) -> Result<()> {
    let removed = workspace.db.storage()?.sub_tasks().remove(&args.id)?;
    let status = if removed { "removed" } else { "not_found" };
    report_action(ctx, status, "sub_tasks", &args.id, "subtask")
}

fn subtask_clear(args: &TaskIdArg, workspace: &Workspace, ctx: &OutputContext) -> Result<()> {
    let removed = workspace.db.storage()?.sub_tasks().delete_for_task(&args.task_id)?;
    info!(task = %args.task_id, removed, "Cleared subtasks");

    if ctx.is_json() {
        return ctx.json(&ClearResult {
            task_id: &args.task_id,
            removed,
        });
    }
    ctx.line(&format!("Removed {removed} subtask(s) from {}", args.task_id));
    Ok(())
}
