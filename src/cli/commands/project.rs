//! Project command implementation.

use super::{report_action, report_empty, set_if_some};
use crate::cli::{IdArg, ProjectAddArgs, ProjectCommands, ProjectEditArgs, ProjectFields, ProjectListArgs};
use crate::config::Workspace;
use crate::error::Result;
use crate::format::rich::{RichProjectPanel, RichProjectTable};
use crate::format::{OutputContext, format_project_line};
use crate::model::Project;
use crate::validation::validate_project;
use rich_rust::prelude::*;
use tracing::info;

/// Execute the project command.
///
/// # Errors
///
/// Returns an error if validation or database operations fail.
pub fn execute(command: &ProjectCommands, workspace: &Workspace, ctx: &OutputContext) -> Result<()> {
    match command {
        ProjectCommands::Add(args) => project_add(args, workspace, ctx),
        ProjectCommands::List(args) => project_list(args, workspace, ctx),
        ProjectCommands::Show(args) => project_show(args, workspace, ctx),
        ProjectCommands::Edit(args) => project_edit(args, workspace, ctx),
        ProjectCommands::Rm(args) => project_rm(args, workspace, ctx),
        ProjectCommands::Restore(args) => project_restore(args, workspace, ctx),
    }
}

fn apply_fields(project: &mut Project, fields: &ProjectFields) {
    set_if_some(&mut project.description, fields.description.as_ref());
    set_if_some(&mut project.website, fields.website.as_ref());
    set_if_some(&mut project.discord, fields.discord.as_ref());
    set_if_some(&mut project.telegram, fields.telegram.as_ref());
    set_if_some(&mut project.twitter, fields.twitter.as_ref());
    set_if_some(&mut project.stage, fields.stage.as_ref());
    set_if_some(&mut project.airdrop_stage, fields.airdrop_stage.as_ref());
    set_if_some(&mut project.estimated_price, fields.estimated_price.as_ref());
    set_if_some(&mut project.end_date, fields.end_date.as_ref());
    if !fields.tags.is_empty() {
        project.tags.clone_from(&fields.tags);
    }
    if !fields.wallets.is_empty() {
        project.related_wallets.clone_from(&fields.wallets);
    }
}

fn project_add(args: &ProjectAddArgs, workspace: &Workspace, ctx: &OutputContext) -> Result<()> {
    let mut project = Project::new(args.name.trim());
    project.is_mandatory = args.mandatory;
    apply_fields(&mut project, &args.fields);
    validate_project(&project)?;

    let id = workspace.db.storage()?.projects().save(&mut project)?;
    info!(id = %id, name = %project.name, "Created project");
    report_action(ctx, "created", "projects", &id, &project.name)
}

fn project_list(args: &ProjectListArgs, workspace: &Workspace, ctx: &OutputContext) -> Result<()> {
    let mut projects = {
        let mut storage = workspace.db.storage()?;
        if args.all {
            storage.projects().list_including_deleted()?
        } else {
            storage.projects().list()?
        }
    };
    if let Some(tag) = &args.tag {
        projects.retain(|p| p.tags.iter().any(|t| t == tag));
    }
    if args.mandatory {
        projects.retain(|p| p.is_mandatory);
    }

    if ctx.is_json() {
        return ctx.json(&projects);
    }
    if ctx.is_quiet() {
        return Ok(());
    }
    if projects.is_empty() {
        report_empty(ctx, "projects");
        return Ok(());
    }

    if ctx.is_rich() {
        let theme = ctx.theme();
        let name_width = ctx.width().saturating_sub(40).max(16);
        let table = RichProjectTable::new(&projects, &theme)
            .max_name_width(name_width)
            .build_table();
        Console::default().print_renderable(&table);
    } else {
        for project in &projects {
            println!("{}", format_project_line(project, ctx.width()));
        }
    }
    Ok(())
}

fn project_show(args: &IdArg, workspace: &Workspace, ctx: &OutputContext) -> Result<()> {
    let (project, task_count) = {
        let mut storage = workspace.db.storage()?;
        let project = storage.projects().require(&args.id)?;
        let task_count = storage
            .tasks()
            .list()?
            .iter()
            .filter(|t| t.project_id == project.id)
            .count();
        (project, task_count)
    };

    if ctx.is_json() {
        return ctx.json(&project);
    }
    if ctx.is_quiet() {
        return Ok(());
    }

    if ctx.is_rich() {
        let theme = ctx.theme();
        let panel = RichProjectPanel::new(&project, &theme)
            .task_count(task_count)
            .build_panel();
        Console::default().print_renderable(&panel);
    } else {
        println!("{}", format_project_line(&project, ctx.width()));
        if project.is_deleted {
            println!("  (deleted)");
        }
        for (label, value) in [
            ("stage", &project.stage),
            ("website", &project.website),
            ("end date", &project.end_date),
            ("description", &project.description),
        ] {
            if !value.is_empty() {
                println!("  {label}: {value}");
            }
        }
        println!("  tasks: {task_count}");
    }
    Ok(())
}

fn project_edit(args: &ProjectEditArgs, workspace: &Workspace, ctx: &OutputContext) -> Result<()> {
    let mut storage = workspace.db.storage()?;
    let mut project = storage.projects().require(&args.id)?;

    if let Some(name) = &args.name {
        project.name = name.trim().to_string();
    }
    if let Some(mandatory) = args.mandatory {
        project.is_mandatory = mandatory;
    }
    apply_fields(&mut project, &args.fields);
    validate_project(&project)?;

    storage.projects().save(&mut project)?;
    report_action(ctx, "updated", "projects", &project.id, &project.name)
}

fn project_rm(args: &IdArg, workspace: &Workspace, ctx: &OutputContext) -> Result<()> {
    let removed = workspace.db.storage()?.projects().remove(&args.id)?;
    if removed {
        info!(id = %args.id, "Deleted project");
    }
    let status = if removed { "removed" } else { "not_found" };
    report_action(ctx, status, "projects", &args.id, "project")
}

fn project_restore(args: &IdArg, workspace: &Workspace, ctx: &OutputContext) -> Result<()> {
    let mut storage = workspace.db.storage()?;
    let project = storage.projects().require(&args.id)?;
    let restored = storage.projects().restore(&args.id)?;
    if restored {
        info!(id = %args.id, "Restored project");
    }
    let status = if restored { "restored" } else { "unchanged" };
    report_action(ctx, status, "projects", &args.id, &project.name)
}
