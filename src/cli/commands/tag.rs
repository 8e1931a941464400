//! Tag command implementation.

use super::{report_action, report_empty};
use crate::cli::{IdArg, TagAddArgs, TagCommands};
use crate::config::Workspace;
use crate::error::{DeskError, Result};
use crate::format::rich::RichTagTable;
use crate::format::{OutputContext, format_tag_line};
use crate::model::Tag;
use crate::util::color_for_name;
use crate::validation::validate_tag;
use rich_rust::prelude::*;

/// Execute the tag command.
///
/// # Errors
///
/// Returns an error if validation or database operations fail.
pub fn execute(command: &TagCommands, workspace: &Workspace, ctx: &OutputContext) -> Result<()> {
    match command {
        TagCommands::Add(args) => tag_add(args, workspace, ctx),
        TagCommands::List => tag_list(workspace, ctx),
        TagCommands::Rm(args) => tag_rm(args, workspace, ctx),
    }
}

fn new_tag(args: &TagAddArgs) -> Tag {
    let name = args.name.trim().to_string();
    let color = args
        .color
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map_or_else(|| color_for_name(&name).to_string(), ToString::to_string);
    Tag {
        name,
        color,
        ..Tag::default()
    }
}

fn tag_add(args: &TagAddArgs, workspace: &Workspace, ctx: &OutputContext) -> Result<()> {
    let mut tag = new_tag(args);
    validate_tag(&tag)?;

    let mut storage = workspace.db.storage()?;
    if storage.tags().list()?.iter().any(|t| t.name == tag.name) {
        return Err(DeskError::DuplicateKey {
            store: "tags",
            key: tag.name,
        });
    }
    let id = storage.tags().save(&mut tag)?;
    report_action(ctx, "created", "tags", &id, &tag.name)
}

fn tag_list(workspace: &Workspace, ctx: &OutputContext) -> Result<()> {
    let tags = workspace.db.storage()?.tags().list()?;

    if ctx.is_json() {
        return ctx.json(&tags);
    }
    if ctx.is_quiet() {
        return Ok(());
    }
    if tags.is_empty() {
        report_empty(ctx, "tags");
        return Ok(());
    }
    if ctx.is_rich() {
        let theme = ctx.theme();
        Console::default().print_renderable(&RichTagTable::new(&tags, &theme).build_table());
    } else {
        for tag in &tags {
            println!("{}", format_tag_line(tag));
        }
    }
    Ok(())
}

fn tag_rm(args: &IdArg, workspace: &Workspace, ctx: &OutputContext) -> Result<()> {
    let removed = workspace.db.storage()?.tags().remove(&args.id)?;
    let status = if removed { "removed" } else { "not_found" };
    report_action(ctx, status, "tags", &args.id, "tag")
}
