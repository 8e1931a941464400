//! Command implementations.
//!
//! Each module exposes `execute`, which takes its parsed arguments, the
//! workspace (for commands that touch data) and the output context.

pub mod chain;
pub mod completions;
pub mod daily;
pub mod init;
pub mod note;
pub mod project;
pub mod schema;
pub mod snapshot;
pub mod subtask;
pub mod tag;
pub mod task;
pub mod wallet;

use crate::cli::{Cli, Commands};
use crate::config;
use crate::error::Result;
use crate::format::OutputContext;
use rich_rust::prelude::*;
use serde::Serialize;

/// Run the parsed command line.
///
/// # Errors
///
/// Returns whatever the selected command fails with.
pub fn dispatch(cli: &Cli, ctx: &OutputContext) -> Result<()> {
    match &cli.command {
        Commands::Init(args) => return init::execute(args, ctx),
        Commands::Schema(args) => return schema::execute(args, ctx),
        Commands::Completions(args) => return completions::execute(args),
        _ => {}
    }

    let workspace = config::open_workspace(&cli.overrides())?;
    match &cli.command {
        Commands::Wallet { command } => wallet::execute(command, &workspace, ctx),
        Commands::Project { command } => project::execute(command, &workspace, ctx),
        Commands::Task { command } => task::execute(command, &workspace, ctx),
        Commands::Subtask { command } => subtask::execute(command, &workspace, ctx),
        Commands::Note { command } => note::execute(command, &workspace, ctx),
        Commands::Tag { command } => tag::execute(command, &workspace, ctx),
        Commands::Chain { command } => chain::execute(command, &workspace, ctx),
        Commands::Daily { command } => daily::execute(command, &workspace, ctx),
        Commands::Export(args) => snapshot::export(args, &workspace, ctx),
        Commands::Import(args) => snapshot::import(args, &workspace, ctx),
        Commands::ImportLegacy(args) => snapshot::import_legacy(args, &workspace, ctx),
        Commands::Init(_) | Commands::Schema(_) | Commands::Completions(_) => Ok(()),
    }
}

/// JSON output for create/update/delete commands.
#[derive(Debug, Serialize)]
pub(crate) struct ActionResult<'a> {
    pub status: &'a str,
    pub store: &'a str,
    pub key: &'a str,
}

/// Report a single-record action in the current output mode.
pub(crate) fn report_action(
    ctx: &OutputContext,
    status: &str,
    store: &str,
    key: &str,
    label: &str,
) -> Result<()> {
    if ctx.is_json() {
        return ctx.json(&ActionResult { status, store, key });
    }
    if ctx.is_quiet() {
        return Ok(());
    }

    let theme = ctx.theme();
    let (icon, verb, style) = match status {
        "created" => ("\u{2713}", "Created", theme.success.clone()),
        "updated" => ("\u{2713}", "Updated", theme.success.clone()),
        "removed" => ("\u{2713}", "Removed", theme.success.clone()),
        "restored" => ("\u{2713}", "Restored", theme.success.clone()),
        "unchanged" => ("\u{2022}", "Unchanged", theme.muted.clone()),
        _ => ("\u{2022}", "Not found", theme.muted.clone()),
    };

    if ctx.is_rich() {
        let mut text = Text::new("");
        text.append_styled(&format!("{icon} {verb} "), style);
        text.append(label);
        text.append(" ");
        text.append_styled(key, theme.id.clone());
        Console::default().print_renderable(&text);
    } else {
        println!("{icon} {verb} {label} {key}");
    }
    Ok(())
}

/// Print "No <things>." in the muted style.
pub(crate) fn report_empty(ctx: &OutputContext, what: &str) {
    if ctx.is_rich() {
        let theme = ctx.theme();
        Console::default().print_renderable(&Text::styled(&format!("No {what}."), theme.muted));
    } else {
        ctx.line(&format!("No {what}."));
    }
}

/// Replace `target` when `value` is given.
pub(crate) fn set_if_some(target: &mut String, value: Option<&String>) {
    if let Some(value) = value {
        target.clone_from(value);
    }
}
