//! Daily command implementation.
//!
//! Completion marks live in the local slot, keyed by day and project name.

use crate::cli::{DailyCommands, DailyShowArgs, DailyToggleArgs};
use crate::config::Workspace;
use crate::error::{DeskError, Result};
use crate::format::rich::build_completion_bar;
use crate::format::{OutputContext, short_address};
use crate::slot::DailyTracker;
use chrono::{NaiveDate, Utc};
use rich_rust::prelude::*;
use serde::Serialize;

/// Execute the daily command.
///
/// # Errors
///
/// Returns an error if the date is malformed or the slot cannot be used.
pub fn execute(command: &DailyCommands, workspace: &Workspace, ctx: &OutputContext) -> Result<()> {
    match command {
        DailyCommands::Toggle(args) => daily_toggle(args, workspace, ctx),
        DailyCommands::Show(args) => daily_show(args, workspace, ctx),
    }
}

#[derive(Serialize)]
struct ToggleResult<'a> {
    date: &'a str,
    project: &'a str,
    wallet: &'a str,
    completed: bool,
}

/// `YYYY-MM-DD`, defaulting to today's UTC date, the key the dashboard uses.
fn resolve_date(date: Option<&String>) -> Result<String> {
    match date {
        None => Ok(Utc::now().date_naive().format("%Y-%m-%d").to_string()),
        Some(value) => NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
            .map(|d| d.format("%Y-%m-%d").to_string())
            .map_err(|_| {
                DeskError::validation("date", format!("Invalid date '{value}': expected YYYY-MM-DD"))
            }),
    }
}

fn daily_toggle(args: &DailyToggleArgs, workspace: &Workspace, ctx: &OutputContext) -> Result<()> {
    let date = resolve_date(args.date.as_ref())?;
    let wallet = args.wallet.trim();
    workspace.db.storage()?.wallets().require(wallet)?;

    let completed = DailyTracker::new(&workspace.slot).toggle(&date, &args.project, wallet)?;

    if ctx.is_json() {
        return ctx.json(&ToggleResult {
            date: &date,
            project: &args.project,
            wallet,
            completed,
        });
    }
    let state = if completed { "done" } else { "not done" };
    ctx.line(&format!("{date} {}: {} {state}", args.project, short_address(wallet)));
    Ok(())
}

fn daily_show(args: &DailyShowArgs, workspace: &Workspace, ctx: &OutputContext) -> Result<()> {
    let date = resolve_date(args.date.as_ref())?;
    let entries = DailyTracker::new(&workspace.slot).for_date(&date)?;

    if ctx.is_json() {
        return ctx.json(&entries);
    }
    if ctx.is_quiet() {
        return Ok(());
    }
    if entries.is_empty() {
        ctx.line(&format!("Nothing completed on {date}."));
        return Ok(());
    }

    let wallet_count = workspace.db.storage()?.wallets().count()?;
    if ctx.is_rich() {
        let theme = ctx.theme();
        let console = Console::default();
        console.print_renderable(&Text::styled(&date, theme.header.clone()));
        for entry in &entries {
            let done = entry.completed_wallets.len();
            let mut line = Text::new("  ");
            line.append_styled(&entry.project, theme.emphasis.clone());
            line.append_styled(&format!("  {done}/{wallet_count}"), theme.muted.clone());
            console.print_renderable(&line);
            console.print_renderable(&build_completion_bar(done, wallet_count));
        }
    } else {
        println!("{date}");
        for entry in &entries {
            println!(
                "  {}  {}/{wallet_count}",
                entry.project,
                entry.completed_wallets.len()
            );
        }
    }
    Ok(())
}
