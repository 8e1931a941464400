//! Export, import and legacy-import commands.

use crate::cli::{ExportArgs, ImportArgs};
use crate::config::{self, Workspace};
use crate::error::Result;
use crate::format::OutputContext;
use crate::format::rich::{count_labels, format_count_badges};
use crate::sync::{self, SnapshotCounts, legacy};
use chrono::Utc;
use rich_rust::prelude::*;

/// Write a backup file, or the document itself to stdout.
///
/// # Errors
///
/// Returns an error if the target is refused or writing fails.
pub fn export(args: &ExportArgs, workspace: &Workspace, ctx: &OutputContext) -> Result<()> {
    let storage = workspace.db.storage()?;
    let now = Utc::now();

    if args.stdout {
        let mut out = std::io::stdout().lock();
        sync::export_to_writer(&storage, &mut out, now)?;
        return Ok(());
    }

    let target = match &args.output {
        Some(path) => path.clone(),
        None => match config::export_dir(&workspace.layer) {
            Some(dir) => dir,
            None => std::env::current_dir()?,
        },
    };
    let result = sync::export_to_file(&storage, &target, now)?;

    if ctx.is_json() {
        return ctx.json(&result);
    }
    let path = result
        .output_path
        .as_ref()
        .map_or_else(String::new, |p| p.display().to_string());
    report_counts(ctx, &format!("Exported to {path}:"), &result.counts);
    Ok(())
}

/// Replace all records with a backup file.
///
/// # Errors
///
/// Returns an error if the file is refused, invalid, or the import fails.
/// Nothing is changed in that case.
pub fn import(args: &ImportArgs, workspace: &Workspace, ctx: &OutputContext) -> Result<()> {
    let result = sync::import_from_file(&mut *workspace.db.storage()?, &args.file)?;

    if ctx.is_json() {
        return ctx.json(&result);
    }
    report_counts(ctx, "Imported", &result.imported);
    if !result.tags_replaced {
        ctx.line("Backup has no tags; existing tags kept.");
    }
    Ok(())
}

/// Merge an older localStorage dump.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or a write fails.
pub fn import_legacy(args: &ImportArgs, workspace: &Workspace, ctx: &OutputContext) -> Result<()> {
    let result =
        legacy::import_legacy_file(&mut *workspace.db.storage()?, &workspace.slot, &args.file)?;

    if ctx.is_json() {
        return ctx.json(&result);
    }
    ctx.line(&format!(
        "Merged {} wallet(s), {} project(s) ({} already present), {} daily mark(s)",
        result.wallets, result.projects_added, result.projects_skipped, result.daily_marks_added
    ));
    Ok(())
}

fn report_counts(ctx: &OutputContext, heading: &str, counts: &SnapshotCounts) {
    if ctx.is_quiet() {
        return;
    }
    if ctx.is_rich() {
        let theme = ctx.theme();
        let mut text = Text::new("");
        text.append_styled(heading, theme.header.clone());
        let console = Console::default();
        console.print_renderable(&text);
        console.print_renderable(&format_count_badges(counts, &theme));
    } else {
        let labels = count_labels(counts);
        let body = if labels.is_empty() {
            "nothing".to_string()
        } else {
            labels.join(", ")
        };
        println!("{heading} {body}");
    }
}
