//! Note command implementation.

use super::{report_action, report_empty};
use crate::cli::{IdArg, NoteAddArgs, NoteCommands, NoteEditArgs, NoteListArgs};
use crate::config::Workspace;
use crate::error::Result;
use crate::format::rich::{RichNotePanel, RichNoteTable};
use crate::format::{OutputContext, format_note_line};
use crate::model::Note;
use crate::validation::validate_note;
use rich_rust::prelude::*;
use tracing::info;

/// Execute the note command.
///
/// # Errors
///
/// Returns an error if validation or database operations fail.
pub fn execute(command: &NoteCommands, workspace: &Workspace, ctx: &OutputContext) -> Result<()> {
    match command {
        NoteCommands::Add(args) => note_add(args, workspace, ctx),
        NoteCommands::List(args) => note_list(args, workspace, ctx),
        NoteCommands::Show(args) => note_show(args, workspace, ctx),
        NoteCommands::Edit(args) => note_edit(args, workspace, ctx),
        NoteCommands::Rm(args) => note_rm(args, workspace, ctx),
    }
}

fn note_add(args: &NoteAddArgs, workspace: &Workspace, ctx: &OutputContext) -> Result<()> {
    let mut note = Note::new(args.title.trim(), args.content.clone());
    note.priority = args.priority;
    note.tags.clone_from(&args.tags);
    validate_note(&note)?;

    let id = workspace.db.storage()?.notes().save(&mut note)?;
    info!(id = %id, "Created note");
    report_action(ctx, "created", "notes", &id, &note.title)
}

/// Most urgent first, then most recently updated.
fn sort_notes(notes: &mut [Note]) {
    notes.sort_by(|a, b| {
        a.priority
            .cmp(&b.priority)
            .then_with(|| b.updated_at.cmp(&a.updated_at))
    });
}

fn note_list(args: &NoteListArgs, workspace: &Workspace, ctx: &OutputContext) -> Result<()> {
    let mut notes = {
        let mut storage = workspace.db.storage()?;
        if args.all {
            storage.notes().list_including_deleted()?
        } else {
            storage.notes().list()?
        }
    };
    if let Some(tag) = &args.tag {
        notes.retain(|n| n.tags.iter().any(|t| t == tag));
    }
    sort_notes(&mut notes);

    if ctx.is_json() {
        return ctx.json(&notes);
    }
    if ctx.is_quiet() {
        return Ok(());
    }
    if notes.is_empty() {
        report_empty(ctx, "notes");
        return Ok(());
    }

    if ctx.is_rich() {
        let theme = ctx.theme();
        Console::default().print_renderable(&RichNoteTable::new(&notes, &theme).build_table());
    } else {
        for note in &notes {
            println!("{}", format_note_line(note, ctx.width()));
        }
    }
    Ok(())
}

fn note_show(args: &IdArg, workspace: &Workspace, ctx: &OutputContext) -> Result<()> {
    let note = workspace.db.storage()?.notes().require(&args.id)?;

    if ctx.is_json() {
        return ctx.json(&note);
    }
    if ctx.is_quiet() {
        return Ok(());
    }
    if ctx.is_rich() {
        let theme = ctx.theme();
        Console::default().print_renderable(&RichNotePanel::new(&note, &theme).build_panel());
    } else {
        println!("{}", format_note_line(&note, ctx.width()));
        if !note.content.is_empty() {
            println!();
            println!("{}", note.content);
        }
    }
    Ok(())
}

fn note_edit(args: &NoteEditArgs, workspace: &Workspace, ctx: &OutputContext) -> Result<()> {
    let mut storage = workspace.db.storage()?;
    let mut note = storage.notes().require(&args.id)?;

    if let Some(title) = &args.title {
        note.title = title.trim().to_string();
    }
    if let Some(content) = &args.content {
        note.content.clone_from(content);
    }
    if let Some(priority) = args.priority {
        note.priority = priority;
    }
    if !args.tags.is_empty() {
        note.tags.clone_from(&args.tags);
    }
    validate_note(&note)?;

    storage.notes().save(&mut note)?;
    report_action(ctx, "updated", "notes", &note.id, &note.title)
}

fn note_rm(args: &IdArg, workspace: &Workspace, ctx: &OutputContext) -> Result<()> {
    let removed = workspace.db.storage()?.notes().remove(&args.id)?;
    let status = if removed { "removed" } else { "not_found" };
    report_action(ctx, status, "notes", &args.id, "note")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn urgent_then_recent() {
        let mut old = Note::new("old", "");
        old.priority = 1;
        old.updated_at = Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let mut new = Note::new("new", "");
        new.priority = 1;
        new.updated_at = Some(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap());
        let low = Note::new("low", "");

        let mut notes = vec![low, old, new];
        sort_notes(&mut notes);
        let titles: Vec<_> = notes.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["new", "old", "low"]);
    }
}
