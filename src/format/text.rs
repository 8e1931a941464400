//! Plain-text formatting helpers.
//!
//! Used for `--no-color` and non-TTY output, and by the rich renderers for
//! cell contents.

use crate::model::{Note, Project, SubTask, Tag, Task, Wallet};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Width used when nothing better is known.
const FALLBACK_WIDTH: usize = 80;

/// Determine terminal width from environment.
///
/// `COLUMNS` wins, then the real terminal size, then 80.
#[must_use]
pub fn terminal_width() -> usize {
    if let Ok(columns) = std::env::var("COLUMNS") {
        if let Ok(value) = columns.trim().parse::<usize>() {
            if value > 0 {
                return value;
            }
        }
    }

    if let Ok((cols, _)) = crossterm::terminal::size() {
        if cols > 0 {
            return cols as usize;
        }
    }

    FALLBACK_WIDTH
}

/// Cut `text` to at most `max_width` display columns, ending in `…` when cut.
#[must_use]
pub fn truncate(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let budget = max_width - 1;
    let mut used = 0;
    let mut out = String::new();
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(ch);
    }
    out.push('…');
    out
}

/// Shorten an address to `0x1234…abcd` form.
#[must_use]
pub fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 12 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}…{tail}")
}

/// `P1`..`P5`.
#[must_use]
pub fn format_priority(priority: u8) -> String {
    format!("P{priority}")
}

/// Format a USD amount with two decimals.
#[must_use]
pub fn format_usd(value: f64) -> String {
    format!("${value:.2}")
}

#[must_use]
pub fn format_wallet_line(wallet: &Wallet) -> String {
    match wallet.alias.as_deref().filter(|a| !a.trim().is_empty()) {
        Some(alias) => format!("{}  [{}]  {alias}", wallet.address, wallet.wallet_type),
        None => format!("{}  [{}]", wallet.address, wallet.wallet_type),
    }
}

#[must_use]
pub fn format_project_line(project: &Project, width: usize) -> String {
    let mut line = format!("{}  {}", project.id, project.name);
    if project.is_mandatory {
        line.push_str("  *");
    }
    if !project.tags.is_empty() {
        line.push_str(&format!("  [{}]", project.tags.join(", ")));
    }
    truncate(&line, width)
}

#[must_use]
pub fn format_task_line(task: &Task, width: usize) -> String {
    let daily = if task.is_daily { "  (daily)" } else { "" };
    let line = format!(
        "{}  {}  {}{daily}",
        task.id,
        format_priority(task.priority),
        task.name
    );
    truncate(&line, width)
}

#[must_use]
pub fn format_sub_task_line(sub_task: &SubTask, width: usize) -> String {
    truncate(&format!("{}  {}", sub_task.id, sub_task.name), width)
}

#[must_use]
pub fn format_note_line(note: &Note, width: usize) -> String {
    let line = format!(
        "{}  {}  {}",
        note.id,
        format_priority(note.priority),
        note.title
    );
    truncate(&line, width)
}

#[must_use]
pub fn format_tag_line(tag: &Tag) -> String {
    format!("{}  {}  ({})", tag.id, tag.name, tag.color)
}
