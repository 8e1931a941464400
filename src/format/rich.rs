//! Rich terminal output components using rich_rust.
//!
//! - [`RichWalletTable`], [`RichProjectTable`], [`RichTaskTable`],
//!   [`RichNoteTable`], [`RichTagTable`], [`RichChainTable`]: list views
//! - [`RichProjectPanel`], [`RichNotePanel`]: single-record details
//! - [`RichTaskTree`]: a task with its checklist
//! - [`format_count_badges`], [`build_completion_bar`]: summaries
//!
//! Plain mode uses the line formatters in `text.rs` instead.

use crate::format::text::{format_priority, format_usd, short_address, truncate};
use crate::format::theme::Theme;
use crate::model::{Chain, Note, Project, SubTask, Tag, Task, Wallet};
use crate::sync::SnapshotCounts;
use rich_rust::prelude::*;
use std::collections::BTreeMap;

fn dash_if_empty(value: &str) -> String {
    if value.trim().is_empty() {
        "-".to_string()
    } else {
        value.to_string()
    }
}

/// Wallets, optionally with a balance column.
pub struct RichWalletTable<'a> {
    wallets: &'a [Wallet],
    theme: &'a Theme,
    balances: Option<&'a BTreeMap<String, f64>>,
    full_address: bool,
}

impl<'a> RichWalletTable<'a> {
    #[must_use]
    pub const fn new(wallets: &'a [Wallet], theme: &'a Theme) -> Self {
        Self {
            wallets,
            theme,
            balances: None,
            full_address: false,
        }
    }

    #[must_use]
    pub const fn with_balances(mut self, balances: &'a BTreeMap<String, f64>) -> Self {
        self.balances = Some(balances);
        self
    }

    #[must_use]
    pub const fn full_address(mut self, full: bool) -> Self {
        self.full_address = full;
        self
    }

    #[must_use]
    pub fn build_table(&self) -> Table {
        let mut table = Table::new()
            .with_column(Column::new("Address"))
            .with_column(Column::new("Type"))
            .with_column(Column::new("Alias"))
            .with_column(Column::new("Twitter"));
        if self.balances.is_some() {
            table = table.with_column(Column::new("Balance").justify(JustifyMethod::Right));
        }

        for wallet in self.wallets {
            let address = if self.full_address {
                wallet.address.clone()
            } else {
                short_address(&wallet.address)
            };
            let mut cells = vec![
                Cell::new(address).style(self.theme.address.clone()),
                Cell::new(&*wallet.wallet_type)
                    .style(self.theme.wallet_type_style(&wallet.wallet_type).clone()),
                Cell::new(dash_if_empty(wallet.alias.as_deref().unwrap_or_default())),
                Cell::new(dash_if_empty(wallet.twitter.as_deref().unwrap_or_default())),
            ];
            if let Some(balances) = self.balances {
                let value = balances.get(&wallet.address).copied().unwrap_or(0.0);
                cells.push(Cell::new(format_usd(value)).style(self.theme.amount.clone()));
            }
            table = table.with_row(Row::new(cells));
        }

        table
    }
}

/// Projects with their tags and stage.
pub struct RichProjectTable<'a> {
    projects: &'a [Project],
    theme: &'a Theme,
    max_name_width: Option<usize>,
}

impl<'a> RichProjectTable<'a> {
    #[must_use]
    pub const fn new(projects: &'a [Project], theme: &'a Theme) -> Self {
        Self {
            projects,
            theme,
            max_name_width: None,
        }
    }

    #[must_use]
    pub const fn max_name_width(mut self, width: usize) -> Self {
        self.max_name_width = Some(width);
        self
    }

    #[must_use]
    pub fn build_table(&self) -> Table {
        let mut table = Table::new()
            .with_column(Column::new("").width(2))
            .with_column(Column::new("ID"))
            .with_column(Column::new("Name"))
            .with_column(Column::new("Stage"))
            .with_column(Column::new("Tags"))
            .with_column(Column::new("Wallets").justify(JustifyMethod::Right));

        for project in self.projects {
            let marker = if project.is_mandatory { "*" } else { "" };
            let name = self
                .max_name_width
                .map_or_else(|| project.name.clone(), |w| truncate(&project.name, w));

            let tag_style = project
                .tags
                .first()
                .map_or_else(Style::new, |tag| Theme::tag_style(tag, None));

            let cells = vec![
                Cell::new(marker).style(self.theme.warning.clone()),
                Cell::new(&*project.id).style(self.theme.id.clone()),
                Cell::new(name).style(self.theme.emphasis.clone()),
                Cell::new(dash_if_empty(&project.stage)).style(self.theme.muted.clone()),
                Cell::new(project.tags.join(", ")).style(tag_style),
                Cell::new(project.related_wallets.len().to_string()),
            ];
            table = table.with_row(Row::new(cells));
        }

        table
    }
}

/// Tasks with priority and schedule.
pub struct RichTaskTable<'a> {
    tasks: &'a [Task],
    theme: &'a Theme,
    sub_task_counts: Option<&'a BTreeMap<String, usize>>,
}

impl<'a> RichTaskTable<'a> {
    #[must_use]
    pub const fn new(tasks: &'a [Task], theme: &'a Theme) -> Self {
        Self {
            tasks,
            theme,
            sub_task_counts: None,
        }
    }

    #[must_use]
    pub const fn with_sub_task_counts(mut self, counts: &'a BTreeMap<String, usize>) -> Self {
        self.sub_task_counts = Some(counts);
        self
    }

    #[must_use]
    pub fn build_table(&self) -> Table {
        let mut table = Table::new()
            .with_column(Column::new("ID"))
            .with_column(Column::new("Pri").justify(JustifyMethod::Center))
            .with_column(Column::new("Name"))
            .with_column(Column::new("Ends"))
            .with_column(Column::new("Daily").justify(JustifyMethod::Center));
        if self.sub_task_counts.is_some() {
            table = table.with_column(Column::new("Steps").justify(JustifyMethod::Right));
        }

        for task in self.tasks {
            let mut cells = vec![
                Cell::new(&*task.id).style(self.theme.id.clone()),
                Cell::new(format_priority(task.priority))
                    .style(self.theme.priority_style(task.priority).clone()),
                Cell::new(&*task.name),
                Cell::new(dash_if_empty(&task.end_date)).style(self.theme.muted.clone()),
                Cell::new(if task.is_daily { "●" } else { "" }).style(self.theme.daily.clone()),
            ];
            if let Some(counts) = self.sub_task_counts {
                let count = counts.get(&task.id).copied().unwrap_or(0);
                cells.push(Cell::new(count.to_string()));
            }
            table = table.with_row(Row::new(cells));
        }

        table
    }
}

pub struct RichNoteTable<'a> {
    notes: &'a [Note],
    theme: &'a Theme,
}

impl<'a> RichNoteTable<'a> {
    #[must_use]
    pub const fn new(notes: &'a [Note], theme: &'a Theme) -> Self {
        Self { notes, theme }
    }

    #[must_use]
    pub fn build_table(&self) -> Table {
        let mut table = Table::new()
            .with_column(Column::new("ID"))
            .with_column(Column::new("Pri").justify(JustifyMethod::Center))
            .with_column(Column::new("Title"))
            .with_column(Column::new("Tags"))
            .with_column(Column::new("Updated"));

        for note in self.notes {
            let updated = note
                .updated_at
                .map_or_else(|| "-".to_string(), |at| at.format("%Y-%m-%d").to_string());
            let cells = vec![
                Cell::new(&*note.id).style(self.theme.id.clone()),
                Cell::new(format_priority(note.priority))
                    .style(self.theme.priority_style(note.priority).clone()),
                Cell::new(truncate(&note.title, 48)),
                Cell::new(note.tags.join(", ")).style(self.theme.muted.clone()),
                Cell::new(updated).style(self.theme.muted.clone()),
            ];
            table = table.with_row(Row::new(cells));
        }

        table
    }
}

pub struct RichTagTable<'a> {
    tags: &'a [Tag],
    theme: &'a Theme,
}

impl<'a> RichTagTable<'a> {
    #[must_use]
    pub const fn new(tags: &'a [Tag], theme: &'a Theme) -> Self {
        Self { tags, theme }
    }

    #[must_use]
    pub fn build_table(&self) -> Table {
        let mut table = Table::new()
            .with_column(Column::new("ID"))
            .with_column(Column::new("Name"))
            .with_column(Column::new("Color"));

        for tag in self.tags {
            let style = Theme::tag_style(&tag.name, Some(&tag.color));
            let cells = vec![
                Cell::new(&*tag.id).style(self.theme.id.clone()),
                Cell::new(&*tag.name).style(style),
                Cell::new(dash_if_empty(&tag.color)).style(self.theme.muted.clone()),
            ];
            table = table.with_row(Row::new(cells));
        }

        table
    }
}

pub struct RichChainTable<'a> {
    chains: &'a [Chain],
    theme: &'a Theme,
}

impl<'a> RichChainTable<'a> {
    #[must_use]
    pub const fn new(chains: &'a [Chain], theme: &'a Theme) -> Self {
        Self { chains, theme }
    }

    #[must_use]
    pub fn build_table(&self) -> Table {
        let mut table = Table::new()
            .with_column(Column::new("Index").justify(JustifyMethod::Right))
            .with_column(Column::new("Name"))
            .with_column(Column::new("Short"))
            .with_column(Column::new("Updated"));

        for chain in self.chains {
            let updated = chain.last_updated.map_or_else(
                || "-".to_string(),
                |at| at.format("%Y-%m-%d %H:%M").to_string(),
            );
            let cells = vec![
                Cell::new(&*chain.chain_index).style(self.theme.id.clone()),
                Cell::new(&*chain.name),
                Cell::new(dash_if_empty(&chain.short_name)),
                Cell::new(updated).style(self.theme.muted.clone()),
            ];
            table = table.with_row(Row::new(cells));
        }

        table
    }
}

fn panel_lines(content: &str) -> Vec<Vec<Segment<'static>>> {
    content
        .lines()
        .map(|line| vec![Segment::new(line.to_owned(), None)])
        .collect()
}

/// Full details of one project.
pub struct RichProjectPanel<'a> {
    project: &'a Project,
    theme: &'a Theme,
    task_count: Option<usize>,
}

impl<'a> RichProjectPanel<'a> {
    #[must_use]
    pub const fn new(project: &'a Project, theme: &'a Theme) -> Self {
        Self {
            project,
            theme,
            task_count: None,
        }
    }

    #[must_use]
    pub const fn task_count(mut self, count: usize) -> Self {
        self.task_count = Some(count);
        self
    }

    #[must_use]
    pub fn build_panel(&self) -> Panel<'static> {
        let p = self.project;
        let mut content = String::new();

        content.push_str(&p.name);
        if p.is_mandatory {
            content.push_str("  (mandatory)");
        }
        content.push('\n');

        let fields = [
            ("Stage", &p.stage),
            ("Airdrop", &p.airdrop_stage),
            ("Est. price", &p.estimated_price),
            ("Ends", &p.end_date),
            ("Website", &p.website),
            ("Discord", &p.discord),
            ("Telegram", &p.telegram),
            ("Twitter", &p.twitter),
        ];
        for (label, value) in fields {
            if !value.trim().is_empty() {
                content.push_str(&format!("{label}: {value}\n"));
            }
        }
        if !p.tags.is_empty() {
            content.push_str(&format!("Tags: {}\n", p.tags.join(", ")));
        }
        if !p.related_wallets.is_empty() {
            let wallets: Vec<String> = p.related_wallets.iter().map(|w| short_address(w)).collect();
            content.push_str(&format!("Wallets: {}\n", wallets.join(", ")));
        }
        if let Some(count) = self.task_count {
            content.push_str(&format!("Tasks: {count}\n"));
        }
        if !p.description.trim().is_empty() {
            content.push('\n');
            content.push_str(&p.description);
        }

        let border = if p.is_mandatory {
            self.theme.warning.clone()
        } else {
            self.theme.border.clone()
        };

        Panel::new(panel_lines(&content))
            .title(p.id.clone())
            .border_style(border)
    }
}

pub struct RichNotePanel<'a> {
    note: &'a Note,
    theme: &'a Theme,
}

impl<'a> RichNotePanel<'a> {
    #[must_use]
    pub const fn new(note: &'a Note, theme: &'a Theme) -> Self {
        Self { note, theme }
    }

    #[must_use]
    pub fn build_panel(&self) -> Panel<'static> {
        let note = self.note;
        let mut content = format!("{} [{}]\n", note.title, format_priority(note.priority));
        if !note.tags.is_empty() {
            content.push_str(&format!("Tags: {}\n", note.tags.join(", ")));
        }
        if !note.content.trim().is_empty() {
            content.push('\n');
            content.push_str(&note.content);
        }

        Panel::new(panel_lines(&content))
            .title(note.id.clone())
            .border_style(self.theme.priority_style(note.priority).clone())
    }
}

/// A task and its checklist steps.
pub struct RichTaskTree<'a> {
    task: &'a Task,
    sub_tasks: &'a [SubTask],
}

impl<'a> RichTaskTree<'a> {
    #[must_use]
    pub const fn new(task: &'a Task, sub_tasks: &'a [SubTask]) -> Self {
        Self { task, sub_tasks }
    }

    #[must_use]
    pub fn build_tree(&self) -> Tree {
        let daily = if self.task.is_daily { " (daily)" } else { "" };
        let root_label = format!(
            "{} {} - {}{daily}",
            format_priority(self.task.priority),
            self.task.id,
            truncate(&self.task.name, 40)
        );

        let mut root = TreeNode::new(root_label);
        for sub_task in self.sub_tasks {
            let label = format!("{} - {}", sub_task.id, truncate(&sub_task.name, 35));
            root = root.child(TreeNode::new(label));
        }

        Tree::new(root)
    }
}

/// Non-zero collection counts as "3 wallets" style labels.
#[must_use]
pub fn count_labels(counts: &SnapshotCounts) -> Vec<String> {
    [
        (counts.wallets, "wallets"),
        (counts.projects, "projects"),
        (counts.tasks, "tasks"),
        (counts.sub_tasks, "subtasks"),
        (counts.notes, "notes"),
        (counts.tags, "tags"),
    ]
    .into_iter()
    .filter(|(count, _)| *count > 0)
    .map(|(count, label)| format!("{count} {label}"))
    .collect()
}

/// Per-collection count badges.
#[must_use]
pub fn format_count_badges(counts: &SnapshotCounts, theme: &Theme) -> Text {
    let labels = count_labels(counts);
    let mut text = Text::new("");
    if labels.is_empty() {
        text.append_styled("nothing", theme.muted.clone());
        return text;
    }
    for (i, label) in labels.iter().enumerate() {
        if i > 0 {
            text.append(" ");
        }
        text.append_styled(label, theme.success.clone());
    }
    text
}

/// Progress of a daily routine across wallets.
#[must_use]
pub fn build_completion_bar(completed: usize, total: usize) -> ProgressBar {
    let progress = if total > 0 {
        completed as f64 / total as f64
    } else {
        0.0
    };

    let mut bar = ProgressBar::new().width(20).bar_style(BarStyle::Block);
    bar.set_progress(progress);
    bar
}
