//! Output formatting for `dropdesk`.
//!
//! Human output comes in two flavors: rich tables and panels on a color
//! terminal, and plain lines otherwise. `--json` prints the records
//! themselves, serialized exactly as they are stored.

pub mod context;
pub mod rich;
pub mod text;
pub mod theme;

pub use context::{OutputContext, OutputMode};
pub use text::{
    format_note_line, format_priority, format_project_line, format_sub_task_line,
    format_tag_line, format_task_line, format_usd, format_wallet_line, short_address,
    terminal_width, truncate,
};
pub use theme::Theme;
