//! Output context and mode detection.
//!
//! # Mode Selection Logic
//!
//! 1. `--json` flag → JSON mode (machine-readable)
//! 2. `--quiet` flag → Quiet mode (minimal output)
//! 3. `--no-color` flag, `NO_COLOR`, or not a TTY → Plain mode
//! 4. TTY with colors → Rich mode
//!
//! ```ignore
//! let ctx = OutputContext::from_flags(json, quiet, no_color);
//! if ctx.is_json() {
//!     return ctx.json(&wallets);
//! }
//! ```

use std::io::IsTerminal;

use serde::Serialize;

use super::text::terminal_width;
use super::theme::Theme;
use crate::error::Result;

/// Output mode determining formatting strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Colors, tables and panels.
    #[default]
    Rich,

    /// Plain text without ANSI escape codes.
    Plain,

    /// JSON for machine consumption.
    Json,

    /// Nothing but errors.
    Quiet,
}

impl OutputMode {
    #[must_use]
    pub const fn supports_color(&self) -> bool {
        matches!(self, Self::Rich)
    }

    #[must_use]
    pub const fn is_structured(&self) -> bool {
        matches!(self, Self::Json)
    }

    #[must_use]
    pub const fn is_quiet(&self) -> bool {
        matches!(self, Self::Quiet)
    }

    #[must_use]
    pub const fn is_human_readable(&self) -> bool {
        matches!(self, Self::Rich | Self::Plain)
    }
}

/// Output context providing mode detection and terminal info.
#[derive(Debug, Clone)]
pub struct OutputContext {
    mode: OutputMode,
    width: usize,
    is_tty: bool,
}

impl Default for OutputContext {
    fn default() -> Self {
        Self::from_flags(false, false, false)
    }
}

impl OutputContext {
    #[must_use]
    pub const fn new(mode: OutputMode, width: usize, is_tty: bool) -> Self {
        Self {
            mode,
            width,
            is_tty,
        }
    }

    /// Create context from CLI flags.
    #[must_use]
    pub fn from_flags(json: bool, quiet: bool, no_color: bool) -> Self {
        let is_tty = std::io::stdout().is_terminal();
        let no_color = no_color || std::env::var_os("NO_COLOR").is_some();

        let mode = if json {
            OutputMode::Json
        } else if quiet {
            OutputMode::Quiet
        } else if no_color || !is_tty {
            OutputMode::Plain
        } else {
            OutputMode::Rich
        };

        Self {
            mode,
            width: terminal_width(),
            is_tty,
        }
    }

    #[must_use]
    pub const fn mode(&self) -> OutputMode {
        self.mode
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub const fn is_tty(&self) -> bool {
        self.is_tty
    }

    #[must_use]
    pub const fn is_json(&self) -> bool {
        self.mode.is_structured()
    }

    #[must_use]
    pub const fn is_quiet(&self) -> bool {
        self.mode.is_quiet()
    }

    #[must_use]
    pub const fn is_rich(&self) -> bool {
        self.mode.supports_color()
    }

    /// Theme matching the mode: colored for Rich, monochrome otherwise.
    #[must_use]
    pub fn theme(&self) -> Theme {
        if self.is_rich() {
            Theme::new()
        } else {
            Theme::minimal()
        }
    }

    /// Print `value` as pretty JSON on stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` cannot be serialized.
    pub fn json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    /// Print a plain line unless quiet.
    pub fn line(&self, text: &str) {
        if self.mode.is_human_readable() {
            println!("{text}");
        }
    }

    #[must_use]
    pub const fn with_mode_override(mut self, mode: OutputMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub const fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }
}
