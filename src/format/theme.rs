//! Theme and color definitions for rich output.
//!
//! - Priority: red+bold (P1) → red → yellow → default → gray (P5)
//! - Wallet type: cyan (EVM), magenta (StarkNet), blue otherwise
//! - Tags: their stored color, or one derived from the name
//!
//! [`Theme`] wraps these in rich_rust [`Style`] objects.

use crate::util::color_for_name;
use rich_rust::{Color, Style};

/// Style with a foreground color, or plain if `name` does not parse.
fn colored(name: &str) -> Style {
    Color::parse(name).map_or_else(|_| Style::new(), |color| Style::new().color(color))
}

/// Theme providing consistent styling across rich output components.
#[derive(Debug, Clone)]
pub struct Theme {
    pub priority_urgent: Style,
    pub priority_high: Style,
    pub priority_medium: Style,
    pub priority_normal: Style,
    pub priority_low: Style,

    pub wallet_evm: Style,
    pub wallet_starknet: Style,
    pub wallet_other: Style,

    pub header: Style,
    pub border: Style,
    pub muted: Style,
    pub emphasis: Style,
    pub success: Style,
    pub warning: Style,
    pub error: Style,

    pub id: Style,
    pub address: Style,
    pub amount: Style,
    pub daily: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self::new()
    }
}

impl Theme {
    #[must_use]
    pub fn new() -> Self {
        Self {
            priority_urgent: colored("red").bold(),
            priority_high: colored("red"),
            priority_medium: colored("yellow"),
            priority_normal: Style::new(),
            priority_low: colored("bright_black"),

            wallet_evm: colored("cyan"),
            wallet_starknet: colored("magenta"),
            wallet_other: colored("blue"),

            header: Style::new().bold(),
            border: colored("bright_black"),
            muted: colored("bright_black"),
            emphasis: Style::new().bold(),
            success: colored("green"),
            warning: colored("yellow"),
            error: colored("red").bold(),

            id: colored("cyan"),
            address: colored("bright_blue"),
            amount: colored("green").bold(),
            daily: colored("magenta"),
        }
    }

    /// Style for a task or note priority (1 most urgent).
    #[must_use]
    pub fn priority_style(&self, priority: u8) -> &Style {
        match priority {
            1 => &self.priority_urgent,
            2 => &self.priority_high,
            3 => &self.priority_medium,
            4 => &self.priority_normal,
            _ => &self.priority_low,
        }
    }

    #[must_use]
    pub fn wallet_type_style(&self, wallet_type: &str) -> &Style {
        match wallet_type {
            "EVM" => &self.wallet_evm,
            "StarkNet" => &self.wallet_starknet,
            _ => &self.wallet_other,
        }
    }

    /// Style for a tag, honoring a stored color when it parses.
    #[must_use]
    pub fn tag_style(name: &str, stored_color: Option<&str>) -> Style {
        let color_name = stored_color
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| color_for_name(name));
        match Color::parse(color_name) {
            Ok(color) => Style::new().color(color),
            Err(_) => colored(color_for_name(name)),
        }
    }

    /// Monochrome theme: bold and dim only.
    #[must_use]
    pub fn minimal() -> Self {
        let dim = Style::new().dim();
        let bold = Style::new().bold();
        let normal = Style::new();

        Self {
            priority_urgent: bold.clone(),
            priority_high: bold.clone(),
            priority_medium: normal.clone(),
            priority_normal: normal.clone(),
            priority_low: dim.clone(),

            wallet_evm: normal.clone(),
            wallet_starknet: normal.clone(),
            wallet_other: normal.clone(),

            header: bold.clone(),
            border: dim.clone(),
            muted: dim.clone(),
            emphasis: bold.clone(),
            success: normal.clone(),
            warning: normal.clone(),
            error: bold,

            id: normal.clone(),
            address: normal.clone(),
            amount: normal,
            daily: dim,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_styles_cover_range() {
        let theme = Theme::new();
        for priority in 0..=6 {
            let _ = theme.priority_style(priority);
        }
    }

    #[test]
    fn unknown_tag_color_falls_back_to_palette() {
        let _ = Theme::tag_style("DeFi", Some("not-a-color"));
        let _ = Theme::tag_style("DeFi", None);
        let _ = Theme::tag_style("DeFi", Some(""));
    }

    #[test]
    fn minimal_theme_builds() {
        let theme = Theme::minimal();
        let _ = theme.wallet_type_style("Solana");
    }
}
