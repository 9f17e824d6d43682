//! Centralized theme module for TUI color constants and styles

use ratatui::prelude::*;

pub const TITLE_COLOR: Color = Color::Cyan;
pub const MUTED: Color = Color::Gray;
pub const SECTION_COLOR: Color = Color::DarkGray;

pub const OPTION_CURSOR: Style = Style::new()
    .fg(Color::Cyan)
    .add_modifier(Modifier::BOLD);
pub const OPTION_SELECTED: Style = Style::new().fg(Color::Magenta);
pub const HINT_COLOR: Color = Color::Red;

pub const STATUS_BAR_BG: Color = Color::Indexed(236);
pub const STATUS_KEY_COLOR: Color = Color::Cyan;
pub const FLASH_SUCCESS: Color = Color::Green;
pub const FLASH_ERROR: Color = Color::Red;

pub const POPUP_BORDER: Color = Color::Cyan;
pub const POPUP_BG: Color = Color::Indexed(234);

pub const PILL_STYLE: Style = Style::new()
    .fg(Color::Black)
    .bg(Color::Cyan)
    .add_modifier(Modifier::BOLD);
pub const CHART_BAR_COLOR: Color = Color::Magenta;

/// Traffic-light color for a 0-100 self-discipline score.
pub fn score_color(percent: f64) -> Color {
    if percent >= 70.0 {
        Color::Green
    } else if percent >= 40.0 {
        Color::Yellow
    } else {
        Color::Red
    }
}

pub const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
