//! Color palette shared by all widgets

use ratatui::style::Color;

/// Missing directories, errors
pub const ACCENT_PRIMARY: Color = Color::Rgb(231, 111, 81);
/// Valid directories, enabled panels
pub const ACCENT_SECONDARY: Color = Color::Rgb(42, 157, 143);
/// Titles, focus, selection
pub const ACCENT_HIGHLIGHT: Color = Color::Rgb(233, 196, 106);

pub const TEXT_PRIMARY: Color = Color::Rgb(230, 230, 230);
pub const TEXT_SECONDARY: Color = Color::Rgb(140, 140, 150);
/// Disabled optional panels
pub const TEXT_DISABLED: Color = Color::Rgb(90, 90, 100);

pub const BG_DARK: Color = Color::Rgb(22, 24, 32);
pub const BG_SELECTED: Color = Color::Rgb(52, 58, 78);
pub const BORDER_COLOR: Color = Color::Rgb(80, 86, 110);
