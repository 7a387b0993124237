//! Theme color definitions for the UI
//!
//! Provides dark and light color palettes selected by the `[ui] theme` setting.

use crate::config::Theme;
use ratatui::style::Color;

/// Complete color palette for the UI
#[derive(Debug, Clone, Copy)]
pub struct ThemeColors {
    /// Main background
    pub bg: Color,
    /// Primary foreground text
    pub fg: Color,
    /// Dimmed/secondary text
    pub dim: Color,
    /// Accent color (headings, active tab)
    pub cyan: Color,
    /// Success / OK status
    pub green: Color,
    /// Warning status
    pub yellow: Color,
    /// Error status
    pub red: Color,
    /// Selected list row background
    pub selected_bg: Color,
    /// Selected list row text
    pub selected_fg: Color,
    /// Filled part of progress gauges
    pub gauge: Color,
    /// Bar backgrounds (tabs, status)
    pub bar: Color,
}

impl ThemeColors {
    /// Create a color palette for the given theme variant
    pub fn from_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self::dark(),
            Theme::Light => Self::light(),
        }
    }

    pub fn dark() -> Self {
        Self {
            bg: Color::Rgb(22, 22, 30),
            fg: Color::Rgb(200, 200, 210),
            dim: Color::Rgb(90, 90, 110),
            cyan: Color::Rgb(80, 200, 220),
            green: Color::Rgb(80, 200, 120),
            yellow: Color::Rgb(240, 180, 80),
            red: Color::Rgb(240, 90, 100),
            selected_bg: Color::Rgb(55, 55, 70),
            selected_fg: Color::Rgb(240, 240, 245),
            gauge: Color::Rgb(80, 200, 120),
            bar: Color::Rgb(40, 40, 50),
        }
    }

    /// High contrast for bright terminals
    pub fn light() -> Self {
        Self {
            bg: Color::Rgb(245, 245, 248),
            fg: Color::Rgb(30, 30, 40),
            dim: Color::Rgb(130, 130, 150),
            cyan: Color::Rgb(0, 130, 160),
            green: Color::Rgb(30, 150, 70),
            yellow: Color::Rgb(180, 120, 0),
            red: Color::Rgb(200, 50, 60),
            selected_bg: Color::Rgb(200, 200, 212),
            selected_fg: Color::Rgb(20, 20, 25),
            gauge: Color::Rgb(30, 150, 70),
            bar: Color::Rgb(220, 220, 228),
        }
    }
}
