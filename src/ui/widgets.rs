//! Custom TUI widgets

use crate::tests::{ResultStatus, TestResult};
use crate::ui::theme::ThemeColors;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

/// Widget for displaying test results
pub struct ResultsPanel<'a> {
    results: &'a [TestResult],
    title: &'a str,
    colors: ThemeColors,
}

impl<'a> ResultsPanel<'a> {
    pub fn new(results: &'a [TestResult], title: &'a str, colors: ThemeColors) -> Self {
        Self {
            results,
            title,
            colors,
        }
    }

    fn status_color(&self, status: ResultStatus) -> Color {
        match status {
            ResultStatus::Ok => self.colors.green,
            ResultStatus::Warning => self.colors.yellow,
            ResultStatus::Error => self.colors.red,
            ResultStatus::Info => self.colors.cyan,
        }
    }

    fn status_symbol(status: ResultStatus) -> &'static str {
        match status {
            ResultStatus::Ok => "[OK]",
            ResultStatus::Warning => "[!!]",
            ResultStatus::Error => "[XX]",
            ResultStatus::Info => "[--]",
        }
    }
}

impl<'a> Widget for ResultsPanel<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(self.title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.colors.dim));

        let inner = block.inner(area);
        block.render(area, buf);

        let mut y = inner.y;
        for result in self.results {
            if y >= inner.y + inner.height {
                break;
            }

            let color = self.status_color(result.status);
            let symbol = Self::status_symbol(result.status);

            let line = Line::from(vec![
                Span::styled(format!("{} ", symbol), Style::default().fg(color)),
                Span::styled(
                    format!("{}: ", result.label),
                    Style::default()
                        .fg(self.colors.fg)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(&result.value, Style::default().fg(color)),
            ]);

            buf.set_line(inner.x, y, &line, inner.width);
            y += 1;
        }
    }
}

/// Bordered list with one highlighted row
pub struct ListPanel<'a> {
    title: &'a str,
    items: &'a [String],
    selected: Option<usize>,
    empty_text: &'a str,
    colors: ThemeColors,
}

impl<'a> ListPanel<'a> {
    pub fn new(title: &'a str, items: &'a [String], colors: ThemeColors) -> Self {
        Self {
            title,
            items,
            selected: None,
            empty_text: "(empty)",
            colors,
        }
    }

    pub fn selected(mut self, selected: Option<usize>) -> Self {
        self.selected = selected;
        self
    }

    pub fn empty_text(mut self, text: &'a str) -> Self {
        self.empty_text = text;
        self
    }
}

impl<'a> Widget for ListPanel<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(self.title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.colors.dim));

        let inner = block.inner(area);
        block.render(area, buf);

        if self.items.is_empty() {
            buf.set_string(
                inner.x,
                inner.y,
                self.empty_text,
                Style::default().fg(self.colors.dim),
            );
            return;
        }

        // Keep the selected row on screen
        let height = inner.height as usize;
        let offset = match self.selected {
            Some(sel) if height > 0 && sel >= height => sel + 1 - height,
            _ => 0,
        };

        for (row, (i, item)) in self.items.iter().enumerate().skip(offset).enumerate() {
            if row >= height {
                break;
            }
            let y = inner.y + row as u16;
            let style = if Some(i) == self.selected {
                Style::default()
                    .fg(self.colors.selected_fg)
                    .bg(self.colors.selected_bg)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(self.colors.fg)
            };
            let marker = if Some(i) == self.selected { "> " } else { "  " };
            buf.set_stringn(
                inner.x,
                y,
                format!("{}{}", marker, item),
                inner.width as usize,
                style,
            );
        }
    }
}

/// Widget for the help screen
pub struct HelpPanel {
    colors: ThemeColors,
}

impl HelpPanel {
    pub fn new(colors: ThemeColors) -> Self {
        Self { colors }
    }
}

impl Widget for HelpPanel {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title("Help - Timing TestKit")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.colors.cyan));

        let inner = block.inner(area);
        block.render(area, buf);

        let help_text = vec![
            "",
            " NAVIGATION",
            " -----------",
            " Tab / Shift+Tab  : Switch between views",
            " 1-7              : Jump to specific view",
            " q / Esc          : Quit (Esc aborts a running session first)",
            "",
            " TESTS",
            " -----------",
            " Enter / r        : Start, or try again after a result",
            " Active           : Watch the symbol, then hold the hold key as long",
            " Passive          : Watch the symbol, then type or slide your estimate",
            "                    (Up/Down adjust, Enter submits)",
            " Regularity       : Tap the hold key 25 times, one second apart",
            "",
            " RESULTS",
            " -----------",
            " Left/Right       : Change test type    Up/Down : Select",
            " n                : Edit notes          d       : Delete",
            " e                : Export CSV          w       : Export workbook",
            " c                : Clear all (asks to confirm)",
            "",
            " SESSIONS",
            " -----------",
            " n / e            : New / edit session  Enter   : Play",
            " a / p / r        : Add block           x       : Remove block",
            " u / d            : Move block          s       : Save",
            " d (list)         : Delete, keeping or removing its results",
        ];

        for (i, line) in help_text.iter().enumerate() {
            if i as u16 >= inner.height {
                break;
            }
            let style = if line.starts_with(' ') && line.contains("---") {
                Style::default().fg(self.colors.dim)
            } else if line.starts_with(' ')
                && line.chars().nth(1).is_some_and(|c| c.is_uppercase())
                && line.trim().chars().all(|c| c.is_uppercase() || c == ' ')
            {
                Style::default()
                    .fg(self.colors.yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(self.colors.fg)
            };
            buf.set_string(inner.x, inner.y + i as u16, line, style);
        }
    }
}

/// Status bar widget
pub struct StatusBar<'a> {
    view: &'a str,
    clock: &'a str,
    hold: &'a str,
    message: Option<&'a str>,
    colors: ThemeColors,
}

impl<'a> StatusBar<'a> {
    pub fn new(view: &'a str, clock: &'a str, hold: &'a str, colors: ThemeColors) -> Self {
        Self {
            view,
            clock,
            hold,
            message: None,
            colors,
        }
    }

    pub fn message(mut self, message: Option<&'a str>) -> Self {
        self.message = message;
        self
    }
}

impl<'a> Widget for StatusBar<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Background
        let bg_style = Style::default().bg(self.colors.bar).fg(self.colors.fg);
        for x in area.x..area.x + area.width {
            buf.set_string(x, area.y, " ", bg_style);
        }

        // Left side: view
        let left = format!(" {} ", self.view);
        buf.set_string(area.x, area.y, &left, bg_style.add_modifier(Modifier::BOLD));

        // Center: message if any
        if let Some(msg) = self.message {
            let msg_style = Style::default().bg(self.colors.bar).fg(self.colors.yellow);
            let msg_x = area.x + (area.width / 2).saturating_sub(msg.len() as u16 / 2);
            buf.set_string(msg_x, area.y, msg, msg_style);
        }

        // Right side: hold mode and time
        let right = format!(" {} | {} ", self.hold, self.clock);
        let right_x = area.x + area.width.saturating_sub(right.len() as u16);
        buf.set_string(right_x, area.y, &right, bg_style);
    }
}

/// Tab bar widget
pub struct TabBar<'a> {
    tabs: &'a [&'a str],
    selected: usize,
    colors: ThemeColors,
}

impl<'a> TabBar<'a> {
    pub fn new(tabs: &'a [&'a str], selected: usize, colors: ThemeColors) -> Self {
        Self {
            tabs,
            selected,
            colors,
        }
    }
}

impl<'a> Widget for TabBar<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut x = area.x;

        for (i, tab) in self.tabs.iter().enumerate() {
            let is_selected = i == self.selected;

            let style = if is_selected {
                Style::default()
                    .fg(self.colors.bg)
                    .bg(self.colors.cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(self.colors.fg).bg(self.colors.bar)
            };

            let label = format!(" {} {} ", i + 1, tab);
            let width = label.len() as u16;

            if x + width <= area.x + area.width {
                buf.set_string(x, area.y, &label, style);
                x += width;

                // Separator
                if i < self.tabs.len() - 1 && x < area.x + area.width {
                    buf.set_string(x, area.y, "|", Style::default().fg(self.colors.dim));
                    x += 1;
                }
            }
        }

        // Fill rest with background
        for fill_x in x..area.x + area.width {
            buf.set_string(fill_x, area.y, " ", Style::default().bg(self.colors.bar));
        }
    }
}
