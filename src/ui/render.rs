//! Frame layout and per-view drawing

use crate::records::{local_day_time, TestType};
use crate::session::PlayerState;
use crate::tests::{ActivePhase, PassivePhase, RegularityPhase, TimingTest, TAP_COUNT};
use crate::ui::app::{App, AppView};
use crate::ui::browser::BrowserMode;
use crate::ui::sessions::SessionsMode;
use crate::ui::theme::ThemeColors;
use crate::ui::widgets::{HelpPanel, ListPanel, ResultsPanel, StatusBar, TabBar};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    symbols::border,
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

/// Draw the whole UI
pub fn draw(frame: &mut Frame, app: &App) {
    let colors = ThemeColors::from_theme(app.config.ui.theme);
    let size = frame.area();

    frame.render_widget(
        Block::default().style(Style::default().bg(colors.bg).fg(colors.fg)),
        size,
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Tab bar
            Constraint::Min(10),   // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(size);

    let tab_names: Vec<&str> = AppView::all().iter().map(|v| v.name()).collect();
    frame.render_widget(TabBar::new(&tab_names, app.view.index(), colors), chunks[0]);

    match app.view {
        AppView::Home => draw_home(frame, app, chunks[1], colors),
        AppView::Active | AppView::Passive | AppView::Regularity => {
            draw_test(frame, app, chunks[1], colors)
        }
        AppView::Results => draw_results(frame, app, chunks[1], colors),
        AppView::Sessions => draw_sessions(frame, app, chunks[1], colors),
        AppView::Help => frame.render_widget(HelpPanel::new(colors), chunks[1]),
    }

    let (_, clock) = local_day_time(app.now_ms());
    let hold = format!("hold: {}", app.hold_mode.describe());
    let status = StatusBar::new(app.view.name(), &clock, &hold, colors).message(app.get_status());
    frame.render_widget(status, chunks[2]);
}

fn draw_home(frame: &mut Frame, app: &App, area: Rect, colors: ThemeColors) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(5)])
        .split(area);

    let intro = Paragraph::new(vec![
        Line::from(Span::styled(
            "Timing TestKit",
            Style::default().fg(colors.cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from("Measure how you perceive and reproduce time intervals."),
        Line::from(Span::styled(
            "Tab or 1-7 to choose a view, ? for help",
            Style::default().fg(colors.dim),
        )),
    ]);
    frame.render_widget(intro, chunks[0]);

    let results = app.current_results();
    frame.render_widget(ResultsPanel::new(&results, "Overview", colors), chunks[1]);
}

fn stage_block(title: String, colors: ThemeColors) -> Block<'static> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_set(border::ROUNDED)
        .border_style(Style::default().fg(colors.dim))
}

fn big_text(text: String, style: Style) -> Paragraph<'static> {
    Paragraph::new(vec![Line::from(""), Line::from(Span::styled(text, style))])
        .alignment(Alignment::Center)
}

fn draw_test(frame: &mut Frame, app: &App, area: Rect, colors: ThemeColors) {
    let Some(test_type) = app.view.test_type() else {
        return;
    };
    let machine = app.machine(test_type);

    let mut constraints = vec![Constraint::Length(7), Constraint::Min(5)];
    if app.playback.is_some() {
        constraints.insert(0, Constraint::Length(1));
    }
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);
    let (stage, rows) = if let Some(playback) = &app.playback {
        let (done, total) = playback.player.progress();
        let banner = format!(
            " Session '{}' - block {} of {}  (Esc aborts)",
            playback.player.session().name,
            (done + 1).min(total),
            total
        );
        frame.render_widget(
            Paragraph::new(banner).style(Style::default().fg(colors.yellow)),
            chunks[0],
        );
        (chunks[1], chunks[2])
    } else {
        (chunks[0], chunks[1])
    };

    let block = stage_block(format!(" {} ", machine.description()), colors);
    let inner = block.inner(stage);
    frame.render_widget(block, stage);

    let now = app.now_ms();
    if app.countdown.is_active() {
        let text = format!("Get ready... {}", app.countdown.remaining(now));
        frame.render_widget(
            big_text(text, Style::default().fg(colors.yellow).add_modifier(Modifier::BOLD)),
            inner,
        );
    } else {
        match test_type {
            TestType::Active => draw_active_stage(frame, app, inner, colors),
            TestType::Passive => draw_passive_stage(frame, app, inner, colors),
            TestType::Regularity => draw_regularity_stage(frame, app, inner, colors),
        }
    }

    let results = machine.get_results();
    frame.render_widget(ResultsPanel::new(&results, machine.name(), colors), rows);
}

fn stimulus_text(glyph: &str) -> String {
    format!("{}   {}   {}", glyph, glyph, glyph)
}

fn draw_active_stage(frame: &mut Frame, app: &App, area: Rect, colors: ThemeColors) {
    let test = &app.active_test;
    let accent = Style::default().fg(colors.cyan).add_modifier(Modifier::BOLD);
    let paragraph = match test.phase() {
        ActivePhase::Exposure => match test.trial() {
            Some(trial) if test.exposure_pending() => {
                big_text(stimulus_text(trial.stimulus), accent)
            }
            _ => big_text(
                "Press Enter to start".to_string(),
                Style::default().fg(colors.dim),
            ),
        },
        ActivePhase::Reproduction if test.is_holding() => big_text(
            "Holding...".to_string(),
            Style::default().fg(colors.green).add_modifier(Modifier::BOLD),
        ),
        ActivePhase::Reproduction => big_text("Hold the key now".to_string(), accent),
        ActivePhase::Result => big_text(
            "Done - Enter for another trial".to_string(),
            Style::default().fg(colors.dim),
        ),
    };
    frame.render_widget(paragraph, area);
}

fn draw_passive_stage(frame: &mut Frame, app: &App, area: Rect, colors: ThemeColors) {
    let test = &app.passive_test;
    let accent = Style::default().fg(colors.cyan).add_modifier(Modifier::BOLD);
    match test.phase() {
        PassivePhase::Exposure => {
            let paragraph = match test.trial() {
                Some(trial) if test.exposure_pending() => {
                    big_text(stimulus_text(trial.stimulus), accent)
                }
                _ => big_text(
                    "Press Enter to start".to_string(),
                    Style::default().fg(colors.dim),
                ),
            };
            frame.render_widget(paragraph, area);
        }
        PassivePhase::Input => {
            let estimate = test.estimate();
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(2), Constraint::Length(1)])
                .margin(1)
                .split(area);
            let prompt = Paragraph::new(format!(
                "Your estimate: {} {}",
                estimate.text(),
                estimate.unit().suffix()
            ))
            .style(accent)
            .alignment(Alignment::Center);
            frame.render_widget(prompt, chunks[0]);
            let gauge = Gauge::default()
                .gauge_style(Style::default().fg(colors.gauge).bg(colors.bar))
                .ratio(estimate.fraction())
                .label("");
            frame.render_widget(gauge, chunks[1]);
        }
        PassivePhase::Result => frame.render_widget(
            big_text(
                "Done - Enter for another trial".to_string(),
                Style::default().fg(colors.dim),
            ),
            area,
        ),
    }
}

fn draw_regularity_stage(frame: &mut Frame, app: &App, area: Rect, colors: ThemeColors) {
    let test = &app.regularity_test;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Length(1)])
        .margin(1)
        .split(area);

    let prompt = match test.phase() {
        RegularityPhase::Idle if test.is_started() => "Tap the key once per second",
        RegularityPhase::Idle => "Press Enter to start",
        RegularityPhase::Tapping => "Keep tapping...",
        RegularityPhase::Result => "Done - Enter to try again",
    };
    frame.render_widget(
        Paragraph::new(prompt)
            .style(Style::default().fg(colors.cyan))
            .alignment(Alignment::Center),
        chunks[0],
    );

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(colors.gauge).bg(colors.bar))
        .ratio(test.progress().clamp(0.0, 1.0))
        .label(format!("{}/{}", test.tap_count(), TAP_COUNT));
    frame.render_widget(gauge, chunks[1]);
}

fn draw_results(frame: &mut Frame, app: &App, area: Rect, colors: ThemeColors) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(2)])
        .split(area);

    let browser = &app.browser;
    let items: Vec<String> = browser
        .rows
        .iter()
        .map(|row| {
            let (day, time) = local_day_time(row.recorded_at_ms);
            let session = if row.session_id.is_some() { " [session]" } else { "" };
            let notes = if row.notes.is_empty() {
                String::new()
            } else {
                format!("  \"{}\"", row.notes)
            };
            format!("{} {}  {}{}{}", day, time, row.summary, session, notes)
        })
        .collect();
    let title = format!(" < {} > ({}) ", browser.test_type.name(), items.len());
    let selected = (!items.is_empty()).then_some(browser.selected);
    frame.render_widget(
        ListPanel::new(&title, &items, colors)
            .selected(selected)
            .empty_text("No results yet"),
        chunks[0],
    );

    let footer = match &browser.mode {
        BrowserMode::Browse => Line::from(Span::styled(
            "Left/Right type  Up/Down select  n notes  d delete  e CSV  w workbook  c clear",
            Style::default().fg(colors.dim),
        )),
        BrowserMode::EditingNotes(buffer) => Line::from(vec![
            Span::styled("Notes: ", Style::default().fg(colors.cyan)),
            Span::styled(format!("{}_", buffer), Style::default().fg(colors.fg)),
            Span::styled("  (Enter save, Esc cancel)", Style::default().fg(colors.dim)),
        ]),
        BrowserMode::ConfirmClear => Line::from(Span::styled(
            format!(
                "Delete ALL {} results? y to confirm, any other key cancels",
                browser.test_type.tag()
            ),
            Style::default().fg(colors.red).add_modifier(Modifier::BOLD),
        )),
    };
    frame.render_widget(Paragraph::new(footer), chunks[1]);
}

fn draw_sessions(frame: &mut Frame, app: &App, area: Rect, colors: ThemeColors) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(2)])
        .split(area);
    let hint_style = Style::default().fg(colors.dim);

    if let Some(summary) = &app.session_summary {
        let title = format!(" Session '{}' complete ", summary.name);
        frame.render_widget(
            ListPanel::new(&title, &summary.lines, colors).empty_text("No results were recorded"),
            chunks[0],
        );
        frame.render_widget(Paragraph::new("Enter to close").style(hint_style), chunks[1]);
        return;
    }

    if let Some(playback) = &app.playback {
        let items: Vec<String> = playback
            .player
            .session()
            .blocks
            .iter()
            .enumerate()
            .map(|(i, b)| format!("{}. {}", i + 1, b.test_type.name()))
            .collect();
        let title = format!(" {} ", playback.player.session().name);
        frame.render_widget(ListPanel::new(&title, &items, colors), chunks[0]);
        let hint = match playback.player.state() {
            PlayerState::Ready => "Enter to begin, Esc to cancel",
            _ => "Session in progress",
        };
        frame.render_widget(Paragraph::new(hint).style(hint_style), chunks[1]);
        return;
    }

    match &app.sessions.mode {
        SessionsMode::Building(builder) => {
            let items: Vec<String> = builder
                .session
                .blocks
                .iter()
                .enumerate()
                .map(|(i, b)| format!("{}. {}", i + 1, b.test_type.name()))
                .collect();
            let name = if builder.editing_name {
                format!("{}_", builder.session.name)
            } else {
                builder.session.name.clone()
            };
            let title = format!(" Session: {} ", name);
            let selected = (!items.is_empty()).then_some(builder.selected);
            frame.render_widget(
                ListPanel::new(&title, &items, colors)
                    .selected(selected)
                    .empty_text("Add blocks: a active, p passive, r regularity"),
                chunks[0],
            );
            let hint = if builder.editing_name {
                "Type a name, Enter when done, Esc cancels"
            } else {
                "a/p/r add  x remove  u/d move  N rename  s save  Esc cancel"
            };
            frame.render_widget(Paragraph::new(hint).style(hint_style), chunks[1]);
        }
        mode => {
            let items: Vec<String> = app
                .sessions
                .sessions
                .iter()
                .map(|s| {
                    let (day, _) = local_day_time(s.created_at);
                    format!("{}  ({} blocks, {})", s.name, s.blocks.len(), day)
                })
                .collect();
            let selected = (!items.is_empty()).then_some(app.sessions.selected);
            frame.render_widget(
                ListPanel::new(" Saved sessions ", &items, colors)
                    .selected(selected)
                    .empty_text("No sessions yet, press n to create one"),
                chunks[0],
            );
            let footer = if matches!(mode, SessionsMode::ConfirmDelete) {
                Paragraph::new(
                    "Delete session: k keep its results, y delete its results too, any other key cancels",
                )
                .style(Style::default().fg(colors.red).add_modifier(Modifier::BOLD))
            } else {
                Paragraph::new("Enter play  n new  e edit  d delete").style(hint_style)
            };
            frame.render_widget(footer, chunks[1]);
        }
    }
}
