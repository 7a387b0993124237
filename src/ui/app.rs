//! Main application state and logic

use crate::config::Config;
use crate::export::{self, ExportError, Workbook};
use crate::input::{HoldMode, InputEvent, InputKind, ToggleHold};
use crate::records::{TestRecord, TestType};
use crate::session::{PlayerState, SessionPlayer};
use crate::store::ResultStore;
use crate::tests::{
    ActivePhase, ActiveTest, PassivePhase, PassiveTest, RegularityTest, TestResult, TimingTest,
};
use crate::timing::{Clock, Countdown};
use crate::ui::browser::{BrowserMode, ResultsBrowser};
use crate::ui::sessions::{Playback, SessionBuilder, SessionSummary, SessionsMode, SessionsView};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::path::PathBuf;

/// Maximum length of a note or session name
const MAX_TEXT_LEN: usize = 200;

/// Current view/tab in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppView {
    Home,
    Active,
    Passive,
    Regularity,
    Results,
    Sessions,
    Help,
}

impl AppView {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Active => "Active",
            Self::Passive => "Passive",
            Self::Regularity => "Regularity",
            Self::Results => "Results",
            Self::Sessions => "Sessions",
            Self::Help => "Help",
        }
    }

    pub fn all() -> &'static [AppView] {
        &[
            Self::Home,
            Self::Active,
            Self::Passive,
            Self::Regularity,
            Self::Results,
            Self::Sessions,
            Self::Help,
        ]
    }

    pub fn index(&self) -> usize {
        match self {
            Self::Home => 0,
            Self::Active => 1,
            Self::Passive => 2,
            Self::Regularity => 3,
            Self::Results => 4,
            Self::Sessions => 5,
            Self::Help => 6,
        }
    }

    pub fn from_index(index: usize) -> Self {
        match index {
            0 => Self::Home,
            1 => Self::Active,
            2 => Self::Passive,
            3 => Self::Regularity,
            4 => Self::Results,
            5 => Self::Sessions,
            _ => Self::Help,
        }
    }

    /// The test hosted by this view, if any
    pub fn test_type(&self) -> Option<TestType> {
        match self {
            Self::Active => Some(TestType::Active),
            Self::Passive => Some(TestType::Passive),
            Self::Regularity => Some(TestType::Regularity),
            _ => None,
        }
    }

    pub fn for_test(test_type: TestType) -> Self {
        match test_type {
            TestType::Active => Self::Active,
            TestType::Passive => Self::Passive,
            TestType::Regularity => Self::Regularity,
        }
    }
}

/// Application running state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Running,
    Quitting,
}

/// Main application
pub struct App {
    /// Current view
    pub view: AppView,
    /// Application state
    pub state: AppState,
    /// Configuration
    pub config: Config,
    /// How the active test's hold gesture is captured
    pub hold_mode: HoldMode,
    /// Persistent results and sessions
    pub store: ResultStore,
    clock: Box<dyn Clock>,
    pub active_test: ActiveTest,
    pub passive_test: PassiveTest,
    pub regularity_test: RegularityTest,
    /// "Get ready" overlay before a test starts
    pub countdown: Countdown,
    pending_start: Option<TestType>,
    toggle: ToggleHold,
    pub browser: ResultsBrowser,
    pub sessions: SessionsView,
    /// Session currently being played
    pub playback: Option<Playback>,
    /// Outcome of the last finished session
    pub session_summary: Option<SessionSummary>,
    /// Last status message
    status_message: Option<String>,
    /// Status message timestamp, epoch ms
    status_time: Option<u64>,
}

impl App {
    pub fn new(config: Config, store: ResultStore, clock: Box<dyn Clock>) -> Self {
        Self {
            view: AppView::Home,
            state: AppState::Running,
            hold_mode: HoldMode::Toggle,
            store,
            clock,
            active_test: ActiveTest::new(&config.trial),
            passive_test: PassiveTest::new(&config.trial, &config.passive),
            regularity_test: RegularityTest::new(),
            countdown: Countdown::new(config.countdown.seconds),
            pending_start: None,
            toggle: ToggleHold::default(),
            browser: ResultsBrowser::new(),
            sessions: SessionsView::new(),
            playback: None,
            session_summary: None,
            status_message: None,
            status_time: None,
            config,
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn machine(&self, test_type: TestType) -> &dyn TimingTest {
        match test_type {
            TestType::Active => &self.active_test,
            TestType::Passive => &self.passive_test,
            TestType::Regularity => &self.regularity_test,
        }
    }

    pub fn machine_mut(&mut self, test_type: TestType) -> &mut dyn TimingTest {
        match test_type {
            TestType::Active => &mut self.active_test,
            TestType::Passive => &mut self.passive_test,
            TestType::Regularity => &mut self.regularity_test,
        }
    }

    /// Switch views. Refused while a session is playing.
    pub fn switch_view(&mut self, view: AppView) -> bool {
        if view == self.view {
            return true;
        }
        if self.playback.as_ref().is_some_and(|p| p.is_playing()) {
            self.set_status("Session in progress (Esc to abort)");
            return false;
        }
        self.leave_view();
        self.view = view;
        self.enter_view();
        true
    }

    /// Switch to the next view
    pub fn next_view(&mut self) {
        let next = (self.view.index() + 1) % AppView::all().len();
        self.switch_view(AppView::from_index(next));
    }

    /// Switch to the previous view
    pub fn prev_view(&mut self) {
        let current = self.view.index();
        let prev = if current == 0 {
            AppView::all().len() - 1
        } else {
            current - 1
        };
        self.switch_view(AppView::from_index(prev));
    }

    fn leave_view(&mut self) {
        if let Some(test_type) = self.view.test_type() {
            self.countdown.cancel();
            self.pending_start = None;
            self.toggle.clear();
            self.machine_mut(test_type).leave();
        }
        match self.view {
            AppView::Results => {
                self.browser.unsubscribe(&mut self.store);
                self.browser.mode = BrowserMode::Browse;
            }
            AppView::Sessions => {
                self.sessions.mode = SessionsMode::List;
                self.session_summary = None;
                if self.playback.is_some() {
                    log::info!("Session playback dismissed before starting");
                    self.playback = None;
                }
            }
            _ => {}
        }
    }

    fn enter_view(&mut self) {
        match self.view {
            AppView::Results => {
                self.browser.subscribe(&mut self.store);
                self.refresh_results();
            }
            AppView::Sessions => self.refresh_sessions(),
            _ => {}
        }
    }

    /// Request quit
    pub fn quit(&mut self) {
        self.state = AppState::Quitting;
    }

    /// Set a status message
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_time = Some(self.now_ms());
    }

    /// Get status message if still within its display time
    pub fn get_status(&self) -> Option<&str> {
        let lifetime = self.config.status_duration().as_millis() as u64;
        match (&self.status_message, self.status_time) {
            (Some(msg), Some(time)) if self.now_ms().saturating_sub(time) < lifetime => Some(msg),
            _ => None,
        }
    }

    /// Start the current view's test, through the countdown when enabled
    pub fn begin_test(&mut self) {
        let Some(test_type) = self.view.test_type() else {
            return;
        };
        if self.countdown.is_active() {
            return;
        }
        let now = self.now_ms();
        self.toggle.clear();
        if self.config.countdown.enabled && self.config.countdown.seconds > 0 {
            self.machine_mut(test_type).reset();
            self.countdown.start(now);
            self.pending_start = Some(test_type);
        } else {
            self.machine_mut(test_type).start(now);
        }
    }

    /// Advance timers; call once per frame
    pub fn tick(&mut self) {
        let now = self.now_ms();
        if self.countdown.tick(now) {
            if let Some(test_type) = self.pending_start.take() {
                self.machine_mut(test_type).start(now);
            }
        }
        if let Some(test_type) = self.view.test_type() {
            if self.machine_mut(test_type).tick(now) {
                log::debug!("{} advanced on timer", test_type.name());
            }
        }
        if self.view == AppView::Results && self.browser.is_dirty() {
            self.refresh_results();
        }
    }

    /// Deliver an input event to the current view's test
    pub fn process_input(&mut self, event: InputEvent) {
        if self.state != AppState::Running {
            return;
        }
        let Some(test_type) = self.view.test_type() else {
            return;
        };
        if self.countdown.is_active() {
            log::debug!("Input dropped during countdown: {:?}", event.kind);
            return;
        }
        let machine = self.machine_mut(test_type);
        if !machine.is_started() {
            return;
        }
        if let Some(record) = machine.process_event(&event) {
            self.persist(record);
        }
    }

    fn persist(&mut self, record: TestRecord) {
        let saved = match record.clone() {
            TestRecord::Active(r) => self.store.save(r),
            TestRecord::Passive(r) => self.store.save(r),
            TestRecord::Regularity(r) => self.store.save(r),
        };
        match saved {
            Ok(()) => {
                if let Some(playback) = self.playback.as_mut() {
                    playback.note_record(&record);
                }
                self.set_status("Result saved");
            }
            Err(e) => {
                log::error!("Failed to save result: {}", e);
                match self.playback.as_mut() {
                    Some(playback) => {
                        playback.unsaved = Some(record);
                        self.set_status(format!(
                            "Failed to save result: {} (Enter retries, r redoes the block)",
                            e
                        ));
                    }
                    None => self.set_status(format!("Failed to save result: {}", e)),
                }
            }
        }
    }

    /// Hold key went down or up, from the terminal
    fn hold_key(&mut self, kind: KeyEventKind) {
        let now = self.now_ms();
        match self.view {
            AppView::Regularity if kind == KeyEventKind::Press => {
                self.process_input(InputEvent::new(InputKind::Tap, now));
            }
            AppView::Active => match (self.hold_mode, kind) {
                (HoldMode::Enhanced, KeyEventKind::Press) => {
                    self.process_input(InputEvent::new(InputKind::Press, now));
                }
                (HoldMode::Enhanced, KeyEventKind::Release) => {
                    self.process_input(InputEvent::new(InputKind::Release, now));
                }
                (HoldMode::Toggle, KeyEventKind::Press) => {
                    if self.active_test.phase() == ActivePhase::Reproduction
                        && !self.countdown.is_active()
                    {
                        let kind = self.toggle.on_press();
                        self.process_input(InputEvent::new(kind, now));
                    }
                }
                // DeviceQuery events arrive from the listener
                _ => {}
            },
            _ => {}
        }
    }

    fn is_hold_key(&self, key: &KeyEvent) -> bool {
        matches!(key.code, KeyCode::Char(c) if c.eq_ignore_ascii_case(&self.config.ui.hold_key))
    }

    /// Enter on a test view: start, restart, or continue the session
    fn confirm_test(&mut self) {
        let Some(test_type) = self.view.test_type() else {
            return;
        };
        if self.countdown.is_active() {
            return;
        }
        let machine = self.machine(test_type);
        let (started, complete) = (machine.is_started(), machine.is_complete());
        if self.playback.is_some() {
            if complete {
                self.advance_session();
            } else if !started {
                self.begin_test();
            }
        } else if !started || complete {
            self.begin_test();
        }
    }

    /// Run the current session block again after its result failed to save
    fn redo_block(&mut self) {
        let Some(test_type) = self.view.test_type() else {
            return;
        };
        if !self.machine(test_type).is_complete() {
            return;
        }
        let Some(playback) = self.playback.as_mut() else {
            return;
        };
        if playback.saved {
            return;
        }
        playback.begin_block();
        log::info!("Redoing unsaved {} block", test_type.name());
        self.begin_test();
    }

    // -- Results --------------------------------------------------------

    pub fn refresh_results(&mut self) {
        if let Err(e) = self.browser.refresh(&self.store) {
            log::error!("Failed to load results: {}", e);
            self.set_status(format!("Failed to load results: {}", e));
        }
    }

    pub fn delete_selected_result(&mut self) {
        match self.browser.delete_selected(&mut self.store) {
            Ok(true) => self.set_status("Result deleted"),
            Ok(false) => {}
            Err(e) => {
                log::error!("Failed to delete result: {}", e);
                self.set_status(format!("Failed to delete result: {}", e));
            }
        }
    }

    pub fn save_notes(&mut self) {
        match self.browser.commit_notes(&mut self.store) {
            Ok(()) => self.set_status("Notes saved"),
            Err(e) => {
                log::error!("Failed to save notes: {}", e);
                self.set_status(format!("Failed to save notes: {}", e));
            }
        }
    }

    pub fn clear_results(&mut self) {
        let test_type = self.browser.test_type;
        self.browser.mode = BrowserMode::Browse;
        match self.store.clear(test_type) {
            Ok(()) => self.set_status(format!("All {} results cleared", test_type.tag())),
            Err(e) => {
                log::error!("Failed to clear results: {}", e);
                self.set_status(format!("Failed to clear results: {}", e));
            }
        }
    }

    fn export_dir(&mut self) -> Option<PathBuf> {
        let dir = self.config.storage.resolved_export_dir();
        if dir.is_none() {
            self.set_status("No export directory available");
        }
        dir
    }

    fn report_export(&mut self, result: Result<PathBuf, ExportError>) -> Option<PathBuf> {
        match result {
            Ok(path) => {
                self.set_status(format!("Exported to {}", path.display()));
                Some(path)
            }
            Err(ExportError::NothingToExport) => {
                self.set_status("No results to export");
                None
            }
            Err(e) => {
                log::error!("Export failed: {}", e);
                self.set_status(format!("Export failed: {}", e));
                None
            }
        }
    }

    /// Export the browsed test type to CSV
    pub fn export_csv(&mut self) -> Option<PathBuf> {
        let dir = self.export_dir()?;
        let result = export::export_csv(&self.store, self.browser.test_type, &dir, self.now_ms());
        self.report_export(result)
    }

    /// Export every result and session as one `.xlsx` workbook
    pub fn export_workbook(&mut self) -> Option<PathBuf> {
        let dir = self.export_dir()?;
        let now = self.now_ms();
        let result = Workbook::from_store(&self.store).and_then(|wb| wb.write_xlsx(&dir, now));
        self.report_export(result)
    }

    // -- Sessions -------------------------------------------------------

    pub fn refresh_sessions(&mut self) {
        if let Err(e) = self.sessions.refresh(&self.store) {
            log::error!("Failed to load sessions: {}", e);
            self.set_status(format!("Failed to load sessions: {}", e));
        }
    }

    pub fn new_session(&mut self) {
        let now = self.now_ms();
        self.sessions.mode = SessionsMode::Building(SessionBuilder::new(now));
    }

    pub fn edit_selected_session(&mut self) {
        if let Some(session) = self.sessions.selected_session().cloned() {
            self.sessions.mode = SessionsMode::Building(SessionBuilder::edit(session));
        }
    }

    /// Validate and persist the session under construction
    pub fn save_session(&mut self) -> bool {
        let Some(builder) = self.sessions.builder_mut() else {
            return false;
        };
        let mut session = builder.session.clone();
        session.name = session.name.trim().to_string();
        if let Err(e) = session.validate() {
            self.set_status(e.to_string());
            return false;
        }
        match self.store.save_session(&session) {
            Ok(()) => {
                self.sessions.mode = SessionsMode::List;
                self.refresh_sessions();
                if let Some(index) = self.sessions.sessions.iter().position(|s| s.id == session.id)
                {
                    self.sessions.selected = index;
                }
                self.set_status(format!("Session '{}' saved", session.name));
                true
            }
            Err(e) => {
                log::error!("Failed to save session: {}", e);
                self.set_status(format!("Failed to save session: {}", e));
                false
            }
        }
    }

    pub fn delete_selected_session(&mut self, delete_results: bool) {
        self.sessions.mode = SessionsMode::List;
        let Some(id) = self.sessions.selected_session().map(|s| s.id.clone()) else {
            return;
        };
        match self.store.delete_session(&id, delete_results) {
            Ok(()) => {
                self.refresh_sessions();
                self.set_status(if delete_results {
                    "Session and its results deleted"
                } else {
                    "Session deleted, results kept"
                });
            }
            Err(e) => {
                log::error!("Failed to delete session: {}", e);
                self.set_status(format!("Failed to delete session: {}", e));
            }
        }
    }

    /// Load the selected session into the player, ready to start
    pub fn prepare_session(&mut self) {
        let Some(session) = self.sessions.selected_session().cloned() else {
            return;
        };
        match SessionPlayer::new(session) {
            Ok(player) => {
                self.session_summary = None;
                self.playback = Some(Playback::new(player));
            }
            Err(e) => self.set_status(e.to_string()),
        }
    }

    /// Start the prepared session with its first block
    pub fn start_session(&mut self) {
        let first = self
            .playback
            .as_mut()
            .and_then(|p| p.player.start())
            .map(|b| b.test_type);
        if let Some(test_type) = first {
            self.enter_block(test_type);
        }
    }

    fn enter_block(&mut self, test_type: TestType) {
        let session_id = self.playback.as_ref().map(|p| p.player.session_id().to_string());
        self.countdown.cancel();
        self.pending_start = None;
        self.toggle.clear();
        self.view = AppView::for_test(test_type);
        if let Some(playback) = self.playback.as_mut() {
            playback.begin_block();
        }
        let machine = self.machine_mut(test_type);
        machine.reset();
        machine.set_session(session_id);
        self.begin_test();
    }

    /// Move past a finished block
    pub fn advance_session(&mut self) {
        let Some(current) = self.playback.as_ref().and_then(|p| p.current_type()) else {
            return;
        };
        if !self.machine(current).is_complete() {
            return;
        }
        if !self.block_saved() {
            return;
        }
        let machine = self.machine_mut(current);
        machine.set_session(None);
        machine.leave();

        let Some(playback) = self.playback.as_mut() else {
            return;
        };
        match playback.player.complete_current() {
            PlayerState::Playing { .. } => {
                if let Some(next) = playback.current_type() {
                    self.enter_block(next);
                }
            }
            PlayerState::Completed => self.finish_session(),
            PlayerState::Ready => {}
        }
    }

    /// Whether the current block's result is stored, retrying a failed save once
    fn block_saved(&mut self) -> bool {
        let Some(playback) = self.playback.as_mut() else {
            return false;
        };
        if playback.saved {
            return true;
        }
        match playback.unsaved.take() {
            Some(record) => {
                log::info!("Retrying save of {} result", record.test_type().name());
                self.persist(record);
                self.playback.as_ref().is_some_and(|p| p.saved)
            }
            None => {
                self.set_status("Result not saved; press r to redo the block");
                false
            }
        }
    }

    fn finish_session(&mut self) {
        if let Some(playback) = self.playback.take() {
            self.session_summary = Some(SessionSummary {
                name: playback.player.session().name.clone(),
                lines: playback.completed,
            });
        }
        self.view = AppView::Sessions;
        self.refresh_sessions();
        self.set_status("Session complete");
    }

    /// Stop the running session; results saved so far are kept
    pub fn abort_session(&mut self) {
        let Some(playback) = self.playback.take() else {
            return;
        };
        if let Some(current) = playback.current_type() {
            self.countdown.cancel();
            self.pending_start = None;
            self.toggle.clear();
            let machine = self.machine_mut(current);
            machine.set_session(None);
            machine.leave();
            machine.reset();
        }
        log::info!("Session '{}' aborted", playback.player.session().name);
        self.view = AppView::Sessions;
        self.refresh_sessions();
        self.set_status("Session aborted");
    }

    // -- Display --------------------------------------------------------

    /// Get results for current view
    pub fn current_results(&self) -> Vec<TestResult> {
        match self.view {
            AppView::Home => self.home_results(),
            AppView::Active | AppView::Passive | AppView::Regularity => self
                .view
                .test_type()
                .map(|t| self.machine(t).get_results())
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    /// Dashboard rows: stored counts and input mode
    fn home_results(&self) -> Vec<TestResult> {
        let mut results = Vec::new();

        for &test_type in TestType::all() {
            match self.store.count(test_type) {
                Ok(count) => results.push(TestResult::info(
                    format!("{} results", test_type.name()),
                    count.to_string(),
                )),
                Err(e) => results.push(TestResult::error(test_type.name(), e.to_string())),
            }
        }

        match self.store.sessions() {
            Ok(sessions) => {
                results.push(TestResult::info("Saved sessions", sessions.len().to_string()))
            }
            Err(e) => results.push(TestResult::error("Sessions", e.to_string())),
        }

        let hold_key = match self.config.ui.hold_key {
            ' ' => "Space".to_string(),
            c => c.to_string(),
        };
        results.push(TestResult::info("Hold key", hold_key));
        let mode = TestResult::info("Hold input", self.hold_mode.describe());
        results.push(if self.hold_mode == HoldMode::Toggle {
            TestResult::warning(mode.label, mode.value)
        } else {
            mode
        });

        results
    }

    /// Whether keystrokes currently go to a text field
    pub fn is_text_entry(&self) -> bool {
        match self.view {
            AppView::Passive => {
                self.passive_test.phase() == PassivePhase::Input && !self.countdown.is_active()
            }
            AppView::Results => matches!(self.browser.mode, BrowserMode::EditingNotes(_)),
            AppView::Sessions => matches!(
                &self.sessions.mode,
                SessionsMode::Building(builder) if builder.editing_name
            ),
            _ => false,
        }
    }

    // -- Keys -----------------------------------------------------------

    /// Route a terminal key event
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            if key.kind == KeyEventKind::Press {
                self.quit();
            }
            return;
        }

        let on_hold_view = matches!(self.view, AppView::Active | AppView::Regularity);
        if on_hold_view && self.is_hold_key(&key) {
            self.hold_key(key.kind);
            return;
        }
        if key.kind != KeyEventKind::Press {
            return;
        }

        if self.handle_modal_key(key) {
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.quit(),
            KeyCode::Esc => {
                if self.playback.is_some() {
                    self.abort_session();
                } else if self.session_summary.is_some() {
                    self.session_summary = None;
                } else if matches!(self.sessions.mode, SessionsMode::Building(_))
                    && self.view == AppView::Sessions
                {
                    self.sessions.mode = SessionsMode::List;
                } else {
                    self.quit();
                }
            }
            KeyCode::Tab => self.next_view(),
            KeyCode::BackTab => self.prev_view(),
            KeyCode::Char('?') => {
                self.switch_view(AppView::Help);
            }
            KeyCode::Char(c @ '1'..='7') => {
                let index = c as usize - '1' as usize;
                self.switch_view(AppView::from_index(index));
            }
            _ => self.handle_view_key(key),
        }
    }

    /// Text entry and confirmation prompts. Returns true when consumed.
    fn handle_modal_key(&mut self, key: KeyEvent) -> bool {
        match self.view {
            AppView::Passive if self.is_text_entry() => self.handle_estimate_key(key),
            AppView::Results => match self.browser.mode {
                BrowserMode::EditingNotes(_) => {
                    self.handle_notes_key(key);
                    true
                }
                BrowserMode::ConfirmClear => {
                    if matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y')) {
                        self.clear_results();
                    } else {
                        self.browser.mode = BrowserMode::Browse;
                        self.set_status("Clear cancelled");
                    }
                    true
                }
                BrowserMode::Browse => false,
            },
            AppView::Sessions if self.is_text_entry() => {
                self.handle_name_key(key);
                true
            }
            AppView::Sessions if matches!(self.sessions.mode, SessionsMode::ConfirmDelete) => {
                match key.code {
                    KeyCode::Char('k') | KeyCode::Char('K') => self.delete_selected_session(false),
                    KeyCode::Char('y') | KeyCode::Char('Y') => self.delete_selected_session(true),
                    _ => self.sessions.mode = SessionsMode::List,
                }
                true
            }
            _ => false,
        }
    }

    fn handle_notes_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.save_notes(),
            KeyCode::Esc => self.browser.mode = BrowserMode::Browse,
            KeyCode::Backspace => {
                if let Some(buffer) = self.browser.notes_buffer_mut() {
                    buffer.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(buffer) = self.browser.notes_buffer_mut() {
                    if buffer.chars().count() < MAX_TEXT_LEN {
                        buffer.push(c);
                    }
                }
            }
            _ => {}
        }
    }

    fn handle_name_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Esc {
            self.sessions.mode = SessionsMode::List;
            return;
        }
        let Some(builder) = self.sessions.builder_mut() else {
            return;
        };
        match key.code {
            KeyCode::Enter => builder.editing_name = false,
            KeyCode::Backspace => {
                builder.session.name.pop();
            }
            KeyCode::Char(c) => {
                if builder.session.name.chars().count() < MAX_TEXT_LEN {
                    builder.session.name.push(c);
                }
            }
            _ => {}
        }
    }

    fn handle_estimate_key(&mut self, key: KeyEvent) -> bool {
        let now = self.now_ms();
        let kind = match key.code {
            KeyCode::Char(c) if c.is_ascii_digit() || c == '.' => InputKind::Char(c),
            KeyCode::Backspace => InputKind::Backspace,
            KeyCode::Up | KeyCode::Right => InputKind::Increment,
            KeyCode::Down | KeyCode::Left => InputKind::Decrement,
            KeyCode::Enter => InputKind::Submit,
            _ => return false,
        };
        self.process_input(InputEvent::new(kind, now));
        true
    }

    fn handle_view_key(&mut self, key: KeyEvent) {
        match self.view {
            AppView::Active | AppView::Passive | AppView::Regularity => {
                match key.code {
                    KeyCode::Char('r') if self.playback.is_some() => self.redo_block(),
                    KeyCode::Enter | KeyCode::Char('r') => self.confirm_test(),
                    _ => {}
                }
            }
            AppView::Results => match key.code {
                KeyCode::Up => self.browser.select_prev(),
                KeyCode::Down => self.browser.select_next(),
                KeyCode::Left => self.browser.prev_type(),
                KeyCode::Right => self.browser.next_type(),
                KeyCode::Char('d') | KeyCode::Delete => self.delete_selected_result(),
                KeyCode::Char('n') => {
                    self.browser.begin_notes();
                }
                KeyCode::Char('e') => {
                    self.export_csv();
                }
                KeyCode::Char('w') => {
                    self.export_workbook();
                }
                KeyCode::Char('c') if !self.browser.rows.is_empty() => {
                    self.browser.mode = BrowserMode::ConfirmClear;
                }
                _ => {}
            },
            AppView::Sessions => self.handle_sessions_key(key),
            _ => {}
        }
    }

    fn handle_sessions_key(&mut self, key: KeyEvent) {
        if self.session_summary.is_some() {
            if key.code == KeyCode::Enter {
                self.session_summary = None;
            }
            return;
        }
        if self.playback.is_some() {
            if key.code == KeyCode::Enter {
                self.start_session();
            }
            return;
        }
        if let Some(builder) = self.sessions.builder_mut() {
            match key.code {
                KeyCode::Char('a') => builder.add(TestType::Active),
                KeyCode::Char('p') => builder.add(TestType::Passive),
                KeyCode::Char('r') => builder.add(TestType::Regularity),
                KeyCode::Char('x') | KeyCode::Delete => builder.remove_selected(),
                KeyCode::Char('u') => builder.move_up(),
                KeyCode::Char('d') => builder.move_down(),
                KeyCode::Up => builder.select_prev(),
                KeyCode::Down => builder.select_next(),
                KeyCode::Char('N') => builder.editing_name = true,
                KeyCode::Char('s') => {
                    self.save_session();
                }
                _ => {}
            }
            return;
        }
        match key.code {
            KeyCode::Up => self.sessions.select_prev(),
            KeyCode::Down => self.sessions.select_next(),
            KeyCode::Char('n') => self.new_session(),
            KeyCode::Char('e') => self.edit_selected_session(),
            KeyCode::Char('d') if self.sessions.selected_session().is_some() => {
                self.sessions.mode = SessionsMode::ConfirmDelete;
            }
            KeyCode::Enter => self.prepare_session(),
            _ => {}
        }
    }
}
