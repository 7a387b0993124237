//! Integration tests for Timing TestKit
//!
//! These tests exercise the full App pipeline: key handling, the three test
//! machines, result persistence, the results browser, export and session
//! playback. Time comes from a manual clock and storage lives in memory.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::cell::Cell;
use std::io;
use std::rc::Rc;
use timing_testkit::config::{Config, InputUnit};
use timing_testkit::input::HoldMode;
use timing_testkit::records::{
    ActiveTestResult, PassiveTestResult, RegularityTestResult, TestType,
};
use timing_testkit::store::{MemoryBackend, ResultStore, StorageBackend, StoreError};
use timing_testkit::tests::{ActivePhase, EstimateError, PassivePhase, TimingTest};
use timing_testkit::timing::{Clock, ManualClock};
use timing_testkit::ui::browser::BrowserMode;
use timing_testkit::ui::{App, AppState, AppView};

const T0: u64 = 1_700_000_000_000;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Fixed 2 s trials, no countdown
fn test_config() -> Config {
    let mut config = Config::default();
    config.trial.min_secs = 2.0;
    config.trial.max_secs = 2.0;
    config.countdown.enabled = false;
    config
}

fn new_app(config: Config) -> (App, ManualClock) {
    new_app_with_store(config, ResultStore::in_memory())
}

fn new_app_with_store(config: Config, store: ResultStore) -> (App, ManualClock) {
    let clock = ManualClock::new(T0);
    let mut app = App::new(config, store, Box::new(clock.clone()));
    app.hold_mode = HoldMode::Enhanced;
    (app, clock)
}

fn key(app: &mut App, code: KeyCode) {
    app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
}

fn key_release(app: &mut App, code: KeyCode) {
    app.handle_key(KeyEvent::new_with_kind(
        code,
        KeyModifiers::NONE,
        KeyEventKind::Release,
    ));
}

fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
        key(app, KeyCode::Char(c));
    }
}

/// Wait out the exposure, then hold the space key for `hold_ms`
fn finish_active_trial(app: &mut App, clock: &ManualClock, hold_ms: u64) {
    clock.advance(2_000);
    app.tick();
    assert_eq!(app.active_test.phase(), ActivePhase::Reproduction);
    key(app, KeyCode::Char(' '));
    clock.advance(hold_ms);
    key_release(app, KeyCode::Char(' '));
}

fn tap_regularity(app: &mut App, clock: &ManualClock, count: usize, step_ms: u64) {
    for _ in 0..count {
        key(app, KeyCode::Char(' '));
        clock.advance(step_ms);
    }
}

/// Storage that accepts reads but rejects every write
struct ReadOnlyBackend;

impl StorageBackend for ReadOnlyBackend {
    fn get_item(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Ok(None)
    }

    fn set_item(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Io(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "read-only",
        )))
    }

    fn remove_item(&mut self, _key: &str) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Memory storage that rejects writes of active results while `failing` is set
struct FlakyActiveBackend {
    inner: MemoryBackend,
    failing: Rc<Cell<bool>>,
}

impl StorageBackend for FlakyActiveBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get_item(key)
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.failing.get() && key == "activeTestResults" {
            return Err(StoreError::Io(io::Error::other("disk full")));
        }
        self.inner.set_item(key, value)
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StoreError> {
        self.inner.remove_item(key)
    }
}

fn new_app_with_flaky_store() -> (App, ManualClock, Rc<Cell<bool>>) {
    let failing = Rc::new(Cell::new(false));
    let backend = FlakyActiveBackend {
        inner: MemoryBackend::new(),
        failing: failing.clone(),
    };
    let (app, clock) = new_app_with_store(test_config(), ResultStore::new(Box::new(backend)));
    (app, clock, failing)
}

// ---------------------------------------------------------------------------
// Active test
// ---------------------------------------------------------------------------

#[test]
fn active_trial_is_persisted() {
    let (mut app, clock) = new_app(test_config());
    key(&mut app, KeyCode::Char('2'));
    assert_eq!(app.view, AppView::Active);

    key(&mut app, KeyCode::Enter);
    assert!(app.active_test.exposure_pending());
    finish_active_trial(&mut app, &clock, 2_000);

    assert!(app.active_test.is_complete());
    let saved: Vec<ActiveTestResult> = app.store.load().unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].target_duration, 2000.0);
    assert_eq!(saved[0].user_duration, 2000.0);
    assert_eq!(saved[0].session_id, None);
    assert_eq!(app.get_status(), Some("Result saved"));
}

#[test]
fn countdown_delays_start_and_drops_input() {
    let mut config = test_config();
    config.countdown.enabled = true;
    config.countdown.seconds = 3;
    let (mut app, clock) = new_app(config);
    app.switch_view(AppView::Active);

    key(&mut app, KeyCode::Enter);
    assert!(app.countdown.is_active());
    assert!(!app.active_test.is_started());

    clock.advance(2_999);
    app.tick();
    key(&mut app, KeyCode::Char(' '));
    assert!(app.countdown.is_active());

    clock.advance(1);
    app.tick();
    assert!(!app.countdown.is_active());
    assert!(app.active_test.exposure_pending());
}

#[test]
fn release_without_press_creates_nothing() {
    let (mut app, clock) = new_app(test_config());
    app.switch_view(AppView::Active);
    key(&mut app, KeyCode::Enter);
    clock.advance(2_000);
    app.tick();

    key_release(&mut app, KeyCode::Char(' '));
    assert_eq!(app.active_test.phase(), ActivePhase::Reproduction);
    assert_eq!(app.store.count(TestType::Active).unwrap(), 0);
}

#[test]
fn toggle_mode_uses_two_presses() {
    let (mut app, clock) = new_app(test_config());
    app.hold_mode = HoldMode::Toggle;
    app.switch_view(AppView::Active);
    key(&mut app, KeyCode::Enter);

    // Ignored during exposure
    key(&mut app, KeyCode::Char(' '));
    clock.advance(2_000);
    app.tick();

    key(&mut app, KeyCode::Char(' '));
    assert!(app.active_test.is_holding());
    clock.advance(1_800);
    key(&mut app, KeyCode::Char(' '));

    let saved: Vec<ActiveTestResult> = app.store.load().unwrap();
    assert_eq!(saved[0].user_duration, 1800.0);
}

#[test]
fn leaving_during_exposure_cancels_the_trial() {
    let (mut app, clock) = new_app(test_config());
    app.switch_view(AppView::Active);
    key(&mut app, KeyCode::Enter);
    clock.advance(500);

    app.switch_view(AppView::Home);
    clock.advance(5_000);
    app.tick();
    app.switch_view(AppView::Active);
    app.tick();

    assert!(!app.active_test.is_started());
    assert_eq!(app.active_test.phase(), ActivePhase::Exposure);
    assert_eq!(app.active_test.target_duration_ms(), 0);
}

#[test]
fn leaving_during_reproduction_keeps_the_trial() {
    let (mut app, clock) = new_app(test_config());
    app.switch_view(AppView::Active);
    key(&mut app, KeyCode::Enter);
    clock.advance(2_000);
    app.tick();

    app.switch_view(AppView::Results);
    app.switch_view(AppView::Active);
    assert_eq!(app.active_test.phase(), ActivePhase::Reproduction);

    key(&mut app, KeyCode::Char(' '));
    clock.advance(1_000);
    key_release(&mut app, KeyCode::Char(' '));
    assert_eq!(app.store.count(TestType::Active).unwrap(), 1);
}

#[test]
fn storage_failure_is_reported_not_fatal() {
    let store = ResultStore::new(Box::new(ReadOnlyBackend));
    let (mut app, clock) = new_app_with_store(test_config(), store);
    app.switch_view(AppView::Active);
    key(&mut app, KeyCode::Enter);
    finish_active_trial(&mut app, &clock, 1_500);

    assert_eq!(app.state, AppState::Running);
    assert!(app.active_test.is_complete());
    let status = app.get_status().unwrap_or_default();
    assert!(status.starts_with("Failed to save result"), "{}", status);
}

// ---------------------------------------------------------------------------
// Passive test
// ---------------------------------------------------------------------------

#[test]
fn passive_estimate_in_seconds_is_stored_in_ms() {
    let mut config = test_config();
    config.passive.input_unit = InputUnit::Seconds;
    let (mut app, clock) = new_app(config);
    app.switch_view(AppView::Passive);
    key(&mut app, KeyCode::Enter);
    clock.advance(2_000);
    app.tick();
    assert_eq!(app.passive_test.phase(), PassivePhase::Input);
    assert_eq!(app.passive_test.estimate().text(), "1");

    key(&mut app, KeyCode::Backspace);
    type_text(&mut app, "1.5");
    key(&mut app, KeyCode::Enter);

    let saved: Vec<PassiveTestResult> = app.store.load().unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].target_exposure, 2000.0);
    assert_eq!(saved[0].user_input, 1500.0);
}

#[test]
fn passive_slider_steps_and_digits_stay_in_view() {
    let (mut app, clock) = new_app(test_config());
    app.switch_view(AppView::Passive);
    key(&mut app, KeyCode::Enter);
    clock.advance(2_000);
    app.tick();

    key(&mut app, KeyCode::Up);
    key(&mut app, KeyCode::Up);
    assert_eq!(app.passive_test.estimate().text(), "1200");

    // Digits are typed, not treated as view shortcuts
    type_text(&mut app, "3");
    assert_eq!(app.view, AppView::Passive);
    assert_eq!(app.passive_test.estimate().text(), "12003");
}

#[test]
fn passive_empty_estimate_blocks_submit() {
    let (mut app, clock) = new_app(test_config());
    app.switch_view(AppView::Passive);
    key(&mut app, KeyCode::Enter);
    clock.advance(2_000);
    app.tick();

    for _ in 0..4 {
        key(&mut app, KeyCode::Backspace);
    }
    key(&mut app, KeyCode::Enter);

    assert_eq!(app.passive_test.phase(), PassivePhase::Input);
    assert_eq!(app.passive_test.last_error(), Some(&EstimateError::Empty));
    assert_eq!(app.store.count(TestType::Passive).unwrap(), 0);
}

// ---------------------------------------------------------------------------
// Regularity test
// ---------------------------------------------------------------------------

#[test]
fn regularity_even_taps() {
    let (mut app, clock) = new_app(test_config());
    app.switch_view(AppView::Regularity);

    // Taps before Enter are ignored
    key(&mut app, KeyCode::Char(' '));
    assert_eq!(app.regularity_test.tap_count(), 0);

    key(&mut app, KeyCode::Enter);
    tap_regularity(&mut app, &clock, 25, 1_000);

    let saved: Vec<RegularityTestResult> = app.store.load().unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].avg_interval, 1.0);
    assert_eq!(saved[0].std_dev_interval, 0.0);
    assert_eq!(saved[0].tap_timestamps.len(), 25);

    let rows = app.current_results();
    let avg = rows.iter().find(|r| r.label == "Average interval").unwrap();
    assert_eq!(avg.value, "1.00 s");
}

#[test]
fn regularity_taps_during_countdown_are_ignored() {
    let mut config = test_config();
    config.countdown.enabled = true;
    config.countdown.seconds = 3;
    let (mut app, clock) = new_app(config);
    app.switch_view(AppView::Regularity);

    key(&mut app, KeyCode::Enter);
    assert!(app.countdown.is_active());
    for _ in 0..3 {
        clock.advance(900);
        app.tick();
        key(&mut app, KeyCode::Char(' '));
    }
    assert!(app.countdown.is_active());
    assert_eq!(app.regularity_test.tap_count(), 0);

    clock.advance(300);
    app.tick();
    assert!(!app.countdown.is_active());
    assert!(app.regularity_test.is_started());

    clock.advance(250);
    let first_tap = clock.now_ms();
    key(&mut app, KeyCode::Char(' '));
    assert_eq!(app.regularity_test.tap_timestamps(), &[first_tap]);

    clock.advance(1_000);
    tap_regularity(&mut app, &clock, 24, 1_000);
    let saved: Vec<RegularityTestResult> = app.store.load().unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].tap_timestamps[0], 0);
    assert_eq!(saved[0].tap_timestamps[1], 1_000);
    assert_eq!(saved[0].avg_interval, 1.0);
}

#[test]
fn regularity_restart_clears_taps() {
    let (mut app, clock) = new_app(test_config());
    app.switch_view(AppView::Regularity);
    key(&mut app, KeyCode::Enter);
    tap_regularity(&mut app, &clock, 25, 900);
    assert!(app.regularity_test.is_complete());

    key(&mut app, KeyCode::Char('r'));
    assert_eq!(app.regularity_test.tap_count(), 0);
    assert!(app.regularity_test.is_started());
}

// ---------------------------------------------------------------------------
// Results browser and export
// ---------------------------------------------------------------------------

fn app_with_three_active_results() -> (App, ManualClock) {
    let (mut app, clock) = new_app(test_config());
    app.switch_view(AppView::Active);
    for hold in [1_000, 2_000, 3_000] {
        key(&mut app, KeyCode::Enter);
        finish_active_trial(&mut app, &clock, hold);
    }
    (app, clock)
}

#[test]
fn browse_edit_notes_and_delete() {
    let (mut app, _clock) = app_with_three_active_results();
    key(&mut app, KeyCode::Char('5'));
    assert_eq!(app.view, AppView::Results);
    assert_eq!(app.browser.rows.len(), 3);

    // Newest first: the 3000 ms hold
    key(&mut app, KeyCode::Char('n'));
    type_text(&mut app, "tired, q");
    key(&mut app, KeyCode::Enter);
    assert_eq!(app.browser.mode, BrowserMode::Browse);
    assert_eq!(app.state, AppState::Running);

    let saved: Vec<ActiveTestResult> = app.store.load().unwrap();
    assert_eq!(saved[0].notes, "tired, q");
    assert_eq!(saved[0].user_duration, 3000.0);

    key(&mut app, KeyCode::Down);
    key(&mut app, KeyCode::Char('d'));
    let remaining: Vec<ActiveTestResult> = app.store.load().unwrap();
    assert_eq!(remaining.len(), 2);
    assert_eq!(remaining[0], saved[0]);
    assert_eq!(remaining[1], saved[2]);
    assert_eq!(app.browser.rows.len(), 2);
}

#[test]
fn clear_requires_confirmation() {
    let (mut app, _clock) = app_with_three_active_results();
    app.switch_view(AppView::Results);

    key(&mut app, KeyCode::Char('c'));
    key(&mut app, KeyCode::Char('n'));
    assert_eq!(app.store.count(TestType::Active).unwrap(), 3);

    key(&mut app, KeyCode::Char('c'));
    key(&mut app, KeyCode::Char('y'));
    assert_eq!(app.store.count(TestType::Active).unwrap(), 0);
    assert!(app.browser.is_dirty());

    app.tick();
    assert!(app.browser.rows.is_empty());
}

#[test]
fn export_csv_and_workbook() {
    let dir = std::env::temp_dir().join(format!("timing-testkit-it-{}", std::process::id()));
    let mut config = test_config();
    config.storage.export_dir = Some(dir.clone());
    let (mut app, clock) = new_app(config);

    app.switch_view(AppView::Results);
    assert!(app.export_csv().is_none());
    assert_eq!(app.get_status(), Some("No results to export"));

    app.switch_view(AppView::Active);
    key(&mut app, KeyCode::Enter);
    finish_active_trial(&mut app, &clock, 2_100);
    app.switch_view(AppView::Results);

    let csv = app.export_csv().expect("csv written");
    let contents = std::fs::read_to_string(&csv).unwrap();
    assert!(contents.starts_with("Day,Time,Session Id,Target Duration (ms),Your Duration (ms),Notes"));
    assert!(contents.contains(",2000,2100,\"\""));

    let workbook = app.export_workbook().expect("workbook written");
    assert_eq!(workbook.extension().and_then(|e| e.to_str()), Some("xlsx"));
    assert!(workbook.starts_with(&dir));
    let bytes = std::fs::read(&workbook).unwrap();
    assert_eq!(&bytes[..2], b"PK");

    let _ = std::fs::remove_dir_all(&dir);
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

/// Build and save "Morning" = [active, regularity, passive] through the keys
fn build_morning_session(app: &mut App) {
    key(app, KeyCode::Char('6'));
    assert_eq!(app.view, AppView::Sessions);
    key(app, KeyCode::Char('n'));
    type_text(app, "Morning");
    key(app, KeyCode::Enter);
    key(app, KeyCode::Char('a'));
    key(app, KeyCode::Char('r'));
    key(app, KeyCode::Char('p'));
    key(app, KeyCode::Char('s'));
}

#[test]
fn session_builder_saves_ordered_blocks() {
    let (mut app, _clock) = new_app(test_config());
    build_morning_session(&mut app);

    let sessions = app.store.sessions().unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].name, "Morning");
    let types: Vec<TestType> = sessions[0].blocks.iter().map(|b| b.test_type).collect();
    assert_eq!(
        types,
        vec![TestType::Active, TestType::Regularity, TestType::Passive]
    );
    for (i, block) in sessions[0].blocks.iter().enumerate() {
        assert_eq!(block.order, i);
    }
}

#[test]
fn session_without_name_is_rejected() {
    let (mut app, _clock) = new_app(test_config());
    app.switch_view(AppView::Sessions);
    key(&mut app, KeyCode::Char('n'));
    key(&mut app, KeyCode::Enter);
    key(&mut app, KeyCode::Char('a'));
    key(&mut app, KeyCode::Char('s'));

    assert_eq!(app.get_status(), Some("Please enter a session name"));
    assert!(app.store.sessions().unwrap().is_empty());
}

#[test]
fn session_plays_every_block_in_order() {
    let (mut app, clock) = new_app(test_config());
    build_morning_session(&mut app);
    let session_id = app.store.sessions().unwrap()[0].id.clone();

    key(&mut app, KeyCode::Enter);
    assert!(app.playback.is_some());
    key(&mut app, KeyCode::Enter);

    // Block 1: active
    assert_eq!(app.view, AppView::Active);
    finish_active_trial(&mut app, &clock, 1_900);
    assert!(app.active_test.is_complete());

    // Locked to the session while it plays
    key(&mut app, KeyCode::Tab);
    assert_eq!(app.view, AppView::Active);

    key(&mut app, KeyCode::Enter);
    assert_eq!(app.view, AppView::Regularity);
    assert_eq!(app.playback.as_ref().unwrap().player.progress(), (1, 3));

    // Block 2: regularity
    tap_regularity(&mut app, &clock, 25, 1_000);
    key(&mut app, KeyCode::Enter);

    // Block 3: passive
    assert_eq!(app.view, AppView::Passive);
    clock.advance(2_000);
    app.tick();
    key(&mut app, KeyCode::Enter);
    assert!(app.passive_test.is_complete());
    key(&mut app, KeyCode::Enter);

    assert_eq!(app.view, AppView::Sessions);
    assert!(app.playback.is_none());
    let summary = app.session_summary.as_ref().expect("summary");
    assert_eq!(summary.name, "Morning");
    assert_eq!(summary.lines.len(), 3);

    let active: Vec<ActiveTestResult> = app.store.load().unwrap();
    let regularity: Vec<RegularityTestResult> = app.store.load().unwrap();
    let passive: Vec<PassiveTestResult> = app.store.load().unwrap();
    assert_eq!(active[0].session_id.as_deref(), Some(session_id.as_str()));
    assert_eq!(regularity[0].session_id.as_deref(), Some(session_id.as_str()));
    assert_eq!(passive[0].session_id.as_deref(), Some(session_id.as_str()));

    // Machines are free of the session afterwards
    app.switch_view(AppView::Active);
    key(&mut app, KeyCode::Enter);
    finish_active_trial(&mut app, &clock, 2_000);
    let active: Vec<ActiveTestResult> = app.store.load().unwrap();
    assert_eq!(active[0].session_id, None);
}

#[test]
fn aborting_a_session_keeps_finished_results() {
    let (mut app, clock) = new_app(test_config());
    build_morning_session(&mut app);
    key(&mut app, KeyCode::Enter);
    key(&mut app, KeyCode::Enter);
    finish_active_trial(&mut app, &clock, 2_000);
    key(&mut app, KeyCode::Enter);
    assert_eq!(app.view, AppView::Regularity);

    key(&mut app, KeyCode::Esc);
    assert_eq!(app.state, AppState::Running);
    assert_eq!(app.view, AppView::Sessions);
    assert!(app.playback.is_none());
    assert!(!app.regularity_test.is_started());
    assert_eq!(app.store.count(TestType::Active).unwrap(), 1);
}

#[test]
fn unsaved_block_holds_the_session_until_retried() {
    let (mut app, clock, failing) = new_app_with_flaky_store();
    build_morning_session(&mut app);
    key(&mut app, KeyCode::Enter);
    key(&mut app, KeyCode::Enter);

    failing.set(true);
    finish_active_trial(&mut app, &clock, 2_000);
    assert!(app.active_test.is_complete());
    assert!(app
        .get_status()
        .is_some_and(|s| s.starts_with("Failed to save result: IO error: disk full")));
    assert_eq!(app.store.count(TestType::Active).unwrap(), 0);

    // Retry still fails: stay on the block
    key(&mut app, KeyCode::Enter);
    assert_eq!(app.view, AppView::Active);
    assert_eq!(app.playback.as_ref().unwrap().player.progress(), (0, 3));
    assert_eq!(app.store.count(TestType::Active).unwrap(), 0);

    failing.set(false);
    key(&mut app, KeyCode::Enter);
    assert_eq!(app.view, AppView::Regularity);
    assert_eq!(app.playback.as_ref().unwrap().player.progress(), (1, 3));
    let active: Vec<ActiveTestResult> = app.store.load().unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].user_duration, 2000.0);
    assert!(active[0].session_id.is_some());
}

#[test]
fn unsaved_block_can_be_redone() {
    let (mut app, clock, failing) = new_app_with_flaky_store();
    build_morning_session(&mut app);
    key(&mut app, KeyCode::Enter);
    key(&mut app, KeyCode::Enter);

    failing.set(true);
    finish_active_trial(&mut app, &clock, 2_000);
    failing.set(false);

    key(&mut app, KeyCode::Char('r'));
    assert_eq!(app.view, AppView::Active);
    assert!(app.active_test.exposure_pending());
    assert!(app.playback.as_ref().is_some_and(|p| p.unsaved.is_none()));

    finish_active_trial(&mut app, &clock, 1_500);
    key(&mut app, KeyCode::Enter);
    assert_eq!(app.view, AppView::Regularity);
    let active: Vec<ActiveTestResult> = app.store.load().unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].user_duration, 1500.0);

    // A saved block is not redone
    tap_regularity(&mut app, &clock, 25, 1_000);
    key(&mut app, KeyCode::Char('r'));
    assert!(app.regularity_test.is_complete());
    assert_eq!(app.store.count(TestType::Regularity).unwrap(), 1);
}

fn play_active_block_of(app: &mut App, clock: &ManualClock) {
    key(app, KeyCode::Enter);
    key(app, KeyCode::Enter);
    finish_active_trial(app, clock, 2_000);
    key(app, KeyCode::Esc);
}

#[test]
fn deleting_session_can_keep_results() {
    let (mut app, clock) = new_app(test_config());
    build_morning_session(&mut app);
    play_active_block_of(&mut app, &clock);

    key(&mut app, KeyCode::Char('d'));
    key(&mut app, KeyCode::Char('k'));

    assert!(app.store.sessions().unwrap().is_empty());
    let active: Vec<ActiveTestResult> = app.store.load().unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].session_id, None);
}

#[test]
fn deleting_session_can_remove_results() {
    let (mut app, clock) = new_app(test_config());
    build_morning_session(&mut app);
    play_active_block_of(&mut app, &clock);

    key(&mut app, KeyCode::Char('d'));
    key(&mut app, KeyCode::Char('y'));

    assert!(app.store.sessions().unwrap().is_empty());
    assert_eq!(app.store.count(TestType::Active).unwrap(), 0);
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[test]
fn config_roundtrip_through_toml() {
    let path = std::env::temp_dir().join(format!("timing-testkit-it-{}.toml", std::process::id()));
    let mut config = test_config();
    config.passive.input_unit = InputUnit::Seconds;
    config.ui.hold_key = 'h';
    config.save_to(&path).unwrap();

    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded.passive.input_unit, InputUnit::Seconds);
    assert_eq!(loaded.ui.hold_key, 'h');
    assert!(!loaded.countdown.enabled);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn quit_key() {
    let (mut app, _clock) = new_app(test_config());
    key(&mut app, KeyCode::Char('q'));
    assert_eq!(app.state, AppState::Quitting);
}
