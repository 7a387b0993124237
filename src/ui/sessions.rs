//! Sessions view state: saved list, builder and playback bookkeeping

use crate::records::{TestRecord, TestType};
use crate::session::{PlayerState, Session, SessionPlayer};
use crate::store::{ResultStore, StoreError};
use crate::ui::browser::record_summary;

/// Session being created or edited
#[derive(Debug, Clone)]
pub struct SessionBuilder {
    pub session: Session,
    pub selected: usize,
    pub editing_name: bool,
}

impl SessionBuilder {
    pub fn new(now_ms: u64) -> Self {
        Self {
            session: Session::new("", now_ms),
            selected: 0,
            editing_name: true,
        }
    }

    pub fn edit(mut session: Session) -> Self {
        session.normalize();
        Self {
            session,
            selected: 0,
            editing_name: false,
        }
    }

    pub fn add(&mut self, test_type: TestType) {
        self.session.add_block(test_type);
        self.selected = self.session.blocks.len() - 1;
    }

    pub fn remove_selected(&mut self) {
        if self.session.remove_block_at(self.selected).is_ok()
            && self.selected >= self.session.blocks.len()
        {
            self.selected = self.session.blocks.len().saturating_sub(1);
        }
    }

    pub fn move_up(&mut self) {
        if self.session.move_block_up(self.selected) {
            self.selected -= 1;
        }
    }

    pub fn move_down(&mut self) {
        if self.session.move_block_down(self.selected) {
            self.selected += 1;
        }
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.session.blocks.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }
}

#[derive(Debug, Clone)]
pub enum SessionsMode {
    List,
    Building(SessionBuilder),
    /// Waiting for: keep results, delete them too, or cancel
    ConfirmDelete,
}

/// A session being played, with the outcome of each finished block
#[derive(Debug, Clone)]
pub struct Playback {
    pub player: SessionPlayer,
    pub completed: Vec<String>,
    /// The current block's result reached the store
    pub saved: bool,
    /// Result of the current block whose save failed
    pub unsaved: Option<TestRecord>,
}

impl Playback {
    pub fn new(player: SessionPlayer) -> Self {
        Self {
            player,
            completed: Vec::new(),
            saved: false,
            unsaved: None,
        }
    }

    /// Forget the save state of the previous attempt
    pub fn begin_block(&mut self) {
        self.saved = false;
        self.unsaved = None;
    }

    /// Blocks are running; view switching is locked
    pub fn is_playing(&self) -> bool {
        matches!(self.player.state(), PlayerState::Playing { .. })
    }

    pub fn current_type(&self) -> Option<TestType> {
        self.player.current_block().map(|b| b.test_type)
    }

    pub fn note_record(&mut self, record: &TestRecord) {
        self.saved = true;
        self.unsaved = None;
        self.completed.push(format!(
            "{}: {}",
            record.test_type().name(),
            record_summary(record)
        ));
    }
}

/// Shown after the last block of a session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub name: String,
    pub lines: Vec<String>,
}

pub struct SessionsView {
    pub sessions: Vec<Session>,
    pub selected: usize,
    pub mode: SessionsMode,
}

impl SessionsView {
    pub fn new() -> Self {
        Self {
            sessions: Vec::new(),
            selected: 0,
            mode: SessionsMode::List,
        }
    }

    pub fn refresh(&mut self, store: &ResultStore) -> Result<(), StoreError> {
        self.sessions = store.sessions()?;
        if self.selected >= self.sessions.len() {
            self.selected = self.sessions.len().saturating_sub(1);
        }
        Ok(())
    }

    pub fn selected_session(&self) -> Option<&Session> {
        self.sessions.get(self.selected)
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.sessions.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn builder_mut(&mut self) -> Option<&mut SessionBuilder> {
        match &mut self.mode {
            SessionsMode::Building(builder) => Some(builder),
            _ => None,
        }
    }
}

impl Default for SessionsView {
    fn default() -> Self {
        Self::new()
    }
}
