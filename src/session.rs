//! User-defined sessions: ordered blocks of tests, and their playback

use crate::records::{new_id, TestType};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a session cannot be saved or played
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Please enter a session name")]
    EmptyName,
    #[error("Please add at least one test block")]
    NoBlocks,
    #[error("No block at position {0}")]
    BlockOutOfRange(usize),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionBlock {
    pub id: String,
    #[serde(rename = "type")]
    pub test_type: TestType,
    /// 0-based position; always equals the index in `Session::blocks`
    pub order: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub name: String,
    /// Epoch ms
    pub created_at: u64,
    #[serde(default)]
    pub blocks: Vec<SessionBlock>,
}

impl Session {
    pub fn new(name: impl Into<String>, created_at: u64) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            created_at,
            blocks: Vec::new(),
        }
    }

    /// Append a block of the given type; returns its id
    pub fn add_block(&mut self, test_type: TestType) -> String {
        let block = SessionBlock {
            id: new_id(),
            test_type,
            order: self.blocks.len(),
        };
        let id = block.id.clone();
        self.blocks.push(block);
        id
    }

    /// Remove a block by id. Returns false if no block matched.
    pub fn remove_block(&mut self, block_id: &str) -> bool {
        let before = self.blocks.len();
        self.blocks.retain(|b| b.id != block_id);
        self.renumber();
        self.blocks.len() != before
    }

    /// Remove the block at `index`, returning it
    pub fn remove_block_at(&mut self, index: usize) -> Result<SessionBlock, SessionError> {
        if index >= self.blocks.len() {
            return Err(SessionError::BlockOutOfRange(index));
        }
        let block = self.blocks.remove(index);
        self.renumber();
        Ok(block)
    }

    /// Swap the block at `index` with its predecessor. No-op on the first.
    pub fn move_block_up(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.blocks.len() {
            return false;
        }
        self.blocks.swap(index, index - 1);
        self.renumber();
        true
    }

    /// Swap the block at `index` with its successor. No-op on the last.
    pub fn move_block_down(&mut self, index: usize) -> bool {
        if index + 1 >= self.blocks.len() {
            return false;
        }
        self.blocks.swap(index, index + 1);
        self.renumber();
        true
    }

    /// Checks required before saving
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.name.trim().is_empty() {
            return Err(SessionError::EmptyName);
        }
        if self.blocks.is_empty() {
            return Err(SessionError::NoBlocks);
        }
        Ok(())
    }

    /// Blocks sorted by `order`, for sessions loaded from storage
    pub fn normalize(&mut self) {
        self.blocks.sort_by_key(|b| b.order);
        self.renumber();
    }

    fn renumber(&mut self) {
        for (i, block) in self.blocks.iter_mut().enumerate() {
            block.order = i;
        }
    }
}

/// Playback state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    /// Block list shown, not yet started
    Ready,
    Playing { index: usize },
    Completed,
}

/// Plays a session's blocks one after another
#[derive(Debug, Clone)]
pub struct SessionPlayer {
    session: Session,
    state: PlayerState,
}

impl SessionPlayer {
    /// Playback cannot start on an empty session.
    pub fn new(mut session: Session) -> Result<Self, SessionError> {
        if session.blocks.is_empty() {
            return Err(SessionError::NoBlocks);
        }
        session.normalize();
        Ok(Self {
            session,
            state: PlayerState::Ready,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_id(&self) -> &str {
        &self.session.id
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn is_completed(&self) -> bool {
        self.state == PlayerState::Completed
    }

    /// Begin with the first block. Only valid from `Ready`.
    pub fn start(&mut self) -> Option<&SessionBlock> {
        if self.state != PlayerState::Ready {
            return None;
        }
        self.state = PlayerState::Playing { index: 0 };
        log::info!("Session '{}' started", self.session.name);
        self.session.blocks.first()
    }

    pub fn current_index(&self) -> Option<usize> {
        match self.state {
            PlayerState::Playing { index } => Some(index),
            _ => None,
        }
    }

    pub fn current_block(&self) -> Option<&SessionBlock> {
        self.current_index().and_then(|i| self.session.blocks.get(i))
    }

    /// Mark the current block done and advance. Returns the new state;
    /// the transition to `Completed` happens exactly once.
    pub fn complete_current(&mut self) -> PlayerState {
        if let PlayerState::Playing { index } = self.state {
            self.state = if index + 1 < self.session.blocks.len() {
                PlayerState::Playing { index: index + 1 }
            } else {
                log::info!("Session '{}' completed", self.session.name);
                PlayerState::Completed
            };
        }
        self.state
    }

    /// `(blocks done, total blocks)`
    pub fn progress(&self) -> (usize, usize) {
        let total = self.session.blocks.len();
        let done = match self.state {
            PlayerState::Ready => 0,
            PlayerState::Playing { index } => index,
            PlayerState::Completed => total,
        };
        (done, total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_orders(session: &Session) {
        for (i, block) in session.blocks.iter().enumerate() {
            assert_eq!(block.order, i);
        }
    }

    fn three_block_session() -> Session {
        let mut session = Session::new("Morning", 0);
        session.add_block(TestType::Active);
        session.add_block(TestType::Regularity);
        session.add_block(TestType::Passive);
        session
    }

    #[test]
    fn add_block_appends_in_order() {
        let session = three_block_session();
        assert_eq!(session.blocks.len(), 3);
        assert_eq!(session.blocks[1].test_type, TestType::Regularity);
        assert_orders(&session);
    }

    #[test]
    fn remove_block_renumbers() {
        let mut session = three_block_session();
        let middle = session.blocks[1].id.clone();
        assert!(session.remove_block(&middle));
        assert!(!session.remove_block("missing"));
        assert_eq!(session.blocks.len(), 2);
        assert_eq!(session.blocks[1].test_type, TestType::Passive);
        assert_orders(&session);
    }

    #[test]
    fn remove_block_at_checks_index() {
        let mut session = three_block_session();
        assert_eq!(
            session.remove_block_at(3),
            Err(SessionError::BlockOutOfRange(3))
        );
        let removed = session.remove_block_at(0).unwrap();
        assert_eq!(removed.test_type, TestType::Active);
        assert_eq!(session.blocks[0].test_type, TestType::Regularity);
        assert_orders(&session);
    }

    #[test]
    fn move_blocks_respects_boundaries() {
        let mut session = three_block_session();
        assert!(!session.move_block_up(0));
        assert!(!session.move_block_down(2));
        assert!(!session.move_block_down(7));

        assert!(session.move_block_up(2));
        assert_eq!(session.blocks[1].test_type, TestType::Passive);
        assert!(session.move_block_down(0));
        assert_eq!(session.blocks[0].test_type, TestType::Passive);
        assert_eq!(session.blocks[1].test_type, TestType::Active);
        assert_orders(&session);
    }

    #[test]
    fn validate_requires_name_and_blocks() {
        let mut session = Session::new("  ", 0);
        assert_eq!(session.validate(), Err(SessionError::EmptyName));
        session.name = "Evening".into();
        assert_eq!(session.validate(), Err(SessionError::NoBlocks));
        session.add_block(TestType::Passive);
        assert_eq!(session.validate(), Ok(()));
    }

    #[test]
    fn session_json_uses_type_field() {
        let session = three_block_session();
        let json = serde_json::to_string(&session).unwrap();
        assert!(json.contains("\"type\":\"active\""));
        assert!(json.contains("\"createdAt\":0"));
    }

    #[test]
    fn player_refuses_empty_session() {
        let session = Session::new("Empty", 0);
        assert_eq!(SessionPlayer::new(session).err(), Some(SessionError::NoBlocks));
    }

    #[test]
    fn player_advances_one_block_at_a_time() {
        let mut player = SessionPlayer::new(three_block_session()).unwrap();
        assert_eq!(player.state(), PlayerState::Ready);
        assert!(player.current_block().is_none());

        let first = player.start().map(|b| b.test_type);
        assert_eq!(first, Some(TestType::Active));
        assert!(player.start().is_none());

        assert_eq!(player.complete_current(), PlayerState::Playing { index: 1 });
        assert_eq!(player.current_block().map(|b| b.test_type), Some(TestType::Regularity));
        assert_eq!(player.progress(), (1, 3));

        assert_eq!(player.complete_current(), PlayerState::Playing { index: 2 });
        assert_eq!(player.complete_current(), PlayerState::Completed);
        assert!(player.is_completed());
        assert_eq!(player.complete_current(), PlayerState::Completed);
        assert_eq!(player.progress(), (3, 3));
    }

    #[test]
    fn player_sorts_loaded_blocks_by_order() {
        let mut session = three_block_session();
        session.blocks.reverse();
        let mut player = SessionPlayer::new(session).unwrap();
        assert_eq!(player.start().map(|b| b.test_type), Some(TestType::Active));
    }

    #[test]
    fn complete_before_start_is_noop() {
        let mut player = SessionPlayer::new(three_block_session()).unwrap();
        assert_eq!(player.complete_current(), PlayerState::Ready);
    }
}
