//! Persistent result and session storage
//!
//! Each storage key holds one JSON array. Every mutation reads the whole
//! array, modifies it and writes it back; there are no partial updates.
//!
//! | Key | Contents |
//! |-----|----------|
//! | `activeTestResults` | `ActiveTestResult[]` |
//! | `passiveTestResults` | `PassiveTestResult[]` |
//! | `regularityTestResults` | `RegularityTestResult[]` |
//! | `savedSessions` | `Session[]` |

use crate::records::{
    ActiveTestResult, PassiveTestResult, RegularityTestResult, ResultRecord, TestType,
};
use crate::session::Session;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const SESSIONS_KEY: &str = "savedSessions";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Could not determine data directory")]
    NoDataDir,
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Corrupt data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("No record with key {0}")]
    NotFound(String),
}

/// Key/value persistence of JSON strings
pub trait StorageBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove_item(&mut self, key: &str) -> Result<(), StoreError>;
}

/// One `<key>.json` file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Use `dir`, creating it if needed
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl StorageBackend for FileBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        // Write-then-rename so a crash never leaves a half-written array
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process storage, used by tests and as a fallback
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    items: HashMap<String, String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StoreError> {
        self.items.remove(key);
        Ok(())
    }
}

/// Handle returned by `on_results_cleared`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

type ClearedCallback = Box<dyn FnMut(TestType)>;

struct Listener {
    id: u64,
    test_type: TestType,
    callback: ClearedCallback,
}

/// Typed access to results and sessions
pub struct ResultStore {
    backend: Box<dyn StorageBackend>,
    listeners: Vec<Listener>,
    next_subscription: u64,
}

impl ResultStore {
    pub fn new(backend: Box<dyn StorageBackend>) -> Self {
        Self {
            backend,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Store backed by an empty in-memory map
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryBackend::new()))
    }

    /// Store backed by JSON files in `dir`
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        Ok(Self::new(Box::new(FileBackend::new(dir)?)))
    }

    fn read_array<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, StoreError> {
        match self.backend.get_item(key)? {
            Some(json) if !json.trim().is_empty() => Ok(serde_json::from_str(&json)?),
            _ => Ok(Vec::new()),
        }
    }

    fn write_array<T: Serialize>(&mut self, key: &str, items: &[T]) -> Result<(), StoreError> {
        let json = serde_json::to_string(items)?;
        self.backend.set_item(key, &json)
    }

    /// Persist a record, newest first
    pub fn save<R: ResultRecord>(&mut self, record: R) -> Result<(), StoreError> {
        let key = R::TEST_TYPE.storage_key();
        let mut records: Vec<R> = self.read_array(key)?;
        records.insert(0, record);
        self.write_array(key, &records)?;
        log::info!("Saved result to {} ({} total)", key, records.len());
        Ok(())
    }

    /// All records of a type, newest first
    pub fn load<R: ResultRecord>(&self) -> Result<Vec<R>, StoreError> {
        let mut records: Vec<R> = self.read_array(R::TEST_TYPE.storage_key())?;
        records.sort_by(|a, b| b.recorded_at_ms().cmp(&a.recorded_at_ms()));
        Ok(records)
    }

    pub fn count(&self, test_type: TestType) -> Result<usize, StoreError> {
        Ok(match test_type {
            TestType::Active => self.load::<ActiveTestResult>()?.len(),
            TestType::Passive => self.load::<PassiveTestResult>()?.len(),
            TestType::Regularity => self.load::<RegularityTestResult>()?.len(),
        })
    }

    /// Remove exactly one record by its key (`id`, or `date` for regularity)
    pub fn delete<R: ResultRecord>(&mut self, record_key: &str) -> Result<(), StoreError> {
        let key = R::TEST_TYPE.storage_key();
        let mut records: Vec<R> = self.read_array(key)?;
        let index = records
            .iter()
            .position(|r| r.record_key() == record_key)
            .ok_or_else(|| StoreError::NotFound(record_key.to_string()))?;
        records.remove(index);
        self.write_array(key, &records)?;
        log::info!("Deleted {} from {}", record_key, key);
        Ok(())
    }

    pub fn update_notes<R: ResultRecord>(
        &mut self,
        record_key: &str,
        notes: &str,
    ) -> Result<(), StoreError> {
        let key = R::TEST_TYPE.storage_key();
        let mut records: Vec<R> = self.read_array(key)?;
        let record = records
            .iter_mut()
            .find(|r| r.record_key() == record_key)
            .ok_or_else(|| StoreError::NotFound(record_key.to_string()))?;
        record.set_notes(notes.to_string());
        self.write_array(key, &records)?;
        log::debug!("Updated notes on {} in {}", record_key, key);
        Ok(())
    }

    /// Remove every result of a type and notify subscribers
    pub fn clear(&mut self, test_type: TestType) -> Result<(), StoreError> {
        self.backend.remove_item(test_type.storage_key())?;
        log::info!("All results cleared for {}", test_type.storage_key());
        self.notify_cleared(test_type);
        Ok(())
    }

    /// Register for out-of-band deletions of a test type's results
    pub fn on_results_cleared(
        &mut self,
        test_type: TestType,
        callback: impl FnMut(TestType) + 'static,
    ) -> Subscription {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.listeners.push(Listener {
            id,
            test_type,
            callback: Box::new(callback),
        });
        Subscription(id)
    }

    pub fn unsubscribe(&mut self, subscription: Subscription) {
        self.listeners.retain(|l| l.id != subscription.0);
    }

    fn notify_cleared(&mut self, test_type: TestType) {
        for listener in self.listeners.iter_mut().filter(|l| l.test_type == test_type) {
            (listener.callback)(test_type);
        }
    }

    fn retain_results<R: ResultRecord>(
        &mut self,
        mut keep: impl FnMut(&R) -> bool,
    ) -> Result<usize, StoreError> {
        let key = R::TEST_TYPE.storage_key();
        let mut records: Vec<R> = self.read_array(key)?;
        let before = records.len();
        records.retain(|r| keep(r));
        let removed = before - records.len();
        if removed > 0 {
            self.write_array(key, &records)?;
        }
        Ok(removed)
    }

    fn rewrite_session<R: ResultRecord>(&mut self, session_id: &str) -> Result<usize, StoreError> {
        let key = R::TEST_TYPE.storage_key();
        let mut records: Vec<R> = self.read_array(key)?;
        let mut changed = 0;
        for record in records.iter_mut() {
            if record.session_id() == Some(session_id) {
                record.set_session_id(None);
                changed += 1;
            }
        }
        if changed > 0 {
            self.write_array(key, &records)?;
        }
        Ok(changed)
    }

    /// Delete every result recorded during a session. Returns the count.
    pub fn delete_results_for_session(&mut self, session_id: &str) -> Result<usize, StoreError> {
        let mut total = 0;
        let removed =
            self.retain_results::<ActiveTestResult>(|r| r.session_id() != Some(session_id))?;
        if removed > 0 {
            self.notify_cleared(TestType::Active);
        }
        total += removed;
        let removed =
            self.retain_results::<PassiveTestResult>(|r| r.session_id() != Some(session_id))?;
        if removed > 0 {
            self.notify_cleared(TestType::Passive);
        }
        total += removed;
        let removed =
            self.retain_results::<RegularityTestResult>(|r| r.session_id() != Some(session_id))?;
        if removed > 0 {
            self.notify_cleared(TestType::Regularity);
        }
        total += removed;
        Ok(total)
    }

    /// Keep a session's results but unlink them (`sessionId` becomes null)
    pub fn detach_session(&mut self, session_id: &str) -> Result<usize, StoreError> {
        Ok(self.rewrite_session::<ActiveTestResult>(session_id)?
            + self.rewrite_session::<PassiveTestResult>(session_id)?
            + self.rewrite_session::<RegularityTestResult>(session_id)?)
    }

    /// All saved sessions, in save order
    pub fn sessions(&self) -> Result<Vec<Session>, StoreError> {
        self.read_array(SESSIONS_KEY)
    }

    pub fn session_by_id(&self, id: &str) -> Result<Option<Session>, StoreError> {
        Ok(self.sessions()?.into_iter().find(|s| s.id == id))
    }

    /// Insert, or replace the session with the same id
    pub fn save_session(&mut self, session: &Session) -> Result<(), StoreError> {
        let mut sessions = self.sessions()?;
        match sessions.iter_mut().find(|s| s.id == session.id) {
            Some(existing) => *existing = session.clone(),
            None => sessions.push(session.clone()),
        }
        self.write_array(SESSIONS_KEY, &sessions)?;
        log::info!("Saved session '{}'", session.name);
        Ok(())
    }

    /// Delete a session. Its results are deleted when `delete_results` is
    /// set, otherwise they are kept and detached.
    pub fn delete_session(&mut self, id: &str, delete_results: bool) -> Result<(), StoreError> {
        let mut sessions = self.sessions()?;
        let before = sessions.len();
        sessions.retain(|s| s.id != id);
        if sessions.len() == before {
            return Err(StoreError::NotFound(id.to_string()));
        }

        // Session stays listed until its results are rewritten
        let affected = if delete_results {
            self.delete_results_for_session(id)?
        } else {
            self.detach_session(id)?
        };
        self.write_array(SESSIONS_KEY, &sessions)?;
        log::info!(
            "Deleted session {} ({} results {})",
            id,
            affected,
            if delete_results { "deleted" } else { "detached" }
        );
        Ok(())
    }
}
