//! Results browser: stored results of one test type, with selection

use crate::records::{
    ActiveTestResult, PassiveTestResult, RegularityTestResult, ResultRecord, TestRecord, TestType,
};
use crate::stats::accuracy_percent;
use crate::store::{ResultStore, StoreError, Subscription};
use std::cell::Cell;
use std::rc::Rc;

/// One listed result
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    /// `id`, or `date` for regularity results
    pub key: String,
    pub recorded_at_ms: u64,
    pub summary: String,
    pub notes: String,
    pub session_id: Option<String>,
}

impl ResultRow {
    pub fn from_record(record: &TestRecord) -> Self {
        match record {
            TestRecord::Active(r) => Self::of(r, record_summary(record)),
            TestRecord::Passive(r) => Self::of(r, record_summary(record)),
            TestRecord::Regularity(r) => Self::of(r, record_summary(record)),
        }
    }

    fn of<R: ResultRecord>(record: &R, summary: String) -> Self {
        Self {
            key: record.record_key().to_string(),
            recorded_at_ms: record.recorded_at_ms(),
            summary,
            notes: record.notes().to_string(),
            session_id: record.session_id().map(String::from),
        }
    }
}

/// One-line description of a record's outcome
pub fn record_summary(record: &TestRecord) -> String {
    match record {
        TestRecord::Active(r) => format!(
            "target {:.0} ms, held {:.0} ms ({}%)",
            r.target_duration,
            r.user_duration,
            accuracy_percent(r.target_duration, r.user_duration)
        ),
        TestRecord::Passive(r) => format!(
            "target {:.0} ms, estimate {:.0} ms ({}%)",
            r.target_exposure,
            r.user_input,
            accuracy_percent(r.target_exposure, r.user_input)
        ),
        TestRecord::Regularity(r) => format!(
            "avg {:.2} s, sd {:.2} s",
            r.avg_interval, r.std_dev_interval
        ),
    }
}

fn load_rows(store: &ResultStore, test_type: TestType) -> Result<Vec<ResultRow>, StoreError> {
    let records: Vec<TestRecord> = match test_type {
        TestType::Active => store
            .load::<ActiveTestResult>()?
            .into_iter()
            .map(TestRecord::Active)
            .collect(),
        TestType::Passive => store
            .load::<PassiveTestResult>()?
            .into_iter()
            .map(TestRecord::Passive)
            .collect(),
        TestType::Regularity => store
            .load::<RegularityTestResult>()?
            .into_iter()
            .map(TestRecord::Regularity)
            .collect(),
    };
    Ok(records.iter().map(ResultRow::from_record).collect())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowserMode {
    Browse,
    /// Notes being edited for the selected row
    EditingNotes(String),
    ConfirmClear,
}

pub struct ResultsBrowser {
    pub test_type: TestType,
    pub rows: Vec<ResultRow>,
    pub selected: usize,
    pub mode: BrowserMode,
    dirty: Rc<Cell<bool>>,
    subscriptions: Vec<Subscription>,
}

impl ResultsBrowser {
    pub fn new() -> Self {
        Self {
            test_type: TestType::Active,
            rows: Vec::new(),
            selected: 0,
            mode: BrowserMode::Browse,
            dirty: Rc::new(Cell::new(true)),
            subscriptions: Vec::new(),
        }
    }

    /// Watch for out-of-band deletions while the browser is visible
    pub fn subscribe(&mut self, store: &mut ResultStore) {
        self.unsubscribe(store);
        for &test_type in TestType::all() {
            let dirty = self.dirty.clone();
            let sub = store.on_results_cleared(test_type, move |_| dirty.set(true));
            self.subscriptions.push(sub);
        }
    }

    pub fn unsubscribe(&mut self, store: &mut ResultStore) {
        for sub in self.subscriptions.drain(..) {
            store.unsubscribe(sub);
        }
    }

    pub fn is_subscribed(&self) -> bool {
        !self.subscriptions.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    pub fn mark_dirty(&self) {
        self.dirty.set(true);
    }

    /// Reload rows for the current test type
    pub fn refresh(&mut self, store: &ResultStore) -> Result<(), StoreError> {
        self.rows = load_rows(store, self.test_type)?;
        if self.selected >= self.rows.len() {
            self.selected = self.rows.len().saturating_sub(1);
        }
        self.dirty.set(false);
        Ok(())
    }

    pub fn next_type(&mut self) {
        let all = TestType::all();
        let index = all.iter().position(|t| *t == self.test_type).unwrap_or(0);
        self.set_type(all[(index + 1) % all.len()]);
    }

    pub fn prev_type(&mut self) {
        let all = TestType::all();
        let index = all.iter().position(|t| *t == self.test_type).unwrap_or(0);
        self.set_type(all[(index + all.len() - 1) % all.len()]);
    }

    fn set_type(&mut self, test_type: TestType) {
        self.test_type = test_type;
        self.selected = 0;
        self.mode = BrowserMode::Browse;
        self.mark_dirty();
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.rows.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn selected_row(&self) -> Option<&ResultRow> {
        self.rows.get(self.selected)
    }

    /// Delete the selected record. Returns false when nothing is selected.
    pub fn delete_selected(&mut self, store: &mut ResultStore) -> Result<bool, StoreError> {
        let Some(key) = self.selected_row().map(|r| r.key.clone()) else {
            return Ok(false);
        };
        match self.test_type {
            TestType::Active => store.delete::<ActiveTestResult>(&key)?,
            TestType::Passive => store.delete::<PassiveTestResult>(&key)?,
            TestType::Regularity => store.delete::<RegularityTestResult>(&key)?,
        }
        self.refresh(store)?;
        Ok(true)
    }

    /// Begin editing the selected row's notes
    pub fn begin_notes(&mut self) -> bool {
        match self.selected_row().map(|r| r.notes.clone()) {
            Some(notes) => {
                self.mode = BrowserMode::EditingNotes(notes);
                true
            }
            None => false,
        }
    }

    pub fn notes_buffer_mut(&mut self) -> Option<&mut String> {
        match &mut self.mode {
            BrowserMode::EditingNotes(buffer) => Some(buffer),
            _ => None,
        }
    }

    /// Persist the notes being edited. The edit stays open on failure.
    pub fn commit_notes(&mut self, store: &mut ResultStore) -> Result<(), StoreError> {
        let BrowserMode::EditingNotes(notes) = &self.mode else {
            return Ok(());
        };
        let Some(key) = self.selected_row().map(|r| r.key.clone()) else {
            self.mode = BrowserMode::Browse;
            return Ok(());
        };
        let notes = notes.clone();
        match self.test_type {
            TestType::Active => store.update_notes::<ActiveTestResult>(&key, &notes)?,
            TestType::Passive => store.update_notes::<PassiveTestResult>(&key, &notes)?,
            TestType::Regularity => store.update_notes::<RegularityTestResult>(&key, &notes)?,
        }
        self.mode = BrowserMode::Browse;
        self.refresh(store)
    }
}

impl Default for ResultsBrowser {
    fn default() -> Self {
        Self::new()
    }
}
