//! Persisted result records for each test type
//!
//! Field names follow the JSON stored under each storage key. Older, narrower
//! record shapes still load: missing optional fields default and unknown
//! fields (`accuracy`, a legacy regularity `id`) are ignored.

use chrono::{DateTime, Local, SecondsFormat, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// The three timing tests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestType {
    Active,
    Passive,
    Regularity,
}

impl TestType {
    pub fn all() -> &'static [TestType] {
        &[TestType::Active, TestType::Passive, TestType::Regularity]
    }

    /// Key of the JSON array holding this type's results
    pub fn storage_key(self) -> &'static str {
        match self {
            TestType::Active => "activeTestResults",
            TestType::Passive => "passiveTestResults",
            TestType::Regularity => "regularityTestResults",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TestType::Active => "Active Test",
            TestType::Passive => "Passive Test",
            TestType::Regularity => "Regularity Test",
        }
    }

    /// Lowercase tag, as used in storage and exports
    pub fn tag(self) -> &'static str {
        match self {
            TestType::Active => "active",
            TestType::Passive => "passive",
            TestType::Regularity => "regularity",
        }
    }
}

/// Fresh unique record identifier
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// ISO-8601 UTC timestamp with millisecond precision (`...T..:..:..sssZ`)
pub fn iso_from_ms(ms: u64) -> String {
    utc_from_ms(ms).to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn utc_from_ms(ms: u64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms as i64)
        .single()
        .unwrap_or_default()
}

/// Epoch ms of an ISO timestamp, if it parses
pub fn ms_from_iso(iso: &str) -> Option<u64> {
    DateTime::parse_from_rfc3339(iso)
        .ok()
        .map(|dt| dt.timestamp_millis().max(0) as u64)
}

/// Local-time `(day, time)` pair for display and export
pub fn local_day_time(ms: u64) -> (String, String) {
    let local = utc_from_ms(ms).with_timezone(&Local);
    (
        local.format("%-m/%-d/%Y").to_string(),
        local.format("%-I:%M:%S %p").to_string(),
    )
}

/// Behaviour shared by all stored result records
pub trait ResultRecord: Serialize + DeserializeOwned + Clone + std::fmt::Debug {
    const TEST_TYPE: TestType;

    /// Identity used for delete and note edits
    fn record_key(&self) -> &str;

    /// Creation time in epoch ms, used for newest-first ordering
    fn recorded_at_ms(&self) -> u64;

    fn notes(&self) -> &str;

    fn set_notes(&mut self, notes: String);

    fn session_id(&self) -> Option<&str>;

    fn set_session_id(&mut self, session_id: Option<String>);
}

/// Active (hold-duration reproduction) test result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveTestResult {
    pub id: String,
    pub timestamp: u64,
    /// Target exposure, ms
    pub target_duration: f64,
    /// Measured hold, ms
    pub user_duration: f64,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
}

impl ResultRecord for ActiveTestResult {
    const TEST_TYPE: TestType = TestType::Active;

    fn record_key(&self) -> &str {
        &self.id
    }

    fn recorded_at_ms(&self) -> u64 {
        self.timestamp
    }

    fn notes(&self) -> &str {
        &self.notes
    }

    fn set_notes(&mut self, notes: String) {
        self.notes = notes;
    }

    fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    fn set_session_id(&mut self, session_id: Option<String>) {
        self.session_id = session_id;
    }
}

/// Passive (duration estimation) test result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassiveTestResult {
    pub id: String,
    pub timestamp: u64,
    /// Target exposure, ms
    pub target_exposure: f64,
    /// User's estimate, ms
    pub user_input: f64,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
}

impl ResultRecord for PassiveTestResult {
    const TEST_TYPE: TestType = TestType::Passive;

    fn record_key(&self) -> &str {
        &self.id
    }

    fn recorded_at_ms(&self) -> u64 {
        self.timestamp
    }

    fn notes(&self) -> &str {
        &self.notes
    }

    fn set_notes(&mut self, notes: String) {
        self.notes = notes;
    }

    fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    fn set_session_id(&mut self, session_id: Option<String>) {
        self.session_id = session_id;
    }
}

/// Regularity (rhythmic tapping) test result, keyed by `date`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegularityTestResult {
    /// Mean tap interval, seconds
    pub avg_interval: f64,
    /// Population standard deviation of tap intervals, seconds
    pub std_dev_interval: f64,
    /// ISO timestamp; unique key
    pub date: String,
    /// Tap offsets in ms relative to the first tap
    #[serde(default)]
    pub tap_timestamps: Vec<u64>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

impl ResultRecord for RegularityTestResult {
    const TEST_TYPE: TestType = TestType::Regularity;

    fn record_key(&self) -> &str {
        &self.date
    }

    fn recorded_at_ms(&self) -> u64 {
        ms_from_iso(&self.date).unwrap_or(0)
    }

    fn notes(&self) -> &str {
        &self.notes
    }

    fn set_notes(&mut self, notes: String) {
        self.notes = notes;
    }

    fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    fn set_session_id(&mut self, session_id: Option<String>) {
        self.session_id = session_id;
    }
}

/// A completed test's record, ready to persist
#[derive(Debug, Clone, PartialEq)]
pub enum TestRecord {
    Active(ActiveTestResult),
    Passive(PassiveTestResult),
    Regularity(RegularityTestResult),
}

impl TestRecord {
    pub fn test_type(&self) -> TestType {
        match self {
            TestRecord::Active(_) => TestType::Active,
            TestRecord::Passive(_) => TestType::Passive,
            TestRecord::Regularity(_) => TestType::Regularity,
        }
    }

    pub fn session_id(&self) -> Option<&str> {
        match self {
            TestRecord::Active(r) => r.session_id(),
            TestRecord::Passive(r) => r.session_id(),
            TestRecord::Regularity(r) => r.session_id(),
        }
    }
}
