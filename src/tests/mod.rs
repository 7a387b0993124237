//! Timing test state machines


pub use active::{ActivePhase, ActiveTest};
pub use passive::{EstimateError, EstimateInput, PassivePhase, PassiveTest};
pub use regularity::{RegularityPhase, RegularityTest, TAP_COUNT};

use crate::input::InputEvent;
use crate::records::{TestRecord, TestType};

/// Common trait for all timing tests
pub trait TimingTest {
    /// Name of the test
    fn name(&self) -> &'static str;

    /// Short instructions
    fn description(&self) -> &'static str;

    fn test_type(&self) -> TestType;

    /// Enter the first interactive phase (after any countdown)
    fn start(&mut self, now_ms: u64);

    /// Whether `start` has been called since the last reset
    fn is_started(&self) -> bool;

    /// Advance timers. Returns true when the phase changed.
    fn tick(&mut self, now_ms: u64) -> bool;

    /// Process an input event. Returns the record when this event completed
    /// the test; the host persists it.
    fn process_event(&mut self, event: &InputEvent) -> Option<TestRecord>;

    /// Check if the test reached its result phase
    fn is_complete(&self) -> bool;

    /// Get test results as formatted rows
    fn get_results(&self) -> Vec<TestResult>;

    /// Clear all trial state
    fn reset(&mut self);

    /// Focus-loss hook: cancels pending timers and resets a finished test
    fn leave(&mut self);

    /// Session id injected into produced records
    fn set_session(&mut self, session_id: Option<String>);
}

/// A single display row
#[derive(Debug, Clone)]
pub struct TestResult {
    pub label: String,
    pub value: String,
    pub status: ResultStatus,
}

impl TestResult {
    pub fn new(label: impl Into<String>, value: impl Into<String>, status: ResultStatus) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            status,
        }
    }

    pub fn ok(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(label, value, ResultStatus::Ok)
    }

    pub fn warning(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(label, value, ResultStatus::Warning)
    }

    pub fn error(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(label, value, ResultStatus::Error)
    }

    pub fn info(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(label, value, ResultStatus::Info)
    }
}

/// Status of a result row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultStatus {
    Ok,
    Warning,
    Error,
    Info,
}

/// Status for a reproduction/estimate accuracy percentage
pub(crate) fn accuracy_status(accuracy: f64) -> ResultStatus {
    if accuracy >= 90.0 {
        ResultStatus::Ok
    } else if accuracy >= 70.0 {
        ResultStatus::Warning
    } else {
        ResultStatus::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_machines_are_idle() {
        let config = crate::config::Config::default();
        let machines: Vec<Box<dyn TimingTest>> = vec![
            Box::new(ActiveTest::new(&config.trial)),
            Box::new(PassiveTest::new(&config.trial, &config.passive)),
            Box::new(RegularityTest::new()),
        ];
        for (machine, &test_type) in machines.iter().zip(TestType::all()) {
            assert_eq!(machine.test_type(), test_type);
            assert!(!machine.is_started());
            assert!(!machine.is_complete());
        }
    }

    #[test]
    fn accuracy_status_thresholds() {
        assert_eq!(accuracy_status(95.0), ResultStatus::Ok);
        assert_eq!(accuracy_status(80.0), ResultStatus::Warning);
        assert_eq!(accuracy_status(10.0), ResultStatus::Error);
    }
}
