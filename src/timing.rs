//! Timing source: wall-clock capture, fire-once exposure timer and the
//! "get ready" countdown.
//!
//! Nothing here blocks or spawns. The host loop polls timers with the
//! current time on every frame, so a cancelled timer can never fire late.

use std::cell::Cell;
use std::rc::Rc;

/// Millisecond wall-clock source
pub trait Clock {
    /// Current time as epoch milliseconds
    fn now_ms(&self) -> u64;
}

/// Clock backed by the system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        chrono::Utc::now().timestamp_millis().max(0) as u64
    }
}

/// Manually driven clock. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    pub fn set(&self, ms: u64) {
        self.now.set(ms);
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

/// Fire-once delayed callback, expressed as a polled deadline.
#[derive(Debug, Clone, Default)]
pub struct ExposureTimer {
    deadline: Option<u64>,
}

impl ExposureTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the timer. Re-scheduling replaces any pending deadline.
    pub fn schedule(&mut self, now_ms: u64, duration_ms: u64) {
        self.deadline = Some(now_ms.saturating_add(duration_ms));
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Milliseconds until the deadline, if armed
    pub fn remaining_ms(&self, now_ms: u64) -> Option<u64> {
        self.deadline.map(|d| d.saturating_sub(now_ms))
    }

    /// Returns true exactly once, when the deadline has been reached.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        match self.deadline {
            Some(deadline) if now_ms >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Non-interactive countdown shown before a test begins.
#[derive(Debug, Clone)]
pub struct Countdown {
    seconds: u32,
    started_at: Option<u64>,
    finished: bool,
}

impl Countdown {
    pub fn new(seconds: u32) -> Self {
        Self {
            seconds,
            started_at: None,
            finished: false,
        }
    }

    pub fn start(&mut self, now_ms: u64) {
        self.started_at = Some(now_ms);
        self.finished = false;
    }

    pub fn cancel(&mut self) {
        self.started_at = None;
        self.finished = false;
    }

    /// True while the overlay is showing
    pub fn is_active(&self) -> bool {
        self.started_at.is_some() && !self.finished
    }

    /// Number currently displayed (seconds..=1)
    pub fn remaining(&self, now_ms: u64) -> u32 {
        match self.started_at {
            Some(start) if !self.finished => {
                let elapsed_secs = (now_ms.saturating_sub(start) / 1000) as u32;
                self.seconds.saturating_sub(elapsed_secs)
            }
            _ => 0,
        }
    }

    /// Returns true once, on the tick where the countdown reaches zero.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        if !self.is_active() {
            return false;
        }
        if self.remaining(now_ms) == 0 {
            self.finished = true;
            self.started_at = None;
            return true;
        }
        false
    }
}
