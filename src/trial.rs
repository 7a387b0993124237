//! Randomised trial generation for the exposure-based tests

use crate::config::TrialConfig;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Decorative glyphs shown during exposure
pub const STIMULI: [&str; 12] = [
    "🌙", "🌑", "🌓", "🌕", "🌠", "⭐", "🌟", "🪐", "🚀", "🛸", "🌌", "☄️",
];

/// One generated trial
#[derive(Debug, Clone, PartialEq)]
pub struct Trial {
    /// Exposure duration in milliseconds
    pub target_duration_ms: u64,
    /// Cosmetic glyph carried into the result record
    pub stimulus: &'static str,
}

/// Produces trials with a target duration drawn uniformly, in tenths of a
/// second, from `[min_secs, max_secs]`.
#[derive(Debug, Clone)]
pub struct TrialGenerator {
    rng: StdRng,
    min_tenths: u64,
    max_tenths: u64,
}

impl TrialGenerator {
    pub fn new(config: &TrialConfig) -> Self {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// Deterministic generator for tests
    pub fn seeded(config: &TrialConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: &TrialConfig, rng: StdRng) -> Self {
        let to_tenths = |secs: f64| (secs.max(0.1) * 10.0).round() as u64;
        let (a, b) = (to_tenths(config.min_secs), to_tenths(config.max_secs));
        Self {
            rng,
            min_tenths: a.min(b),
            max_tenths: a.max(b),
        }
    }

    pub fn next_trial(&mut self) -> Trial {
        let tenths = self.rng.random_range(self.min_tenths..=self.max_tenths);
        let stimulus = STIMULI[self.rng.random_range(0..STIMULI.len())];
        Trial {
            target_duration_ms: tenths * 100,
            stimulus,
        }
    }

    /// Inclusive range of possible target durations in ms
    pub fn range_ms(&self) -> (u64, u64) {
        (self.min_tenths * 100, self.max_tenths * 100)
    }
}
