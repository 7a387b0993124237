//! Descriptive statistics over millisecond samples
//!
//! Callers guard against empty input; calling these on an empty slice is a
//! programming error and panics.

/// Arithmetic mean. Requires at least one sample.
pub fn mean(xs: &[f64]) -> f64 {
    assert!(!xs.is_empty(), "mean of an empty series");
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Population standard deviation (divisor N). Requires at least two samples.
pub fn stddev_population(xs: &[f64]) -> f64 {
    assert!(xs.len() >= 2, "standard deviation needs at least two samples");
    let m = mean(xs);
    let variance = xs
        .iter()
        .map(|&x| {
            let diff = x - m;
            diff * diff
        })
        .sum::<f64>()
        / xs.len() as f64;
    variance.sqrt()
}

pub fn abs_difference(a: f64, b: f64) -> f64 {
    (a - b).abs()
}

/// Consecutive differences `xs[i+1] - xs[i]`
pub fn intervals(timestamps: &[u64]) -> Vec<f64> {
    timestamps
        .windows(2)
        .map(|w| w[1].saturating_sub(w[0]) as f64)
        .collect()
}

/// Percentage accuracy of a reproduction, floored at zero and rounded
pub fn accuracy_percent(target: f64, actual: f64) -> f64 {
    if target <= 0.0 {
        return 0.0;
    }
    let error = abs_difference(actual, target);
    (100.0 - error / target * 100.0).max(0.0).round()
}

/// Interval summary of a tap series, in seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntervalSummary {
    pub avg_interval_secs: f64,
    pub std_dev_interval_secs: f64,
}

/// Summarise a tap series. Requires at least two taps, i.e. one interval;
/// a single interval has zero spread.
pub fn summarize_taps(timestamps: &[u64]) -> IntervalSummary {
    assert!(timestamps.len() >= 2, "need at least two taps");
    let intervals = intervals(timestamps);
    let avg = mean(&intervals);
    let std_dev = if intervals.len() >= 2 {
        stddev_population(&intervals)
    } else {
        0.0
    };
    IntervalSummary {
        avg_interval_secs: avg / 1000.0,
        std_dev_interval_secs: std_dev / 1000.0,
    }
}
