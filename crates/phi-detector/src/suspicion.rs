#![forbid(unsafe_code)]

use core::f64::consts::SQRT_2;

use phi_core::PROBABILITY_FLOOR;

use crate::estimator::Estimate;
use crate::window::SampleWindow;

/// Probability that the next heartbeat arrives later than `time_since_last`.
///
/// The deviation is scaled by the variance itself, not the standard
/// deviation. A zero variance yields 0 or 1 (or NaN at the mean exactly).
pub fn survival_probability(time_since_last: f64, mean: f64, variance: f64) -> f64 {
    0.5 * libm::erfc((time_since_last - mean) / variance * SQRT_2)
}

/// `-log10(p)`, with `p` raised to the floor first. NaN counts as below the floor.
pub fn phi_from_probability(p: f64) -> f64 {
    let p = if p > PROBABILITY_FLOOR { p } else { PROBABILITY_FLOOR };
    -libm::log10(p)
}

/// Strict comparison: phi equal to the threshold does not trigger.
pub fn exceeds_threshold(phi: f64, threshold: f64) -> bool {
    phi > threshold
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Suspicion {
    pub phi: f64,
    /// Survival probability after flooring.
    pub survival_prob: f64,
    pub time_since_last: f64,
}

impl Suspicion {
    pub fn evaluate(window: &SampleWindow, estimate: &Estimate, now: f64) -> Self {
        let time_since_last = now - window.latest_heartbeat_time();
        let raw = survival_probability(time_since_last, estimate.mean, estimate.variance);
        let survival_prob = if raw > PROBABILITY_FLOOR { raw } else { PROBABILITY_FLOOR };
        Self {
            phi: phi_from_probability(survival_prob),
            survival_prob,
            time_since_last,
        }
    }
}
