#![forbid(unsafe_code)]

use phi_core::{DetectorConfig, INITIAL_VARIANCE, ZERO_STREAK_CAP};

use crate::window::SampleWindow;

/// Current fit of the inter-arrival distribution plus loss bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    /// Target heartbeat interval (seconds).
    pub mean: f64,
    pub variance: f64,
    /// Average of the loss window as of the last observation.
    pub lost_rate: f64,
    pub consecutive_zeros: f64,
}

/// Rolling mean/variance of heartbeat intervals, adapted by observed loss.
#[derive(Debug, Clone)]
pub struct Estimator {
    min_interval: f64,
    max_interval: f64,
    max_variance: f64,
    increase_factor: f64,
    estimate: Estimate,
}

impl Estimator {
    pub fn new(config: &DetectorConfig) -> Self {
        Self {
            min_interval: config.min_interval,
            max_interval: config.max_interval,
            max_variance: config.max_variance,
            increase_factor: config.increase_factor,
            estimate: Estimate {
                mean: config.initial_interval,
                variance: INITIAL_VARIANCE,
                lost_rate: 0.0,
                consecutive_zeros: 0.0,
            },
        }
    }

    pub fn estimate(&self) -> Estimate {
        self.estimate
    }

    /// Record a loss report at `now` and refit.
    ///
    /// Any input is accepted; out-of-order timestamps simply produce
    /// negative intervals.
    pub fn observe_loss(&mut self, window: &mut SampleWindow, missed: u32, now: f64) -> Estimate {
        window.record_heartbeat_time(now);
        window.record_loss_count(missed);

        let size = window.capacity() as f64;
        let lost_rate = window.loss_sum() as f64 / size;

        let n = size - 1.0;
        let raw_mean = window.intervals().sum::<f64>() / n;
        let raw_variance = window
            .intervals()
            .map(|d| (d - raw_mean) * (d - raw_mean))
            .sum::<f64>()
            / n;
        let variance = raw_variance.max(0.0).min(self.max_variance);

        let spread = 1.0 + libm::sqrt(variance);
        let adapted = if lost_rate > 0.0 {
            (raw_mean * (1.0 - lost_rate) * spread).max(self.min_interval)
        } else {
            let streak = self.estimate.consecutive_zeros.min(ZERO_STREAK_CAP);
            let factor = 1.0 + self.increase_factor * streak;
            (raw_mean * factor / spread).min(self.max_interval)
        };
        // Each branch bounds one side only.
        let mean = adapted.max(self.min_interval).min(self.max_interval);

        let consecutive_zeros = if lost_rate == 0.0 {
            self.estimate.consecutive_zeros + 1.0
        } else {
            0.0
        };

        self.estimate = Estimate { mean, variance, lost_rate, consecutive_zeros };
        self.estimate
    }

    /// Mean update on a sent heartbeat: adds the squared residual of the
    /// elapsed time against the old mean. Unclamped.
    pub fn record_send(&mut self, time_diff: f64) -> f64 {
        let old = self.estimate.mean;
        let residual = time_diff - old;
        self.estimate.mean = old + residual * residual;
        self.estimate.mean
    }
}
