#![forbid(unsafe_code)]

use log::trace;

use phi_core::{DetectorConfig, PhiResult};
use phi_hal::{Telemetry, TelemetryEvent, TelemetrySink};

use crate::estimator::{Estimate, Estimator};
use crate::suspicion::{exceeds_threshold, Suspicion};
use crate::window::SampleWindow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorState {
    /// No heartbeat recorded yet; the next decision only sets the baseline.
    Uninitialized,
    Tracking,
}

/// Adaptive heartbeat scheduler for a single peer.
///
/// Callers serialize access: one `observe_loss` or `decide` at a time.
/// Wrap in [`crate::SharedDetector`] to share across threads.
pub struct PhiDetector<S: TelemetrySink> {
    config: DetectorConfig,
    state: DetectorState,
    window: SampleWindow,
    estimator: Estimator,
    sink: S,
    defaults_dumped: bool,
}

impl<S: TelemetrySink> PhiDetector<S> {
    pub fn new(config: DetectorConfig, sink: S) -> PhiResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: DetectorState::Uninitialized,
            window: SampleWindow::new(config.window_size),
            estimator: Estimator::new(&config),
            sink,
            defaults_dumped: false,
        })
    }

    /// A loss report arrived: record it and refit the interval statistics.
    pub fn observe_loss(&mut self, missed: u32, now: f64) -> Estimate {
        let est = self.estimator.observe_loss(&mut self.window, missed, now);
        self.sink.emit(Telemetry {
            at: now,
            event: TelemetryEvent::Estimate {
                mean: est.mean,
                variance: est.variance,
                lost_rate: est.lost_rate,
                consecutive_zeros: est.consecutive_zeros,
            },
        });
        est
    }

    /// Should a heartbeat go out at `now`? `true` means send.
    pub fn decide(&mut self, now: f64, force_send: bool) -> bool {
        if force_send && !self.defaults_dumped {
            self.defaults_dumped = true;
            self.sink.emit(Telemetry {
                at: now,
                event: TelemetryEvent::Defaults {
                    phi_threshold: self.config.phi_threshold,
                    window_size: self.config.window_size,
                    increase_factor: self.config.increase_factor,
                },
            });
        }

        if self.state == DetectorState::Uninitialized {
            self.window.stamp_heartbeat(now);
            self.state = DetectorState::Tracking;
            trace!("baseline heartbeat at {:.6}, tracking", now);
            return false;
        }

        let est = self.estimator.estimate();
        let suspicion = Suspicion::evaluate(&self.window, &est, now);
        self.sink.emit(Telemetry {
            at: now,
            event: TelemetryEvent::Suspicion {
                phi: suspicion.phi,
                survival_prob: suspicion.survival_prob,
                mean: est.mean,
                variance: est.variance,
            },
        });

        let sent = exceeds_threshold(suspicion.phi, self.config.phi_threshold) || force_send;
        if sent {
            let time_diff = now - self.window.latest_heartbeat_time();
            let mean = self.estimator.record_send(time_diff);
            self.window.advance_heartbeat(now);
            trace!("sent at {:.6}, mean now {:.6}", now, mean);
        }
        self.sink.emit(Telemetry {
            at: now,
            event: TelemetryEvent::Decision { sent, phi: suspicion.phi },
        });
        sent
    }

    /// Phi at `now` without recording anything. `None` before the baseline.
    pub fn phi_at(&self, now: f64) -> Option<f64> {
        match self.state {
            DetectorState::Uninitialized => None,
            DetectorState::Tracking => {
                let est = self.estimator.estimate();
                Some(Suspicion::evaluate(&self.window, &est, now).phi)
            }
        }
    }

    /// True until phi would cross the threshold at `now`.
    pub fn is_available(&self, now: f64) -> bool {
        match self.phi_at(now) {
            None => true,
            Some(phi) => !exceeds_threshold(phi, self.config.phi_threshold),
        }
    }

    pub fn state(&self) -> DetectorState {
        self.state
    }

    pub fn estimate(&self) -> Estimate {
        self.estimator.estimate()
    }

    pub fn window(&self) -> &SampleWindow {
        &self.window
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}
