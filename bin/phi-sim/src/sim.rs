use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use log::debug;
use phi_detector::PhiDetector;
use phi_hal::{MonotonicClock, Telemetry, TelemetryEvent, TelemetrySink};
use phi_std::{ManualClock, StdClock};
use rand::Rng;

/// Where time comes from: real sleeps, or a clock we push forward ourselves.
pub enum Timeline {
    Real(StdClock),
    Virtual(ManualClock),
}

impl Timeline {
    pub fn real() -> Self { Timeline::Real(StdClock::new()) }
    pub fn virtual_from(start: f64) -> Self { Timeline::Virtual(ManualClock::new(start)) }

    pub fn now(&self) -> f64 {
        match self {
            Timeline::Real(c) => c.now_secs(),
            Timeline::Virtual(c) => c.now_secs(),
        }
    }

    pub fn pause(&self, d: Duration) {
        match self {
            Timeline::Real(_) => std::thread::sleep(d),
            Timeline::Virtual(c) => c.advance(d.as_secs_f64()),
        }
    }
}

pub struct Scenario {
    pub iterations: u64,
    pub max_sleep_ms: u64,
    pub loss_every: u64,
    pub max_missed: u32,
}

#[derive(Debug, Default)]
pub struct Summary {
    pub iterations: u64,
    pub sent: u64,
    pub suppressed: u64,
    pub missed: u64,
    pub interrupted: bool,
}

impl Scenario {
    /// The messaging loop: decide every iteration; after each sent heartbeat
    /// the peer's acknowledgement reports how many messages it missed.
    pub fn run<S: TelemetrySink, R: Rng>(
        &self,
        detector: &mut PhiDetector<S>,
        timeline: &Timeline,
        mut rng: R,
        running: &AtomicBool,
    ) -> Summary {
        let mut summary = Summary::default();

        // Opening heartbeat; on a fresh detector this only sets the baseline.
        if detector.decide(timeline.now(), true) {
            summary.sent += 1;
        }

        let mut awaiting_ack = false;
        for i in 0..self.iterations {
            if !running.load(Ordering::SeqCst) {
                summary.interrupted = true;
                break;
            }
            let now = timeline.now();

            if awaiting_ack {
                let missed = if self.loss_every > 0 && i % self.loss_every == 0 {
                    rng.gen_range(0..=self.max_missed)
                } else {
                    0
                };
                detector.sink_mut().emit(Telemetry {
                    at: now,
                    event: TelemetryEvent::MissedCount { count: missed },
                });
                detector.observe_loss(missed, now);
                summary.missed += missed as u64;
                awaiting_ack = false;
            }

            if detector.decide(now, false) {
                summary.sent += 1;
                awaiting_ack = true;
            } else {
                summary.suppressed += 1;
            }
            summary.iterations += 1;

            let pause = rng.gen_range(0..=self.max_sleep_ms);
            timeline.pause(Duration::from_millis(pause));
        }

        // Farewell heartbeat so the peer sees our last activity.
        if detector.decide(timeline.now(), true) {
            summary.sent += 1;
        }
        debug!("simulation finished: {:?}", summary);
        summary
    }
}
