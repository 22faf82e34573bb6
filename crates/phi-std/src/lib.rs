use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use log::{debug, info, warn, Level};
use phi_hal::{MonotonicClock, Telemetry, TelemetryEvent, TelemetrySink};

/// Wall time since construction.
pub struct StdClock(Instant);
impl StdClock { pub fn new() -> Self { Self(Instant::now()) } }
impl Default for StdClock { fn default() -> Self { Self::new() } }
impl MonotonicClock for StdClock {
    fn now_secs(&self) -> f64 { self.0.elapsed().as_secs_f64() }
}

/// Caller-advanced clock for deterministic runs. Never goes backwards.
#[derive(Debug, Default)]
pub struct ManualClock {
    bits: AtomicU64,
}

impl ManualClock {
    pub fn new(start_secs: f64) -> Self {
        Self { bits: AtomicU64::new(start_secs.to_bits()) }
    }

    /// Negative or NaN steps are ignored.
    pub fn advance(&self, secs: f64) {
        if secs.is_nan() || secs <= 0.0 {
            return;
        }
        let mut cur = self.bits.load(Ordering::Acquire);
        loop {
            let next = (f64::from_bits(cur) + secs).to_bits();
            match self.bits.compare_exchange_weak(cur, next, Ordering::AcqRel, Ordering::Acquire) {
                Ok(_) => return,
                Err(actual) => cur = actual,
            }
        }
    }
}

impl MonotonicClock for ManualClock {
    fn now_secs(&self) -> f64 { f64::from_bits(self.bits.load(Ordering::Acquire)) }
}

/// Forwards telemetry to the `log` facade under target `phi`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl LogSink {
    pub const TARGET: &'static str = "phi";

    pub fn level_for(event: &TelemetryEvent) -> Level {
        match event {
            TelemetryEvent::Decision { .. } | TelemetryEvent::Defaults { .. } => Level::Info,
            TelemetryEvent::MissedCount { count } if *count > 0 => Level::Warn,
            TelemetryEvent::MissedCount { .. } => Level::Info,
            TelemetryEvent::Estimate { .. } | TelemetryEvent::Suspicion { .. } => Level::Debug,
        }
    }
}

impl TelemetrySink for LogSink {
    fn emit(&mut self, record: Telemetry) {
        match Self::level_for(&record.event) {
            Level::Warn => warn!(target: Self::TARGET, "{}", record),
            Level::Info => info!(target: Self::TARGET, "{}", record),
            _ => debug!(target: Self::TARGET, "{}", record),
        }
    }
}
