#![no_std]
#![forbid(unsafe_code)]

extern crate alloc;
use alloc::vec::Vec;
use core::fmt;

/// One telemetry line, stamped with the caller-supplied time it describes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Telemetry {
    pub at: f64,
    pub event: TelemetryEvent,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TelemetryEvent {
    /// Statistics after a loss observation.
    Estimate { mean: f64, variance: f64, lost_rate: f64, consecutive_zeros: f64 },
    /// Suspicion evaluated by a decision.
    Suspicion { phi: f64, survival_prob: f64, mean: f64, variance: f64 },
    Decision { sent: bool, phi: f64 },
    /// Active parameters, dumped once on the first forced send.
    Defaults { phi_threshold: f64, window_size: usize, increase_factor: f64 },
    MissedCount { count: u32 },
}

impl fmt::Display for TelemetryEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            TelemetryEvent::Estimate { mean, variance, lost_rate, consecutive_zeros } => write!(
                f,
                "mean={:.4} variance={:.4} lostRate={:.4} consecutiveZeros={:.4}",
                mean, variance, lost_rate, consecutive_zeros
            ),
            TelemetryEvent::Suspicion { phi, survival_prob, mean, variance } => write!(
                f,
                "phi={:.4} survivalProb={:.4} mean={:.4} variance={:.4}",
                phi, survival_prob, mean, variance
            ),
            TelemetryEvent::Decision { sent: true, phi } => write!(f, "heartbeat sent (phi={:.6})", phi),
            TelemetryEvent::Decision { sent: false, phi } => {
                write!(f, "heartbeat not sent (phi={:.6})", phi)
            }
            TelemetryEvent::Defaults { phi_threshold, window_size, increase_factor } => write!(
                f,
                "PHI_THRESHOLD={:.4} WINDOW_SIZE={} INCREASE_FACTOR={:.4}",
                phi_threshold, window_size, increase_factor
            ),
            TelemetryEvent::MissedCount { count } => write!(f, "missed count: {}", count),
        }
    }
}

impl fmt::Display for Telemetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.6}] {}", self.at, self.event)
    }
}

/// Receiver of the detector's telemetry stream.
/// INVARIANT: Must not block and cannot fail; the decision path never waits on it.
pub trait TelemetrySink {
    fn emit(&mut self, record: Telemetry);
}

/// Discards everything. Used when nobody is listening.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl TelemetrySink for NullSink {
    fn emit(&mut self, _record: Telemetry) {}
}

/// In-memory capture, mostly for tests.
impl TelemetrySink for Vec<Telemetry> {
    fn emit(&mut self, record: Telemetry) {
        self.push(record);
    }
}

impl<S: TelemetrySink + ?Sized> TelemetrySink for &mut S {
    fn emit(&mut self, record: Telemetry) {
        (**self).emit(record);
    }
}

/// Monotonic time source in seconds. The origin is implementation defined.
pub trait MonotonicClock: Send + Sync {
    fn now_secs(&self) -> f64;
}
