#![forbid(unsafe_code)]

use spin::Mutex;

use phi_hal::TelemetrySink;

use crate::controller::PhiDetector;
use crate::estimator::Estimate;

/// One detector behind a lock, so a peer sees at most one observation or
/// decision in flight. Detectors for different peers need no coordination.
pub struct SharedDetector<S: TelemetrySink> {
    inner: Mutex<PhiDetector<S>>,
}

impl<S: TelemetrySink> SharedDetector<S> {
    pub fn new(detector: PhiDetector<S>) -> Self {
        Self { inner: Mutex::new(detector) }
    }

    pub fn observe_loss(&self, missed: u32, now: f64) -> Estimate {
        self.inner.lock().observe_loss(missed, now)
    }

    pub fn decide(&self, now: f64, force_send: bool) -> bool {
        self.inner.lock().decide(now, force_send)
    }

    pub fn phi_at(&self, now: f64) -> Option<f64> {
        self.inner.lock().phi_at(now)
    }

    /// Run `f` with exclusive access.
    pub fn with<R>(&self, f: impl FnOnce(&mut PhiDetector<S>) -> R) -> R {
        let mut guard = self.inner.lock();
        f(&mut *guard)
    }

    pub fn into_inner(self) -> PhiDetector<S> {
        self.inner.into_inner()
    }
}
