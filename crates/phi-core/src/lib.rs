#![no_std]
#[cfg(feature = "std")]
extern crate std;

/// Phi above which the peer is suspected and a heartbeat goes out.
pub const PHI_THRESHOLD: f64 = 4.0;
/// Samples kept in each rolling window.
pub const WINDOW_SIZE: usize = 10;
/// Heartbeat interval before any sample arrives (seconds).
pub const INITIAL_HEARTBEAT_INTERVAL: f64 = 1.0;
pub const MIN_HEARTBEAT_INTERVAL: f64 = 0.1;
pub const MAX_HEARTBEAT_INTERVAL: f64 = 1.0;
/// Growth per consecutive loss-free observation.
pub const INCREASE_FACTOR: f64 = 0.1;
pub const MAX_VARIANCE: f64 = 1.0;
pub const INITIAL_VARIANCE: f64 = 0.1;

/// Lower bound on the survival probability, keeps phi finite (max 7.0).
pub const PROBABILITY_FLOOR: f64 = 1e-7;
/// The loss-free streak stops growing the increase factor past this.
pub const ZERO_STREAK_CAP: f64 = 10.0;

/// Construction-time parameters of one detector. Immutable once validated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorConfig {
    pub phi_threshold: f64,
    pub window_size: usize,
    pub initial_interval: f64,
    pub min_interval: f64,
    pub max_interval: f64,
    pub increase_factor: f64,
    pub max_variance: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            phi_threshold: PHI_THRESHOLD,
            window_size: WINDOW_SIZE,
            initial_interval: INITIAL_HEARTBEAT_INTERVAL,
            min_interval: MIN_HEARTBEAT_INTERVAL,
            max_interval: MAX_HEARTBEAT_INTERVAL,
            increase_factor: INCREASE_FACTOR,
            max_variance: MAX_VARIANCE,
        }
    }
}

impl DetectorConfig {
    pub fn validate(&self) -> PhiResult<()> {
        // Interval statistics need at least one difference.
        if self.window_size < 2 {
            return Err(PhiError::WindowTooSmall(self.window_size));
        }
        if !self.phi_threshold.is_finite() || self.phi_threshold <= 0.0 {
            return Err(PhiError::InvalidThreshold);
        }
        if !self.min_interval.is_finite() || self.min_interval <= 0.0 {
            return Err(PhiError::InvalidInterval);
        }
        if !self.max_interval.is_finite() || self.max_interval < self.min_interval {
            return Err(PhiError::InvalidInterval);
        }
        if !self.initial_interval.is_finite() || self.initial_interval <= 0.0 {
            return Err(PhiError::InvalidInterval);
        }
        if !self.increase_factor.is_finite() || self.increase_factor < 0.0 {
            return Err(PhiError::InvalidIncreaseFactor);
        }
        if !self.max_variance.is_finite() || self.max_variance < 0.0 {
            return Err(PhiError::InvalidVariance);
        }
        Ok(())
    }
}

pub type PhiResult<T> = Result<T, PhiError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhiError {
    WindowTooSmall(usize),
    InvalidThreshold,
    InvalidInterval,
    InvalidIncreaseFactor,
    InvalidVariance,
}

impl core::fmt::Display for PhiError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PhiError::WindowTooSmall(n) => write!(f, "window size {} is below the minimum of 2", n),
            PhiError::InvalidThreshold => write!(f, "phi threshold must be finite and positive"),
            PhiError::InvalidInterval => {
                write!(f, "heartbeat intervals must be positive with min <= max")
            }
            PhiError::InvalidIncreaseFactor => write!(f, "increase factor must be finite and >= 0"),
            PhiError::InvalidVariance => write!(f, "max variance must be finite and >= 0"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PhiError {}
