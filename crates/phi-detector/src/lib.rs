#![no_std]

extern crate alloc;

mod window;
mod estimator;
mod suspicion;
mod controller;
mod shared;

pub use window::SampleWindow;
pub use estimator::{Estimate, Estimator};
pub use suspicion::{exceeds_threshold, phi_from_probability, survival_probability, Suspicion};
pub use controller::{DetectorState, PhiDetector};
pub use shared::SharedDetector;
