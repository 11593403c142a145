//! Monte Carlo integration for drift calibration.
//!
//! - [`OnlineMoments`]: single-pass mean/variance accumulator
//! - [`HellingerEstimator`]: Hellinger distance between two mixture
//!   densities with an adaptive stopping rule and a hard sample cap

mod hellinger;
mod welford;

pub use hellinger::{
    EstimatorSettings, HellingerEstimate, HellingerEstimator, StopReason, DEFAULT_MAX_SAMPLES,
    DEFAULT_MIN_SAMPLES,
};
pub use welford::OnlineMoments;
