//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use driftmix::prelude::*;
//! ```

pub use crate::drift::{
    CalibrationSettings, ConceptDriftStream, DriftCalibrator, Instance, StreamConfig,
    StreamLoader,
};
pub use crate::error::{DriftError, Result};
pub use crate::mixture::{DriftBlendedMixture, GaussianMixture, MixtureDensity};
pub use crate::monte_carlo::{EstimatorSettings, HellingerEstimator};
pub use crate::primitives::Matrix;
