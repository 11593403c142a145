//! Calibrated concept drift between two Gaussian mixtures.
//!
//! - [`StreamConfig`]: validated, serde-loadable stream parameters
//! - [`DriftCalibrator`]: finds a pre/post pair at a target Hellinger distance
//! - [`ConceptDriftStream`]: endless instance stream that moves from the
//!   pre-drift to the post-drift concept over a fixed window
//! - [`StreamLoader`]: bounded pass over a stream with a recent-instance window

mod calibrator;
mod config;
mod loader;
mod stream;

pub use calibrator::{CalibratedPair, CalibrationReport, DriftCalibrator};
pub use config::{CalibrationSettings, InnerExhaustionPolicy, IntegrationRange, StreamConfig};
pub use loader::{DecayDataset, StreamLoader, DEFAULT_DECAY_HORIZON};
pub use stream::{Concept, ConceptDriftStream, DriftSchedule, Instance, Regime};
