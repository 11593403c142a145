//! Driftmix: Gaussian-mixture data streams with calibrated concept drift.
//!
//! A stream starts from one random Gaussian mixture and, over a drift
//! window, hands over to a second mixture whose Hellinger distance from the
//! first was measured by Monte Carlo integration and matched to a target.
//! Instances carry the producing component as their label, so stream
//! clustering can be evaluated against a known drift magnitude.
//!
//! # Quick Start
//!
//! ```no_run
//! use driftmix::prelude::*;
//!
//! let config = StreamConfig::default()
//!     .with_components(3, 4)
//!     .with_schedule(1_000, 5_000)
//!     .with_drift(0.5, 0.01);
//! let stream = ConceptDriftStream::new(&config).expect("calibrates");
//! println!("drift magnitude: {:?}", stream.achieved_distance());
//!
//! for (features, label) in StreamLoader::new(stream, 10_000, 500).expect("valid") {
//!     assert_eq!(features.len(), 2);
//!     assert!(label < 4);
//! }
//! ```
//!
//! # Modules
//!
//! - [`primitives`]: Dense matrix with Cholesky factorization
//! - [`mixture`]: Gaussian mixture densities and samplers
//! - [`monte_carlo`]: Welford moments and the Hellinger distance estimator
//! - [`drift`]: Calibration, drift streams and the windowed loader
//! - [`error`]: Error type shared by every module

pub mod drift;
pub mod error;
pub mod mixture;
pub mod monte_carlo;
pub mod prelude;
pub mod primitives;

pub use error::{DriftError, Result};
