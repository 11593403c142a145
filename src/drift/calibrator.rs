//! Search for a pre/post mixture pair at a target Hellinger distance.
//!
//! Blending a random mixture towards a reference only controls the drift
//! magnitude loosely, so candidates are drawn over consecutive seed offsets
//! and measured until one lands within tolerance.

use super::config::{CalibrationSettings, InnerExhaustionPolicy, StreamConfig};
use crate::error::{DriftError, Result};
use crate::mixture::{DriftBlendedMixture, GaussianMixture};
use crate::monte_carlo::{EstimatorSettings, HellingerEstimate, HellingerEstimator};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Outcome of a calibration search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationReport {
    /// Reference mixtures drawn.
    pub outer_attempts: usize,
    /// Hellinger estimates computed across all reference draws.
    pub inner_attempts: usize,
    /// Distance of the accepted pair.
    pub distance: f64,
    /// Whether `|distance - target| <= tolerance`.
    pub within_tolerance: bool,
    /// Estimate of the accepted pair.
    pub last_estimate: HellingerEstimate,
    /// Seed offset of the accepted pre-drift mixture.
    pub pre_seed_offset: u64,
    /// Seed offset of the accepted post-drift mixture.
    pub post_seed_offset: u64,
    /// Side of the integration cube.
    pub integrate_range: f64,
}

/// A pre-drift mixture and a post-drift mixture at a measured distance.
#[derive(Debug, Clone)]
pub struct CalibratedPair {
    pre: GaussianMixture,
    post: DriftBlendedMixture,
    report: CalibrationReport,
}

impl CalibratedPair {
    /// The pre-drift mixture.
    #[must_use]
    pub fn pre(&self) -> &GaussianMixture {
        &self.pre
    }

    /// The post-drift mixture.
    #[must_use]
    pub fn post(&self) -> &DriftBlendedMixture {
        &self.post
    }

    /// Estimated Hellinger distance between the two.
    #[must_use]
    pub fn distance(&self) -> f64 {
        self.report.distance
    }

    /// Search diagnostics.
    #[must_use]
    pub fn report(&self) -> &CalibrationReport {
        &self.report
    }

    /// Splits into `(pre, post, report)`.
    #[must_use]
    pub fn into_parts(self) -> (GaussianMixture, DriftBlendedMixture, CalibrationReport) {
        (self.pre, self.post, self.report)
    }
}

/// Draws mixture pairs until their Hellinger distance matches a target.
///
/// # Algorithm
///
/// For `y = 0, 1, …` (at most `max_outer_attempts` times):
/// 1. `pre = GaussianMixture(n_pre, d, instance_seed + y, model_seed + y)`
/// 2. For `z = y + 1 ..= max_seed_offset + 1` (at least once):
///    `post = DriftBlendedMixture(n_post, d, instance_seed + z, model_seed + z, pre, target)`,
///    estimate `H(pre, post)` and return the pair if it is within tolerance
/// 3. On exhaustion of the inner loop either redraw `pre` or accept the last
///    pair, per [`InnerExhaustionPolicy`]
///
/// All estimates share one estimator seeded with `instance_seed + model_seed`.
#[derive(Debug, Clone, PartialEq)]
pub struct DriftCalibrator {
    dimensions: usize,
    n_components_pre: usize,
    n_components_post: usize,
    target_distance: f64,
    tolerance: f64,
    model_seed: u64,
    instance_seed: u64,
    settings: CalibrationSettings,
    estimator: EstimatorSettings,
}

impl DriftCalibrator {
    /// Create a calibrator with default search budgets.
    ///
    /// # Errors
    ///
    /// Returns an error if a size is zero, `target_distance` is outside
    /// `[0, 1]` or `tolerance` is not positive and finite.
    pub fn new(
        dimensions: usize,
        n_components_pre: usize,
        n_components_post: usize,
        target_distance: f64,
        tolerance: f64,
        model_seed: u64,
        instance_seed: u64,
    ) -> Result<Self> {
        Self::from_config(
            &StreamConfig::default()
                .with_dimensions(dimensions)
                .with_components(n_components_pre, n_components_post)
                .with_drift(target_distance, tolerance)
                .with_seeds(model_seed, instance_seed),
        )
    }

    /// Create a calibrator from the calibration-relevant part of a stream
    /// configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration does not validate.
    pub fn from_config(config: &StreamConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            dimensions: config.dimensions,
            n_components_pre: config.n_components_pre,
            n_components_post: config.n_components_post,
            target_distance: config.drift_magnitude,
            tolerance: config.precision,
            model_seed: config.model_seed,
            instance_seed: config.instance_seed,
            settings: config.calibration,
            estimator: config.estimator,
        })
    }

    /// Replace the search budget.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings do not validate.
    pub fn with_settings(mut self, settings: CalibrationSettings) -> Result<Self> {
        settings.validate()?;
        self.settings = settings;
        Ok(self)
    }

    /// Replace the Monte Carlo sample budget.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings do not validate.
    pub fn with_estimator(mut self, estimator: EstimatorSettings) -> Result<Self> {
        estimator.validate()?;
        self.estimator = estimator;
        Ok(self)
    }

    /// Target Hellinger distance.
    #[must_use]
    pub fn target_distance(&self) -> f64 {
        self.target_distance
    }

    /// Accepted deviation from the target.
    #[must_use]
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Search budget.
    #[must_use]
    pub fn settings(&self) -> &CalibrationSettings {
        &self.settings
    }

    /// The estimator every candidate is measured with.
    ///
    /// # Errors
    ///
    /// Returns an error if the integration range is not positive.
    pub fn estimator(&self) -> Result<HellingerEstimator> {
        let range = self
            .settings
            .integration_range
            .side(self.n_components_pre, self.n_components_post);
        HellingerEstimator::with_settings(
            self.instance_seed.wrapping_add(self.model_seed),
            range,
            &self.estimator,
        )
    }

    /// Run the search.
    ///
    /// # Errors
    ///
    /// Returns [`DriftError::CalibrationExhausted`] when `max_outer_attempts`
    /// reference draws all failed under [`InnerExhaustionPolicy::Retry`], or
    /// any error from building the mixtures.
    pub fn calibrate(&self) -> Result<CalibratedPair> {
        let estimator = self.estimator()?;
        let inner_limit = self.settings.max_seed_offset.saturating_add(1);
        let mut inner_attempts = 0usize;
        let mut last_distance = f64::NAN;

        for (outer, y) in (0..self.settings.max_outer_attempts).zip(0u64..) {
            let pre = GaussianMixture::new(
                self.n_components_pre,
                self.dimensions,
                self.instance_seed.wrapping_add(y),
                self.model_seed.wrapping_add(y),
            )?;

            let mut z = y.saturating_add(1);
            loop {
                let post = DriftBlendedMixture::new(
                    self.n_components_post,
                    self.dimensions,
                    self.instance_seed.wrapping_add(z),
                    self.model_seed.wrapping_add(z),
                    &pre,
                    self.target_distance,
                )?;
                let estimate = estimator.estimate(&pre, &post, self.target_distance)?;
                inner_attempts += 1;
                last_distance = estimate.distance;

                let within = (estimate.distance - self.target_distance).abs() <= self.tolerance;
                debug!(
                    pre_offset = y,
                    post_offset = z,
                    distance = estimate.distance,
                    target = self.target_distance,
                    samples = estimate.samples,
                    stop = ?estimate.stop,
                    within,
                    "estimated candidate drift"
                );

                let exhausted = z >= inner_limit;
                let accept_miss = exhausted
                    && self.settings.inner_exhaustion == InnerExhaustionPolicy::AcceptLast;
                if within || accept_miss {
                    let report = CalibrationReport {
                        outer_attempts: outer + 1,
                        inner_attempts,
                        distance: estimate.distance,
                        within_tolerance: within,
                        last_estimate: estimate,
                        pre_seed_offset: y,
                        post_seed_offset: z,
                        integrate_range: estimator.integrate_range(),
                    };
                    if within {
                        info!(
                            distance = report.distance,
                            target = self.target_distance,
                            outer_attempts = report.outer_attempts,
                            inner_attempts,
                            "calibrated drift"
                        );
                    } else {
                        warn!(
                            distance = report.distance,
                            target = self.target_distance,
                            tolerance = self.tolerance,
                            "accepting drift outside tolerance"
                        );
                    }
                    return Ok(CalibratedPair { pre, post, report });
                }
                if exhausted {
                    break;
                }
                z += 1;
            }
        }

        Err(DriftError::CalibrationExhausted {
            outer_attempts: self.settings.max_outer_attempts,
            inner_attempts,
            last_distance,
        })
    }
}

#[cfg(test)]
#[path = "calibrator_tests.rs"]
mod tests;
