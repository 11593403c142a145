//! Monte Carlo estimate of the Hellinger distance between two densities.
//!
//! `H(p, q) = sqrt(1 - ∫ sqrt(p·q))`. The Bhattacharyya integral is estimated
//! by uniform sampling over a cube centred on the origin.

use super::welford::OnlineMoments;
use crate::error::{DriftError, Result};
use crate::mixture::MixtureDensity;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Default number of samples before the stopping rule is consulted.
pub const DEFAULT_MIN_SAMPLES: u64 = 1_000_000;

/// Default hard cap on samples per estimate.
pub const DEFAULT_MAX_SAMPLES: u64 = 50_000_000;

/// Why the sampling loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// The estimate moved further than `sqrt(standard_error)` from the
    /// target distance, so more samples cannot bring it back.
    Diverged,
    /// The sample cap was hit while the estimate still sat within
    /// `sqrt(standard_error)` of the target.
    SampleCapReached,
}

/// One Hellinger distance estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HellingerEstimate {
    /// Estimated distance in `[0, 1]`.
    pub distance: f64,
    /// Estimated Bhattacharyya integral `∫ sqrt(p·q)`.
    pub integral: f64,
    /// Standard error of `integral`.
    pub standard_error: f64,
    /// Points evaluated.
    pub samples: u64,
    /// Stopping condition.
    pub stop: StopReason,
}

/// Sample budget for [`HellingerEstimator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorSettings {
    /// Samples drawn before the stopping rule is consulted.
    pub min_samples: u64,
    /// Hard cap on samples.
    pub max_samples: u64,
}

impl Default for EstimatorSettings {
    fn default() -> Self {
        Self {
            min_samples: DEFAULT_MIN_SAMPLES,
            max_samples: DEFAULT_MAX_SAMPLES,
        }
    }
}

impl EstimatorSettings {
    /// Validate the sample budget
    ///
    /// # Errors
    ///
    /// Returns an error if `min_samples` is zero or `max_samples <= min_samples`.
    pub fn validate(&self) -> Result<()> {
        if self.min_samples == 0 {
            return Err(DriftError::invalid("min_samples", self.min_samples, ">= 1"));
        }
        if self.max_samples <= self.min_samples {
            return Err(DriftError::invalid(
                "max_samples",
                self.max_samples,
                "> min_samples",
            ));
        }
        Ok(())
    }
}

/// Monte Carlo Hellinger distance estimator.
///
/// # Algorithm
///
/// 1. Draw `x` uniformly from `[-r/2, r/2)^d`
/// 2. Fold `g = sqrt(p(x)·q(x))` into a Welford accumulator
/// 3. Once more than `min_samples` points were drawn, compute
///    `integral = r^d · mean(g)`, `se = r^d · sqrt(s²/N)` and
///    `distance = sqrt(max(0, 1 - integral))`; stop when
///    `|target - distance| > sqrt(se)`
/// 4. Stop unconditionally at `max_samples`
///
/// The generator is reseeded on every call, so estimates are deterministic
/// and two estimates with the same estimator share their evaluation points.
///
/// # Examples
///
/// ```
/// use driftmix::mixture::GaussianMixture;
/// use driftmix::monte_carlo::HellingerEstimator;
/// use driftmix::primitives::Matrix;
///
/// let var = || Matrix::from_vec(1, 1, vec![0.5]).expect("1x1");
/// let m = GaussianMixture::from_parts(
///     &[0.5, 0.5],
///     vec![(vec![-1.0], var()), (vec![1.0], var())],
///     0,
///     0,
/// )
/// .expect("valid parts");
/// let estimator = HellingerEstimator::new(42, 8.0)
///     .expect("positive range")
///     .with_min_samples(5_000)
///     .with_max_samples(50_000);
/// let estimate = estimator.estimate(&m, &m, 0.5).expect("same dimensions");
/// assert!(estimate.distance < 0.2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HellingerEstimator {
    seed: u64,
    integrate_range: f64,
    min_samples: u64,
    max_samples: u64,
}

impl HellingerEstimator {
    /// Create an estimator integrating over a cube of side `integrate_range`.
    ///
    /// # Errors
    ///
    /// Returns an error if `integrate_range` is not positive and finite.
    pub fn new(seed: u64, integrate_range: f64) -> Result<Self> {
        if !integrate_range.is_finite() || integrate_range <= 0.0 {
            return Err(DriftError::invalid(
                "integrate_range",
                integrate_range,
                "finite and > 0",
            ));
        }
        Ok(Self {
            seed,
            integrate_range,
            min_samples: DEFAULT_MIN_SAMPLES,
            max_samples: DEFAULT_MAX_SAMPLES,
        })
    }

    /// Create an estimator with a validated sample budget.
    ///
    /// # Errors
    ///
    /// Returns an error if the range or the budget is invalid.
    pub fn with_settings(seed: u64, integrate_range: f64, settings: &EstimatorSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self::new(seed, integrate_range)?
            .with_min_samples(settings.min_samples)
            .with_max_samples(settings.max_samples))
    }

    /// Set the number of samples before the stopping rule applies.
    #[must_use]
    pub fn with_min_samples(mut self, min_samples: u64) -> Self {
        self.min_samples = min_samples;
        self
    }

    /// Set the hard sample cap.
    #[must_use]
    pub fn with_max_samples(mut self, max_samples: u64) -> Self {
        self.max_samples = max_samples.max(1);
        self
    }

    /// Side of the integration cube.
    #[must_use]
    pub fn integrate_range(&self) -> f64 {
        self.integrate_range
    }

    /// Seed the sampling generator is reset to on each call.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Estimates the Hellinger distance between `a` and `b`.
    ///
    /// `target` only drives the stopping rule; it does not bias the estimate.
    ///
    /// # Errors
    ///
    /// Returns an error if the two densities have different dimensions.
    pub fn estimate<A, B>(&self, a: &A, b: &B, target: f64) -> Result<HellingerEstimate>
    where
        A: MixtureDensity + ?Sized,
        B: MixtureDensity + ?Sized,
    {
        let d = a.dimensions();
        if b.dimensions() != d {
            return Err(DriftError::dimension_mismatch("density", d, b.dimensions()));
        }

        let range = self.integrate_range;
        let volume = range.powi(d as i32);
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut point = vec![0.0; d];
        let mut moments = OnlineMoments::new();

        loop {
            for x in &mut point {
                *x = rng.gen::<f64>() * range - range / 2.0;
            }
            let g = (a.density_at(&point) * b.density_at(&point)).sqrt();
            moments.push(g);

            if moments.count() > self.min_samples {
                let estimate = summarize(&moments, volume, StopReason::Diverged);
                if (target - estimate.distance).abs() > estimate.standard_error.sqrt() {
                    trace!(
                        samples = estimate.samples,
                        distance = estimate.distance,
                        "hellinger estimate diverged from target"
                    );
                    return Ok(estimate);
                }
            }

            if moments.count() >= self.max_samples {
                let estimate = summarize(&moments, volume, StopReason::SampleCapReached);
                trace!(
                    samples = estimate.samples,
                    distance = estimate.distance,
                    "hellinger estimate hit sample cap"
                );
                return Ok(estimate);
            }
        }
    }
}

fn summarize(moments: &OnlineMoments, volume: f64, stop: StopReason) -> HellingerEstimate {
    let integral = volume * moments.sum() / moments.count() as f64;
    HellingerEstimate {
        distance: (1.0 - integral).max(0.0).sqrt(),
        integral,
        standard_error: volume * moments.standard_error(),
        samples: moments.count(),
        stop,
    }
}

#[cfg(test)]
#[path = "hellinger_tests.rs"]
mod tests;
