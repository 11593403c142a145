//! Configuration for calibrated drift streams.

use crate::error::{DriftError, Result};
use crate::monte_carlo::EstimatorSettings;
use serde::{Deserialize, Serialize};

/// What to do when every post-drift candidate for one reference mixture
/// missed the tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InnerExhaustionPolicy {
    /// Discard the reference mixture and draw a new one.
    #[default]
    Retry,
    /// Keep the last evaluated pair even though it missed the tolerance.
    AcceptLast,
}

/// Side of the cube the Hellinger integral is taken over.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum IntegrationRange {
    /// `max(n_pre, n_post) + 4`: covers the means of both mixtures.
    #[default]
    MaxComponents,
    /// `n_pre + 4`: ignores the post-drift component count.
    PreComponents,
    /// Explicit side length.
    Fixed(f64),
}

impl IntegrationRange {
    /// Margin added to the component count; means lie in `[-n/2, n/2)`.
    pub const MARGIN: f64 = 4.0;

    /// Cube side for the given component counts.
    #[must_use]
    pub fn side(&self, n_components_pre: usize, n_components_post: usize) -> f64 {
        match self {
            Self::MaxComponents => {
                n_components_pre.max(n_components_post) as f64 + Self::MARGIN
            }
            Self::PreComponents => n_components_pre as f64 + Self::MARGIN,
            Self::Fixed(side) => *side,
        }
    }
}

/// Retry budget and policies for the calibration search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationSettings {
    /// Largest seed offset tried for post-drift candidates.
    pub max_seed_offset: u64,
    /// Reference mixtures drawn before giving up.
    pub max_outer_attempts: usize,
    /// Policy once the inner search is exhausted.
    pub inner_exhaustion: InnerExhaustionPolicy,
    /// Integration cube policy.
    pub integration_range: IntegrationRange,
}

impl Default for CalibrationSettings {
    fn default() -> Self {
        Self {
            max_seed_offset: 100,
            max_outer_attempts: 100,
            inner_exhaustion: InnerExhaustionPolicy::Retry,
            integration_range: IntegrationRange::MaxComponents,
        }
    }
}

impl CalibrationSettings {
    /// Validate the retry budget
    ///
    /// # Errors
    ///
    /// Returns an error if no reference draw is allowed or a fixed
    /// integration range is not positive and finite.
    pub fn validate(&self) -> Result<()> {
        if self.max_outer_attempts == 0 {
            return Err(DriftError::invalid(
                "max_outer_attempts",
                self.max_outer_attempts,
                ">= 1",
            ));
        }
        if let IntegrationRange::Fixed(side) = self.integration_range {
            if !side.is_finite() || side <= 0.0 {
                return Err(DriftError::invalid(
                    "integration_range",
                    side,
                    "finite and > 0",
                ));
            }
        }
        Ok(())
    }
}

/// Configuration of a [`ConceptDriftStream`](super::ConceptDriftStream).
///
/// # Examples
///
/// ```
/// use driftmix::drift::StreamConfig;
///
/// let config = StreamConfig::from_json(
///     r#"{"dimensions": 3, "drift_magnitude": 0.3, "precision": 0.02}"#,
/// )
/// .expect("valid configuration");
/// assert_eq!(config.dimensions, 3);
/// assert_eq!(config.n_components_pre, 3);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Number of attributes per instance.
    pub dimensions: usize,
    /// Components (classes) before the drift.
    pub n_components_pre: usize,
    /// Components (classes) after the drift.
    pub n_components_post: usize,
    /// Instances drawn purely from the pre-drift mixture.
    pub burn_in_instances: u64,
    /// Instances over which the post-drift mixture takes over.
    pub drift_duration: u64,
    /// Target Hellinger distance between the two mixtures, in `[0, 1]`.
    pub drift_magnitude: f64,
    /// Accepted deviation from `drift_magnitude`.
    pub precision: f64,
    /// Seed for mixture structure.
    pub model_seed: u64,
    /// Seed for instance sampling.
    pub instance_seed: u64,
    /// Calibration search budget.
    pub calibration: CalibrationSettings,
    /// Monte Carlo sample budget.
    pub estimator: EstimatorSettings,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            dimensions: 2,
            n_components_pre: 3,
            n_components_post: 4,
            burn_in_instances: 10,
            drift_duration: 1000,
            drift_magnitude: 0.5,
            precision: 0.01,
            model_seed: 42,
            instance_seed: 42,
            calibration: CalibrationSettings::default(),
            estimator: EstimatorSettings::default(),
        }
    }
}

impl StreamConfig {
    /// Parse and validate a JSON configuration; missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed JSON or invalid values.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration parameters
    ///
    /// # Errors
    ///
    /// Returns the first out-of-domain parameter; nothing is clamped.
    pub fn validate(&self) -> Result<()> {
        if self.dimensions == 0 {
            return Err(DriftError::invalid("dimensions", self.dimensions, ">= 1"));
        }
        if self.n_components_pre == 0 {
            return Err(DriftError::invalid(
                "n_components_pre",
                self.n_components_pre,
                ">= 1",
            ));
        }
        if self.n_components_post == 0 {
            return Err(DriftError::invalid(
                "n_components_post",
                self.n_components_post,
                ">= 1",
            ));
        }
        if self.drift_duration == 0 {
            return Err(DriftError::invalid(
                "drift_duration",
                self.drift_duration,
                ">= 1",
            ));
        }
        if !(0.0..=1.0).contains(&self.drift_magnitude) {
            return Err(DriftError::invalid(
                "drift_magnitude",
                self.drift_magnitude,
                "in [0, 1]",
            ));
        }
        if !self.precision.is_finite() || self.precision <= 0.0 {
            return Err(DriftError::invalid(
                "precision",
                self.precision,
                "finite and > 0",
            ));
        }
        self.calibration.validate()?;
        self.estimator.validate()
    }

    /// Set the number of attributes.
    #[must_use]
    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = dimensions;
        self
    }

    /// Set the pre- and post-drift component counts.
    #[must_use]
    pub fn with_components(mut self, pre: usize, post: usize) -> Self {
        self.n_components_pre = pre;
        self.n_components_post = post;
        self
    }

    /// Set the burn-in length and the drift window length.
    #[must_use]
    pub fn with_schedule(mut self, burn_in_instances: u64, drift_duration: u64) -> Self {
        self.burn_in_instances = burn_in_instances;
        self.drift_duration = drift_duration;
        self
    }

    /// Set the target drift magnitude and its accepted deviation.
    #[must_use]
    pub fn with_drift(mut self, magnitude: f64, precision: f64) -> Self {
        self.drift_magnitude = magnitude;
        self.precision = precision;
        self
    }

    /// Set the model and instance seeds.
    #[must_use]
    pub fn with_seeds(mut self, model_seed: u64, instance_seed: u64) -> Self {
        self.model_seed = model_seed;
        self.instance_seed = instance_seed;
        self
    }

    /// Set the calibration search budget.
    #[must_use]
    pub fn with_calibration(mut self, calibration: CalibrationSettings) -> Self {
        self.calibration = calibration;
        self
    }

    /// Set the Monte Carlo sample budget.
    #[must_use]
    pub fn with_estimator(mut self, estimator: EstimatorSettings) -> Self {
        self.estimator = estimator;
        self
    }
}
