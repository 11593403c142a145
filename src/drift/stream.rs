//! Instance stream that drifts from one mixture to another.

use super::calibrator::{CalibrationReport, DriftCalibrator};
use super::config::StreamConfig;
use crate::error::{DriftError, Result};
use crate::mixture::{DriftBlendedMixture, GaussianMixture, MixtureDensity};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

/// Which mixture produced an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Concept {
    /// Drawn from the pre-drift mixture.
    Pre,
    /// Drawn from the post-drift mixture.
    Post,
}

/// Phase of the stream at a given instance number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Regime {
    /// `n <= last_pre`: only the pre-drift concept.
    Stable,
    /// `last_pre < n < first_post`: concepts mixed with a linearly rising
    /// post-drift probability.
    Drifting,
    /// `n >= first_post`: only the post-drift concept.
    Drifted,
}

/// One labelled point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    /// Attribute values.
    pub features: Vec<f64>,
    /// Component index within the producing mixture.
    pub label: usize,
    /// Producing mixture.
    pub concept: Concept,
    /// Stream phase when the instance was drawn.
    pub regime: Regime,
}

impl Instance {
    /// Drops the ground-truth metadata.
    #[must_use]
    pub fn into_pair(self) -> (Vec<f64>, usize) {
        (self.features, self.label)
    }
}

/// Instance numbers delimiting the drift window.
///
/// Instances are numbered from 1. With `last_pre = burn_in` and
/// `first_post = last_pre + drift_duration + 1`, instance `n` inside the
/// window comes from the post-drift concept with probability
/// `(n - burn_in) / drift_duration`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ScheduleParts")]
pub struct DriftSchedule {
    burn_in: u64,
    drift_duration: u64,
}

/// Unchecked wire form of [`DriftSchedule`].
#[derive(Deserialize)]
struct ScheduleParts {
    burn_in: u64,
    drift_duration: u64,
}

impl TryFrom<ScheduleParts> for DriftSchedule {
    type Error = DriftError;

    fn try_from(parts: ScheduleParts) -> Result<Self> {
        Self::new(parts.burn_in, parts.drift_duration)
    }
}

impl DriftSchedule {
    /// Create a schedule.
    ///
    /// # Errors
    ///
    /// Returns an error if `drift_duration` is zero.
    pub fn new(burn_in: u64, drift_duration: u64) -> Result<Self> {
        if drift_duration == 0 {
            return Err(DriftError::invalid("drift_duration", drift_duration, ">= 1"));
        }
        Ok(Self {
            burn_in,
            drift_duration,
        })
    }

    /// Last instance drawn purely from the pre-drift concept.
    #[must_use]
    pub fn last_pre(&self) -> u64 {
        self.burn_in
    }

    /// First instance drawn purely from the post-drift concept.
    #[must_use]
    pub fn first_post(&self) -> u64 {
        self.burn_in
            .saturating_add(self.drift_duration)
            .saturating_add(1)
    }

    /// Phase of instance `n`.
    #[must_use]
    pub fn regime_at(&self, n: u64) -> Regime {
        if n >= self.first_post() {
            Regime::Drifted
        } else if n <= self.last_pre() {
            Regime::Stable
        } else {
            Regime::Drifting
        }
    }

    /// Probability that instance `n` comes from the post-drift concept.
    #[must_use]
    pub fn post_probability(&self, n: u64) -> f64 {
        match self.regime_at(n) {
            Regime::Stable => 0.0,
            Regime::Drifted => 1.0,
            Regime::Drifting => (n - self.burn_in) as f64 / self.drift_duration as f64,
        }
    }
}

type SwitchHook = Box<dyn FnMut(usize) + Send>;

/// Endless stream of instances drifting from a pre- to a post-drift mixture.
///
/// `ConceptDriftStream::new` calibrates a [`GaussianMixture`] /
/// [`DriftBlendedMixture`] pair; [`ConceptDriftStream::from_densities`]
/// accepts any pair of [`MixtureDensity`] samplers.
///
/// # Examples
///
/// ```
/// use driftmix::drift::{Concept, ConceptDriftStream};
/// use driftmix::mixture::GaussianMixture;
///
/// let pre = GaussianMixture::new(2, 2, 1, 1).expect("valid");
/// let post = GaussianMixture::new(3, 2, 2, 2).expect("valid");
/// let mut stream = ConceptDriftStream::from_densities(pre, post, 5, 10, 7).expect("valid");
///
/// let first: Vec<_> = stream.by_ref().take(5).collect();
/// assert!(first.iter().all(|i| i.concept == Concept::Pre));
/// let late = stream.nth(20).expect("endless");
/// assert_eq!(late.concept, Concept::Post);
/// ```
pub struct ConceptDriftStream<P = GaussianMixture, Q = DriftBlendedMixture> {
    pre: P,
    post: Q,
    schedule: DriftSchedule,
    emitted: u64,
    drift_rng: StdRng,
    report: Option<CalibrationReport>,
    on_switch: Option<SwitchHook>,
}

impl ConceptDriftStream {
    /// Calibrate a mixture pair and build the stream.
    ///
    /// The drift generator is seeded with `instance_seed + model_seed`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or calibration fails.
    pub fn new(config: &StreamConfig) -> Result<Self> {
        let pair = DriftCalibrator::from_config(config)?.calibrate()?;
        let (pre, post, report) = pair.into_parts();
        info!(
            distance = report.distance,
            last_pre = config.burn_in_instances,
            drift_duration = config.drift_duration,
            "built concept drift stream"
        );
        let mut stream = Self::from_densities(
            pre,
            post,
            config.burn_in_instances,
            config.drift_duration,
            config.instance_seed.wrapping_add(config.model_seed),
        )?;
        stream.report = Some(report);
        Ok(stream)
    }

    /// Estimated Hellinger distance of the calibrated pair.
    #[must_use]
    pub fn achieved_distance(&self) -> Option<f64> {
        self.report.map(|r| r.distance)
    }
}

impl<P: MixtureDensity, Q: MixtureDensity> ConceptDriftStream<P, Q> {
    /// Build a stream over an explicit pair of densities.
    ///
    /// # Errors
    ///
    /// Returns an error if `drift_duration` is zero or the two densities
    /// have different dimensions.
    pub fn from_densities(
        pre: P,
        post: Q,
        burn_in: u64,
        drift_duration: u64,
        drift_seed: u64,
    ) -> Result<Self> {
        if pre.dimensions() != post.dimensions() {
            return Err(DriftError::dimension_mismatch(
                "post",
                pre.dimensions(),
                post.dimensions(),
            ));
        }
        Ok(Self {
            pre,
            post,
            schedule: DriftSchedule::new(burn_in, drift_duration)?,
            emitted: 0,
            drift_rng: StdRng::seed_from_u64(drift_seed),
            report: None,
            on_switch: None,
        })
    }

    /// Register a callback fired once, at `first_post`, with the number of
    /// post-drift classes.
    #[must_use]
    pub fn with_switch_hook(mut self, hook: impl FnMut(usize) + Send + 'static) -> Self {
        self.on_switch = Some(Box::new(hook));
        self
    }

    /// Draw the next instance.
    pub fn next_instance(&mut self) -> Instance {
        self.emitted += 1;
        let n = self.emitted;
        let regime = self.schedule.regime_at(n);

        let concept = match regime {
            Regime::Stable => Concept::Pre,
            Regime::Drifted => {
                if n == self.schedule.first_post() {
                    let classes = self.post.n_components();
                    if let Some(hook) = self.on_switch.as_mut() {
                        hook(classes);
                    }
                }
                Concept::Post
            }
            Regime::Drifting => {
                let u: f64 = self.drift_rng.gen();
                if u < self.schedule.post_probability(n) {
                    Concept::Post
                } else {
                    Concept::Pre
                }
            }
        };

        let (features, label) = match concept {
            Concept::Pre => self.pre.sample(),
            Concept::Post => self.post.sample(),
        };
        Instance {
            features,
            label,
            concept,
            regime,
        }
    }

    /// Instances drawn so far.
    #[must_use]
    pub fn instances_emitted(&self) -> u64 {
        self.emitted
    }

    /// Last instance drawn purely from the pre-drift concept.
    #[must_use]
    pub fn last_pre(&self) -> u64 {
        self.schedule.last_pre()
    }

    /// First instance drawn purely from the post-drift concept.
    #[must_use]
    pub fn first_post(&self) -> u64 {
        self.schedule.first_post()
    }

    /// Phase of instance `n`.
    #[must_use]
    pub fn regime_at(&self, n: u64) -> Regime {
        self.schedule.regime_at(n)
    }

    /// The drift window.
    #[must_use]
    pub fn schedule(&self) -> &DriftSchedule {
        &self.schedule
    }

    /// Number of attributes per instance.
    #[must_use]
    pub fn dimensions(&self) -> usize {
        self.pre.dimensions()
    }

    /// Pre-drift density.
    #[must_use]
    pub fn pre(&self) -> &P {
        &self.pre
    }

    /// Post-drift density.
    #[must_use]
    pub fn post(&self) -> &Q {
        &self.post
    }

    /// Calibration diagnostics, when the pair was calibrated.
    #[must_use]
    pub fn report(&self) -> Option<&CalibrationReport> {
        self.report.as_ref()
    }
}

impl<P: MixtureDensity, Q: MixtureDensity> Iterator for ConceptDriftStream<P, Q> {
    type Item = Instance;

    fn next(&mut self) -> Option<Instance> {
        Some(self.next_instance())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

impl<P: fmt::Debug, Q: fmt::Debug> fmt::Debug for ConceptDriftStream<P, Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConceptDriftStream")
            .field("pre", &self.pre)
            .field("post", &self.post)
            .field("schedule", &self.schedule)
            .field("emitted", &self.emitted)
            .field("report", &self.report)
            .field("on_switch", &self.on_switch.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "stream_tests.rs"]
mod tests;
