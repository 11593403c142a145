//! Mixture blended towards a reference to dial in a drift magnitude.

use super::gaussian::GaussianMixture;
use super::MixtureDensity;
use crate::error::{DriftError, Result};

/// A [`GaussianMixture`] whose weights and means were pulled towards a
/// reference mixture by a one-shot convex blend.
///
/// With `a = target_dist²`, every component index shared with the reference
/// gets `w ← w·a + w_ref·(1−a)` and `μ ← μ·a + μ_ref·(1−a)`; covariances are
/// left as drawn and extra components (beyond the reference's count) are
/// untouched. Weights are renormalized afterwards.
///
/// `target_dist = 0` reproduces the reference's weights and means on the
/// shared indices; `target_dist = 1` leaves an independent random mixture.
/// No link to the reference is retained.
///
/// # Examples
///
/// ```
/// use driftmix::mixture::{DriftBlendedMixture, GaussianMixture};
///
/// let reference = GaussianMixture::new(3, 2, 1, 2).expect("valid sizes");
/// let blended = DriftBlendedMixture::new(3, 2, 3, 4, &reference, 0.0).expect("valid blend");
/// let ref_mean = reference.mean(1).expect("component 1");
/// let mean = blended.mixture().mean(1).expect("component 1");
/// assert!((mean[0] - ref_mean[0]).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct DriftBlendedMixture {
    mixture: GaussianMixture,
    blend_factor: f64,
}

impl DriftBlendedMixture {
    /// Draws a candidate mixture and blends it towards `reference`.
    ///
    /// # Errors
    ///
    /// Returns an error if `target_dist` is outside `[0, 1]`, if the
    /// dimensions differ from the reference's, or if the candidate mixture
    /// cannot be built.
    pub fn new(
        n_components: usize,
        dimensions: usize,
        sample_seed: u64,
        structure_seed: u64,
        reference: &GaussianMixture,
        target_dist: f64,
    ) -> Result<Self> {
        if !(0.0..=1.0).contains(&target_dist) {
            return Err(DriftError::invalid("target_dist", target_dist, "in [0, 1]"));
        }
        if reference.dimensions() != dimensions {
            return Err(DriftError::dimension_mismatch(
                "reference",
                dimensions,
                reference.dimensions(),
            ));
        }

        let mut mixture =
            GaussianMixture::new(n_components, dimensions, sample_seed, structure_seed)?;
        mixture.blend_towards(reference, target_dist.powi(2))?;

        Ok(Self {
            mixture,
            blend_factor: target_dist,
        })
    }

    /// The blended mixture.
    #[must_use]
    pub fn mixture(&self) -> &GaussianMixture {
        &self.mixture
    }

    /// Mutable access, e.g. to [`GaussianMixture::restart`].
    pub fn mixture_mut(&mut self) -> &mut GaussianMixture {
        &mut self.mixture
    }

    /// Unwraps into the plain mixture.
    #[must_use]
    pub fn into_inner(self) -> GaussianMixture {
        self.mixture
    }

    /// The `target_dist` the blend was built with.
    #[must_use]
    pub fn blend_factor(&self) -> f64 {
        self.blend_factor
    }
}

impl AsRef<GaussianMixture> for DriftBlendedMixture {
    fn as_ref(&self) -> &GaussianMixture {
        &self.mixture
    }
}

impl MixtureDensity for DriftBlendedMixture {
    fn dimensions(&self) -> usize {
        self.mixture.dimensions()
    }

    fn n_components(&self) -> usize {
        self.mixture.n_components()
    }

    fn density_at(&self, point: &[f64]) -> f64 {
        self.mixture.density_at(point)
    }

    fn sample(&mut self) -> (Vec<f64>, usize) {
        self.mixture.sample()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_distance_copies_reference() {
        let reference = GaussianMixture::new(3, 2, 1, 2).expect("valid");
        let blended = DriftBlendedMixture::new(3, 2, 5, 6, &reference, 0.0).expect("valid");
        let mixture = blended.mixture();
        for i in 0..3 {
            assert!((mixture.weights()[i] - reference.weights()[i]).abs() < 1e-12);
            for (a, b) in mixture
                .mean(i)
                .expect("in range")
                .iter()
                .zip(reference.mean(i).expect("in range"))
            {
                assert!((a - b).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_zero_distance_extra_components_keep_their_means() {
        let reference = GaussianMixture::new(3, 2, 1, 2).expect("valid");
        let candidate = GaussianMixture::new(5, 2, 5, 6).expect("valid");
        let blended = DriftBlendedMixture::new(5, 2, 5, 6, &reference, 0.0).expect("valid");
        let mixture = blended.mixture();

        // Shared means collapse onto the reference; extra ones stay as drawn.
        assert_eq!(
            mixture.mean(0).expect("in range"),
            reference.mean(0).expect("in range")
        );
        assert_eq!(
            mixture.mean(4).expect("in range"),
            candidate.mean(4).expect("in range")
        );
        let sum: f64 = mixture.weights().iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_unit_distance_is_candidate() {
        let reference = GaussianMixture::new(3, 2, 1, 2).expect("valid");
        let candidate = GaussianMixture::new(4, 2, 5, 6).expect("valid");
        let blended = DriftBlendedMixture::new(4, 2, 5, 6, &reference, 1.0).expect("valid");
        for i in 0..4 {
            assert!((blended.mixture().weights()[i] - candidate.weights()[i]).abs() < 1e-12);
            assert_eq!(
                blended.mixture().mean(i).expect("in range"),
                candidate.mean(i).expect("in range")
            );
        }
    }

    #[test]
    fn test_covariances_not_blended() {
        let reference = GaussianMixture::new(2, 3, 1, 2).expect("valid");
        let candidate = GaussianMixture::new(2, 3, 7, 8).expect("valid");
        let blended = DriftBlendedMixture::new(2, 3, 7, 8, &reference, 0.3).expect("valid");
        for i in 0..2 {
            assert_eq!(
                blended.mixture().covariance(i).expect("in range"),
                candidate.covariance(i).expect("in range")
            );
        }
    }

    #[test]
    fn test_intermediate_blend_is_convex() {
        let reference = GaussianMixture::new(2, 1, 1, 2).expect("valid");
        let candidate = GaussianMixture::new(2, 1, 3, 4).expect("valid");
        let blended = DriftBlendedMixture::new(2, 1, 3, 4, &reference, 0.5).expect("valid");
        let a = 0.25;
        let expected = candidate.mean(0).expect("in range")[0] * a
            + reference.mean(0).expect("in range")[0] * (1.0 - a);
        assert!((blended.mixture().mean(0).expect("in range")[0] - expected).abs() < 1e-12);
        assert!((blended.blend_factor() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rejects_out_of_range_distance() {
        let reference = GaussianMixture::new(2, 2, 1, 2).expect("valid");
        for bad in [-0.1, 1.5, f64::NAN] {
            assert!(matches!(
                DriftBlendedMixture::new(2, 2, 3, 4, &reference, bad),
                Err(DriftError::InvalidHyperparameter { .. })
            ));
        }
    }

    #[test]
    fn test_rejects_dimension_mismatch() {
        let reference = GaussianMixture::new(2, 2, 1, 2).expect("valid");
        assert!(matches!(
            DriftBlendedMixture::new(2, 3, 3, 4, &reference, 0.5),
            Err(DriftError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_unit_distance_has_no_bias_towards_reference() {
        // Across many candidate seeds, the distance of each blended mean to
        // the reference mean should look like that of an independent draw.
        let reference = GaussianMixture::new(3, 2, 1, 2).expect("valid");
        let ref_mean = reference.mean(0).expect("in range").to_vec();
        let mut blended_gap = 0.0;
        let mut fresh_gap = 0.0;
        let trials = 400;
        for seed in 0..trials {
            let blended =
                DriftBlendedMixture::new(3, 2, seed, seed + 1000, &reference, 1.0).expect("valid");
            let fresh = GaussianMixture::new(3, 2, seed, seed + 5000).expect("valid");
            let dist = |m: &[f64]| -> f64 {
                m.iter()
                    .zip(&ref_mean)
                    .map(|(a, b)| (a - b).powi(2))
                    .sum::<f64>()
                    .sqrt()
            };
            blended_gap += dist(blended.mixture().mean(0).expect("in range"));
            fresh_gap += dist(fresh.mean(0).expect("in range"));
        }
        let ratio = blended_gap / fresh_gap;
        assert!((ratio - 1.0).abs() < 0.15, "mean gap ratio {ratio}");
    }
}
