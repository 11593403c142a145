//! Randomly structured Gaussian mixture.
//!
//! Weights, means and covariances are drawn once from a *structure*
//! generator; sampling draws come from a separate *sampling* generator so
//! that emitting instances never perturbs the model and vice versa.

use super::component::GaussianComponent;
use super::MixtureDensity;
use crate::error::{DriftError, Result};
use crate::primitives::Matrix;
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Weighted mixture of multivariate Gaussians.
///
/// # Algorithm
///
/// For each of the `n_components` components, in order:
///
/// 1. draw a raw weight from `U[0, 1)`
/// 2. draw each mean coordinate from `U[-n/2, n/2)`, so the spread of the
///    means grows with the number of components
/// 3. draw `X` with entries `(U[-1,1] + U[-1,1]) / 2` and use the Gram
///    matrix `X·Xᵀ` as covariance (symmetric positive semi-definite)
///
/// Raw weights are finally divided by their sum.
///
/// # Examples
///
/// ```
/// use driftmix::mixture::GaussianMixture;
///
/// let mixture = GaussianMixture::new(4, 3, 1, 2).expect("valid sizes");
/// let total: f64 = mixture.weights().iter().sum();
/// assert!((total - 1.0).abs() < 1e-12);
/// assert_eq!(mixture.mean(0).expect("component 0").len(), 3);
/// ```
///
/// # Performance
///
/// - Density: O(k·d²) for k components in d dimensions
/// - Sample: O(k + d²)
#[derive(Debug, Clone)]
pub struct GaussianMixture {
    dimensions: usize,
    /// Mixing weights (simplex).
    weights: Vec<f64>,
    components: Vec<GaussianComponent>,
    /// Categorical sampler over `weights`, rebuilt whenever they change.
    chooser: WeightedIndex<f64>,
    structure_rng: StdRng,
    sample_rng: StdRng,
}

impl GaussianMixture {
    /// Draws a random mixture.
    ///
    /// # Errors
    ///
    /// Returns an error if `n_components` or `dimensions` is zero, if the raw
    /// weights sum to zero, or if a drawn covariance is singular.
    pub fn new(
        n_components: usize,
        dimensions: usize,
        sample_seed: u64,
        structure_seed: u64,
    ) -> Result<Self> {
        if n_components == 0 {
            return Err(DriftError::invalid("n_components", n_components, ">= 1"));
        }
        if dimensions == 0 {
            return Err(DriftError::invalid("dimensions", dimensions, ">= 1"));
        }

        let mut structure_rng = StdRng::seed_from_u64(structure_seed);
        let (weights, components) = draw_structure(n_components, dimensions, &mut structure_rng)?;
        let chooser = chooser(&weights)?;

        Ok(Self {
            dimensions,
            weights,
            components,
            chooser,
            structure_rng,
            sample_rng: StdRng::seed_from_u64(sample_seed),
        })
    }

    /// Builds a mixture from explicit parameters.
    ///
    /// Weights must be non-negative; they are renormalized to sum to one.
    ///
    /// # Errors
    ///
    /// Returns an error if the lists are empty or of different lengths, if
    /// any weight is negative or they sum to zero, if a mean or covariance
    /// has the wrong dimension, or if a covariance is not positive definite.
    pub fn from_parts(
        weights: &[f64],
        components: Vec<(Vec<f64>, Matrix<f64>)>,
        sample_seed: u64,
        structure_seed: u64,
    ) -> Result<Self> {
        if components.is_empty() {
            return Err(DriftError::invalid("n_components", 0, ">= 1"));
        }
        if weights.len() != components.len() {
            return Err(DriftError::dimension_mismatch(
                "weights",
                components.len(),
                weights.len(),
            ));
        }
        if let Some(w) = weights.iter().find(|w| w.is_nan() || **w < 0.0) {
            return Err(DriftError::invalid("weight", w, ">= 0"));
        }

        let dimensions = components[0].0.len();
        if dimensions == 0 {
            return Err(DriftError::invalid("dimensions", 0, ">= 1"));
        }

        let mut built = Vec::with_capacity(components.len());
        for (i, (mean, covariance)) in components.into_iter().enumerate() {
            if mean.len() != dimensions {
                return Err(DriftError::dimension_mismatch("mean", dimensions, mean.len()));
            }
            if covariance.shape() != (dimensions, dimensions) {
                return Err(DriftError::DimensionMismatch {
                    expected: format!("covariance={dimensions}x{dimensions}"),
                    actual: format!("{}x{}", covariance.n_rows(), covariance.n_cols()),
                });
            }
            let component = GaussianComponent::new(mean, covariance)
                .map_err(|_| DriftError::NotPositiveDefinite { component: i })?;
            built.push(component);
        }

        let weights = normalize(weights)?;
        let chooser = chooser(&weights)?;

        Ok(Self {
            dimensions,
            weights,
            components: built,
            chooser,
            structure_rng: StdRng::seed_from_u64(structure_seed),
            sample_rng: StdRng::seed_from_u64(sample_seed),
        })
    }

    /// Mixing weights (sum to one).
    #[must_use]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Weight of component `i`.
    ///
    /// # Errors
    ///
    /// Returns an error if `i` is out of range.
    pub fn weight(&self, i: usize) -> Result<f64> {
        self.weights
            .get(i)
            .copied()
            .ok_or(DriftError::IndexOutOfBounds {
                index: i,
                len: self.weights.len(),
            })
    }

    /// Mean of component `i`.
    ///
    /// # Errors
    ///
    /// Returns an error if `i` is out of range.
    pub fn mean(&self, i: usize) -> Result<&[f64]> {
        self.component(i).map(GaussianComponent::mean)
    }

    /// Covariance of component `i`.
    ///
    /// # Errors
    ///
    /// Returns an error if `i` is out of range.
    pub fn covariance(&self, i: usize) -> Result<&Matrix<f64>> {
        self.component(i).map(GaussianComponent::covariance)
    }

    /// Component `i`.
    ///
    /// # Errors
    ///
    /// Returns an error if `i` is out of range.
    pub fn component(&self, i: usize) -> Result<&GaussianComponent> {
        self.components.get(i).ok_or(DriftError::IndexOutOfBounds {
            index: i,
            len: self.components.len(),
        })
    }

    /// Replaces the mean of component `i`, keeping its covariance.
    ///
    /// # Errors
    ///
    /// Returns an error if `i` is out of range or `mean` has the wrong length.
    pub fn set_mean(&mut self, i: usize, mean: Vec<f64>) -> Result<()> {
        if mean.len() != self.dimensions {
            return Err(DriftError::dimension_mismatch(
                "mean",
                self.dimensions,
                mean.len(),
            ));
        }
        let len = self.components.len();
        let component = self
            .components
            .get_mut(i)
            .ok_or(DriftError::IndexOutOfBounds { index: i, len })?;
        component.set_mean(mean);
        Ok(())
    }

    /// Reseeds both generators.
    ///
    /// Weights, means and covariances are *not* redrawn: they stay fixed from
    /// construction. Only subsequent draws are affected.
    pub fn restart(&mut self, sample_seed: u64, structure_seed: u64) {
        self.sample_rng = StdRng::seed_from_u64(sample_seed);
        self.structure_rng = StdRng::seed_from_u64(structure_seed);
    }

    /// Redraws weights, means and covariances from the structure generator.
    ///
    /// After `restart(s, t)`, this reproduces exactly the structure that
    /// `GaussianMixture::new(n, d, s, t)` would build.
    ///
    /// # Errors
    ///
    /// Returns an error if the new weights are degenerate or a covariance is
    /// singular; the mixture is left unchanged in that case.
    pub fn redraw_structure(&mut self) -> Result<()> {
        let (weights, components) =
            draw_structure(self.components.len(), self.dimensions, &mut self.structure_rng)?;
        self.chooser = chooser(&weights)?;
        self.weights = weights;
        self.components = components;
        Ok(())
    }

    /// Convex blend towards `reference`: for every shared index,
    /// `w ← w·a + w_ref·(1−a)` and `μ ← μ·a + μ_ref·(1−a)`; then renormalize.
    pub(crate) fn blend_towards(&mut self, reference: &Self, adjustment: f64) -> Result<()> {
        let shared = self.components.len().min(reference.components.len());
        let mut raw = self.weights.clone();

        for i in 0..shared {
            raw[i] = raw[i] * adjustment + reference.weights[i] * (1.0 - adjustment);

            let blended: Vec<f64> = self.components[i]
                .mean()
                .iter()
                .zip(reference.components[i].mean())
                .map(|(own, other)| own * adjustment + other * (1.0 - adjustment))
                .collect();
            self.set_mean(i, blended)?;
        }

        self.weights = normalize(&raw)?;
        self.chooser = chooser(&self.weights)?;
        Ok(())
    }

    /// Density at `point`, checking its length first.
    ///
    /// # Errors
    ///
    /// Returns an error if `point` does not have `dimensions` coordinates.
    pub fn checked_density_at(&self, point: &[f64]) -> Result<f64> {
        if point.len() != self.dimensions {
            return Err(DriftError::dimension_mismatch(
                "point",
                self.dimensions,
                point.len(),
            ));
        }
        Ok(self.density_at(point))
    }
}

impl MixtureDensity for GaussianMixture {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn n_components(&self) -> usize {
        self.components.len()
    }

    fn density_at(&self, point: &[f64]) -> f64 {
        debug_assert_eq!(point.len(), self.dimensions);
        self.weights
            .iter()
            .zip(&self.components)
            .filter(|(w, _)| **w > 0.0)
            .map(|(w, c)| w * c.pdf(point))
            .sum()
    }

    fn sample(&mut self) -> (Vec<f64>, usize) {
        let index = self.chooser.sample(&mut self.sample_rng);
        let point = self.components[index].sample(&mut self.sample_rng);
        (point, index)
    }
}

/// Draws raw weights, means and covariances in construction order, then
/// normalizes the weights.
fn draw_structure<R: Rng + ?Sized>(
    n_components: usize,
    dimensions: usize,
    rng: &mut R,
) -> Result<(Vec<f64>, Vec<GaussianComponent>)> {
    let range = n_components as f64;
    let mut raw_weights = Vec::with_capacity(n_components);
    let mut components = Vec::with_capacity(n_components);

    for i in 0..n_components {
        raw_weights.push(rng.gen::<f64>());

        let mean: Vec<f64> = (0..dimensions)
            .map(|_| rng.gen::<f64>() * range - range / 2.0)
            .collect();
        let covariance = random_covariance(dimensions, rng);

        let component = GaussianComponent::new(mean, covariance)
            .map_err(|_| DriftError::NotPositiveDefinite { component: i })?;
        components.push(component);
    }

    Ok((normalize(&raw_weights)?, components))
}

/// Gram matrix of a `d × d` draw whose entries average two `U[-1, 1]` values.
fn random_covariance<R: Rng + ?Sized>(d: usize, rng: &mut R) -> Matrix<f64> {
    let mut x = Matrix::zeros(d, d);
    for j in 0..d {
        for k in 0..d {
            let a = rng.gen::<f64>() * 2.0 - 1.0;
            let b = rng.gen::<f64>() * 2.0 - 1.0;
            x.set(j, k, (a + b) / 2.0);
        }
    }
    x.gram()
}

fn normalize(raw: &[f64]) -> Result<Vec<f64>> {
    let sum: f64 = raw.iter().sum();
    if !sum.is_finite() || sum <= 0.0 {
        return Err(DriftError::DegenerateWeights { sum });
    }
    Ok(raw.iter().map(|w| w / sum).collect())
}

fn chooser(weights: &[f64]) -> Result<WeightedIndex<f64>> {
    WeightedIndex::new(weights).map_err(|_| DriftError::DegenerateWeights {
        sum: weights.iter().sum(),
    })
}

#[cfg(test)]
#[path = "gaussian_tests.rs"]
mod tests;
