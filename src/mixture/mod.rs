//! Gaussian mixture models used as both densities and samplers.
//!
//! - [`GaussianMixture`]: randomly structured mixture with independent
//!   structure and sampling generators
//! - [`DriftBlendedMixture`]: mixture blended towards a reference to dial in a
//!   drift magnitude
//! - [`MixtureDensity`]: the interface the estimator and the stream program
//!   against, so neither needs to know which variant it holds

mod blended;
mod component;
mod gaussian;

pub use blended::DriftBlendedMixture;
pub use component::GaussianComponent;
pub use gaussian::GaussianMixture;

/// A probability density over `R^d` that can also be sampled.
///
/// # Examples
///
/// ```
/// use driftmix::mixture::{GaussianMixture, MixtureDensity};
///
/// let mut mixture = GaussianMixture::new(3, 2, 7, 11).expect("valid sizes");
/// let (point, label) = mixture.sample();
/// assert_eq!(point.len(), 2);
/// assert!(label < 3);
/// assert!(mixture.density_at(&point) >= 0.0);
/// ```
pub trait MixtureDensity {
    /// Dimensionality of the sample space.
    fn dimensions(&self) -> usize;

    /// Number of mixture components (and therefore of distinct labels).
    fn n_components(&self) -> usize;

    /// Probability density at `point`.
    ///
    /// `point.len()` must equal [`dimensions`](Self::dimensions).
    fn density_at(&self, point: &[f64]) -> f64;

    /// Draws a point and the index of the component that produced it.
    fn sample(&mut self) -> (Vec<f64>, usize);
}
