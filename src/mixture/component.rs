//! A single multivariate Gaussian with a cached Cholesky factor.

use crate::primitives::Matrix;
use rand::Rng;
use std::f64::consts::PI;

/// Multivariate normal `N(mean, covariance)`.
///
/// The Cholesky factor and log-normalizer are computed once so that density
/// evaluation costs one triangular solve.
#[derive(Debug, Clone)]
pub struct GaussianComponent {
    mean: Vec<f64>,
    covariance: Matrix<f64>,
    /// Lower Cholesky factor of `covariance`.
    factor: Matrix<f64>,
    /// `-(d·ln(2π) + ln|Σ|) / 2`
    log_norm: f64,
}

impl GaussianComponent {
    /// Creates a component, factorizing the covariance.
    ///
    /// # Errors
    ///
    /// Returns an error if the covariance is not `d × d` for `d = mean.len()`
    /// or is not positive definite.
    pub fn new(mean: Vec<f64>, covariance: Matrix<f64>) -> Result<Self, &'static str> {
        let d = mean.len();
        if covariance.shape() != (d, d) {
            return Err("Covariance must be square with side equal to the mean length");
        }
        let factor = covariance.cholesky()?;
        let log_det: f64 = (0..d).map(|i| factor.get(i, i).ln()).sum::<f64>() * 2.0;
        let log_norm = -0.5 * (d as f64 * (2.0 * PI).ln() + log_det);

        Ok(Self {
            mean,
            covariance,
            factor,
            log_norm,
        })
    }

    /// Mean vector.
    #[must_use]
    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    /// Covariance matrix.
    #[must_use]
    pub fn covariance(&self) -> &Matrix<f64> {
        &self.covariance
    }

    /// Dimensionality.
    #[must_use]
    pub fn dimensions(&self) -> usize {
        self.mean.len()
    }

    /// Same covariance, new mean. The factorization is reused.
    pub(crate) fn set_mean(&mut self, mean: Vec<f64>) {
        debug_assert_eq!(mean.len(), self.mean.len());
        self.mean = mean;
    }

    /// Probability density at `x`.
    #[must_use]
    pub fn pdf(&self, x: &[f64]) -> f64 {
        self.log_pdf(x).exp()
    }

    /// Log probability density at `x`.
    ///
    /// A point of the wrong length has zero density.
    #[must_use]
    pub fn log_pdf(&self, x: &[f64]) -> f64 {
        if x.len() != self.mean.len() {
            return f64::NEG_INFINITY;
        }
        let centered: Vec<f64> = x.iter().zip(&self.mean).map(|(xi, mi)| xi - mi).collect();

        // Solve L·y = (x - mean); the Mahalanobis distance is |y|².
        match self.factor.forward_substitute(&centered) {
            Ok(y) => self.log_norm - 0.5 * y.iter().map(|v| v * v).sum::<f64>(),
            Err(_) => f64::NEG_INFINITY,
        }
    }

    /// Draws `mean + L·z` with `z ~ N(0, I)`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<f64> {
        let d = self.mean.len();
        let z: Vec<f64> = (0..d).map(|_| standard_normal(rng)).collect();
        (0..d)
            .map(|i| {
                let offset: f64 = (0..=i).map(|j| self.factor.get(i, j) * z[j]).sum();
                self.mean[i] + offset
            })
            .collect()
    }
}

/// Sample standard normal using Box-Muller transform
pub(crate) fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    // 1 - U keeps u1 in (0, 1] so the log is finite.
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}
