//! Error types for drift-stream generation.
//!
//! Every fallible constructor and search in the crate reports through
//! [`DriftError`]; nothing is silently clamped or retried.

use thiserror::Error;

/// Main error type for mixture construction, estimation and calibration.
///
/// # Examples
///
/// ```
/// use driftmix::error::DriftError;
///
/// let err = DriftError::DimensionMismatch {
///     expected: "point=3".to_string(),
///     actual: "2".to_string(),
/// };
/// assert!(err.to_string().contains("dimension mismatch"));
/// ```
#[derive(Debug, Error)]
pub enum DriftError {
    /// A construction parameter is outside its domain.
    #[error("Invalid hyperparameter: {param} = {value}, expected {constraint}")]
    InvalidHyperparameter {
        /// Parameter name
        param: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// Vector or matrix dimensions don't agree.
    #[error("Matrix dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimensions description
        expected: String,
        /// Actual dimensions found
        actual: String,
    },

    /// Mixture weights cannot be normalized into a simplex.
    #[error("Cannot normalize mixture weights: sum = {sum}")]
    DegenerateWeights {
        /// Sum of the raw weights
        sum: f64,
    },

    /// A component covariance has no Cholesky factor.
    #[error("Covariance of component {component} is not positive definite")]
    NotPositiveDefinite {
        /// Offending component index
        component: usize,
    },

    /// Component index outside the mixture.
    #[error("index {index} out of bounds (len={len})")]
    IndexOutOfBounds {
        /// Requested index
        index: usize,
        /// Number of components
        len: usize,
    },

    /// The calibration search ran out of attempts without meeting tolerance.
    #[error(
        "Calibration exhausted after {outer_attempts} reference draws and {inner_attempts} estimates, last distance = {last_distance}"
    )]
    CalibrationExhausted {
        /// Reference mixtures drawn
        outer_attempts: usize,
        /// Hellinger estimates computed
        inner_attempts: usize,
        /// Last estimated distance
        last_distance: f64,
    },

    /// Configuration could not be parsed.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DriftError {
    /// Create a dimension mismatch error with descriptive context
    #[must_use]
    pub fn dimension_mismatch(context: &str, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            expected: format!("{context}={expected}"),
            actual: format!("{actual}"),
        }
    }

    /// Create an invalid hyperparameter error
    #[must_use]
    pub fn invalid(param: &str, value: impl ToString, constraint: &str) -> Self {
        Self::InvalidHyperparameter {
            param: param.to_string(),
            value: value.to_string(),
            constraint: constraint.to_string(),
        }
    }
}

impl From<serde_json::Error> for DriftError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, DriftError>;
