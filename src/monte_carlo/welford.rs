//! Single-pass mean and variance (Welford's online algorithm).
//!
//! Reference: Welford (1962), "Note on a Method for Calculating Corrected
//! Sums of Squares and Products"

/// Running count, sum, mean and sum of squared deviations.
///
/// # Examples
///
/// ```
/// use driftmix::monte_carlo::OnlineMoments;
///
/// let mut moments = OnlineMoments::new();
/// for x in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
///     moments.push(x);
/// }
/// assert!((moments.mean() - 5.0).abs() < 1e-12);
/// assert!((moments.variance() - 4.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OnlineMoments {
    count: u64,
    sum: f64,
    mean: f64,
    m2: f64,
}

impl OnlineMoments {
    /// Create an empty accumulator
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in one observation.
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        let delta1 = value - self.mean;
        self.mean += delta1 / self.count as f64;
        let delta2 = value - self.mean;
        self.m2 += delta1 * delta2;
    }

    /// Number of observations.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Plain running sum.
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.sum
    }

    /// Running mean (0 when empty).
    #[must_use]
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Population variance `M2 / N`.
    #[must_use]
    pub fn variance(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.m2 / self.count as f64
        }
    }

    /// Unbiased sample variance `M2 / (N - 1)`; `None` below two observations.
    #[must_use]
    pub fn sample_variance(&self) -> Option<f64> {
        (self.count > 1).then(|| self.m2 / (self.count - 1) as f64)
    }

    /// Standard error of the mean, `sqrt(s² / N)`.
    #[must_use]
    pub fn standard_error(&self) -> f64 {
        match self.sample_variance() {
            Some(var) => (var / self.count as f64).sqrt(),
            None => f64::INFINITY,
        }
    }
}
