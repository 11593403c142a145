pub(crate) use super::*;
use crate::mixture::GaussianMixture;
use crate::primitives::Matrix;

fn unit_normal_1d(mean: f64) -> GaussianMixture {
    let var = Matrix::from_vec(1, 1, vec![1.0]).expect("1x1");
    GaussianMixture::from_parts(&[1.0], vec![(vec![mean], var)], 0, 0).expect("valid")
}

/// `H² = 1 - exp(-Δ²/8)` for two unit-variance normals `Δ` apart.
fn closed_form(delta: f64) -> f64 {
    (1.0 - (-delta * delta / 8.0).exp()).sqrt()
}

#[test]
fn test_matches_closed_form_for_shifted_normals() {
    let p = unit_normal_1d(-1.0);
    let q = unit_normal_1d(1.0);
    let estimator = HellingerEstimator::new(7, 16.0)
        .expect("valid")
        .with_min_samples(100_000)
        .with_max_samples(1_000_000);

    let estimate = estimator.estimate(&p, &q, 0.0).expect("same dims");
    let expected = closed_form(2.0);
    assert!(
        (estimate.distance - expected).abs() < 0.02,
        "estimated {} vs closed form {expected}",
        estimate.distance
    );
    assert_eq!(estimate.stop, StopReason::Diverged);
    assert_eq!(estimate.samples, 100_001);
}

#[test]
fn test_self_distance_near_zero() {
    let cov_a = Matrix::from_vec(2, 2, vec![0.6, 0.1, 0.1, 0.4]).expect("valid");
    let cov_b = Matrix::from_vec(2, 2, vec![0.3, 0.0, 0.0, 0.5]).expect("valid");
    let m = GaussianMixture::from_parts(
        &[0.3, 0.7],
        vec![(vec![-1.0, 1.0], cov_a), (vec![1.0, 0.0], cov_b)],
        0,
        0,
    )
    .expect("valid");
    let estimator = HellingerEstimator::new(11, 8.0)
        .expect("valid")
        .with_min_samples(200_000)
        .with_max_samples(400_000);

    let estimate = estimator.estimate(&m, &m, 0.5).expect("same dims");
    assert!(estimate.distance < 0.15, "self distance {}", estimate.distance);
    assert!((estimate.integral - 1.0).abs() < 0.03);
}

#[test]
fn test_random_mixture_self_distance_small() {
    let m = GaussianMixture::new(3, 2, 1, 2).expect("valid");
    let estimator = HellingerEstimator::new(3, 7.0)
        .expect("valid")
        .with_min_samples(200_000)
        .with_max_samples(400_000);
    let estimate = estimator.estimate(&m, &m, 0.5).expect("same dims");
    assert!(estimate.distance < 0.2, "self distance {}", estimate.distance);
}

#[test]
fn test_deterministic_for_fixed_seed() {
    let p = unit_normal_1d(0.0);
    let q = unit_normal_1d(0.5);
    let estimator = HellingerEstimator::new(99, 12.0)
        .expect("valid")
        .with_min_samples(10_000)
        .with_max_samples(50_000);
    let first = estimator.estimate(&p, &q, 0.9).expect("same dims");
    let second = estimator.estimate(&p, &q, 0.9).expect("same dims");
    assert_eq!(first, second);
}

#[test]
fn test_sample_cap_when_estimate_tracks_target() {
    let p = unit_normal_1d(-1.0);
    let q = unit_normal_1d(1.0);
    let estimator = HellingerEstimator::new(5, 16.0)
        .expect("valid")
        .with_min_samples(1_000)
        .with_max_samples(20_000);

    let estimate = estimator
        .estimate(&p, &q, closed_form(2.0))
        .expect("same dims");
    assert_eq!(estimate.stop, StopReason::SampleCapReached);
    assert_eq!(estimate.samples, 20_000);
}

#[test]
fn test_rejects_dimension_mismatch() {
    let p = unit_normal_1d(0.0);
    let q = GaussianMixture::new(2, 2, 1, 1).expect("valid");
    let estimator = HellingerEstimator::new(1, 4.0).expect("valid");
    assert!(matches!(
        estimator.estimate(&p, &q, 0.5),
        Err(DriftError::DimensionMismatch { .. })
    ));
}

#[test]
fn test_rejects_bad_range() {
    assert!(HellingerEstimator::new(1, 0.0).is_err());
    assert!(HellingerEstimator::new(1, -3.0).is_err());
    assert!(HellingerEstimator::new(1, f64::NAN).is_err());
    assert!(HellingerEstimator::new(1, f64::INFINITY).is_err());
}

#[test]
fn test_settings_validation() {
    assert!(EstimatorSettings::default().validate().is_ok());
    let zero_min = EstimatorSettings {
        min_samples: 0,
        max_samples: 10,
    };
    assert!(zero_min.validate().is_err());
    let cap_below_min = EstimatorSettings {
        min_samples: 10,
        max_samples: 10,
    };
    assert!(cap_below_min.validate().is_err());

    let settings = EstimatorSettings {
        min_samples: 5,
        max_samples: 50,
    };
    let estimator = HellingerEstimator::with_settings(1, 2.0, &settings).expect("valid");
    assert!((estimator.integrate_range() - 2.0).abs() < f64::EPSILON);
    assert_eq!(estimator.seed(), 1);
}

#[test]
fn test_settings_deserialize_with_defaults() {
    let settings: EstimatorSettings =
        serde_json::from_str(r#"{"min_samples": 1000}"#).expect("valid json");
    assert_eq!(settings.min_samples, 1000);
    assert_eq!(settings.max_samples, DEFAULT_MAX_SAMPLES);
}
