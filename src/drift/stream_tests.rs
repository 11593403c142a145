pub(crate) use super::*;
use crate::monte_carlo::EstimatorSettings;
use std::sync::{Arc, Mutex};

fn uncalibrated(
    burn_in: u64,
    drift_duration: u64,
) -> ConceptDriftStream<GaussianMixture, GaussianMixture> {
    let pre = GaussianMixture::new(3, 2, 1, 2).expect("valid");
    let post = GaussianMixture::new(4, 2, 3, 4).expect("valid");
    ConceptDriftStream::from_densities(pre, post, burn_in, drift_duration, 42).expect("valid")
}

#[test]
fn test_schedule_boundaries() {
    let schedule = DriftSchedule::new(10, 100).expect("valid");
    assert_eq!(schedule.last_pre(), 10);
    assert_eq!(schedule.first_post(), 111);
    assert_eq!(schedule.regime_at(1), Regime::Stable);
    assert_eq!(schedule.regime_at(10), Regime::Stable);
    assert_eq!(schedule.regime_at(11), Regime::Drifting);
    assert_eq!(schedule.regime_at(110), Regime::Drifting);
    assert_eq!(schedule.regime_at(111), Regime::Drifted);
    assert_eq!(schedule.regime_at(10_000), Regime::Drifted);
}

#[test]
fn test_post_probability_rises_linearly() {
    let schedule = DriftSchedule::new(10, 100).expect("valid");
    assert!(schedule.post_probability(10).abs() < f64::EPSILON);
    assert!((schedule.post_probability(11) - 0.01).abs() < 1e-12);
    assert!((schedule.post_probability(60) - 0.5).abs() < 1e-12);
    assert!((schedule.post_probability(110) - 1.0).abs() < 1e-12);
    assert!((schedule.post_probability(111) - 1.0).abs() < f64::EPSILON);
}

#[test]
fn test_zero_duration_rejected() {
    assert!(DriftSchedule::new(10, 0).is_err());
    let pre = GaussianMixture::new(2, 2, 1, 1).expect("valid");
    let post = GaussianMixture::new(2, 2, 2, 2).expect("valid");
    assert!(ConceptDriftStream::from_densities(pre, post, 10, 0, 1).is_err());
}

#[test]
fn test_schedule_deserialize_validates() {
    let schedule: DriftSchedule =
        serde_json::from_str(r#"{"burn_in": 10, "drift_duration": 100}"#).expect("valid");
    assert_eq!(schedule, DriftSchedule::new(10, 100).expect("valid"));

    let json = serde_json::to_string(&schedule).expect("serializable");
    let back: DriftSchedule = serde_json::from_str(&json).expect("round trip");
    assert_eq!(back.first_post(), 111);

    let zero = serde_json::from_str::<DriftSchedule>(r#"{"burn_in": 10, "drift_duration": 0}"#);
    assert!(zero.is_err());
}

#[test]
fn test_dimension_mismatch_rejected() {
    let pre = GaussianMixture::new(2, 2, 1, 1).expect("valid");
    let post = GaussianMixture::new(2, 3, 2, 2).expect("valid");
    assert!(matches!(
        ConceptDriftStream::from_densities(pre, post, 10, 5, 1),
        Err(DriftError::DimensionMismatch { .. })
    ));
}

#[test]
fn test_regimes_in_order() {
    let mut stream = uncalibrated(10, 100);
    for expected_n in 1..=300u64 {
        let instance = stream.next_instance();
        assert_eq!(stream.instances_emitted(), expected_n);
        assert_eq!(instance.features.len(), 2);
        match instance.regime {
            Regime::Stable => {
                assert!(expected_n <= 10);
                assert_eq!(instance.concept, Concept::Pre);
                assert!(instance.label < 3);
            }
            Regime::Drifting => assert!((11..=110).contains(&expected_n)),
            Regime::Drifted => {
                assert!(expected_n >= 111);
                assert_eq!(instance.concept, Concept::Post);
                assert!(instance.label < 4);
            }
        }
        if instance.concept == Concept::Pre {
            assert!(instance.label < 3);
        }
    }
}

#[test]
fn test_switch_hook_fires_once_with_post_classes() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&calls);
    let mut stream = uncalibrated(3, 4).with_switch_hook(move |classes| {
        if let Ok(mut seen) = seen.lock() {
            seen.push(classes);
        }
    });

    for _ in 0..7 {
        stream.next_instance();
    }
    assert!(calls.lock().expect("lock").is_empty());

    stream.next_instance();
    assert_eq!(stream.instances_emitted(), stream.first_post());
    for _ in 0..50 {
        stream.next_instance();
    }
    assert_eq!(*calls.lock().expect("lock"), vec![4]);
}

#[test]
fn test_zero_burn_in_starts_drifting() {
    let mut stream = uncalibrated(0, 1);
    let first = stream.next_instance();
    assert_eq!(first.regime, Regime::Drifting);
    // probability (1 - 0) / 1
    assert_eq!(first.concept, Concept::Post);
    assert_eq!(stream.next_instance().regime, Regime::Drifted);
}

#[test]
fn test_drift_fraction_tracks_schedule() {
    let mut stream = uncalibrated(0, 10_000);
    let first_half = stream
        .by_ref()
        .take(5_000)
        .filter(|i| i.concept == Concept::Post)
        .count();
    let second_half = stream
        .by_ref()
        .take(5_000)
        .filter(|i| i.concept == Concept::Post)
        .count();

    let first = first_half as f64 / 5_000.0;
    let second = second_half as f64 / 5_000.0;
    assert!((first - 0.25).abs() < 0.03, "first half post fraction {first}");
    assert!((second - 0.75).abs() < 0.03, "second half post fraction {second}");
}

#[test]
fn test_deterministic_for_fixed_seeds() {
    let a: Vec<Instance> = uncalibrated(5, 20).take(60).collect();
    let b: Vec<Instance> = uncalibrated(5, 20).take(60).collect();
    assert_eq!(a, b);
}

#[test]
fn test_into_pair() {
    let instance = uncalibrated(5, 5).next_instance();
    let (features, label) = instance.clone().into_pair();
    assert_eq!(features, instance.features);
    assert_eq!(label, instance.label);
}

#[test]
fn test_calibrated_stream() {
    let config = StreamConfig::default()
        .with_schedule(10, 100)
        .with_drift(0.5, 0.05)
        .with_estimator(EstimatorSettings {
            min_samples: 5_000,
            max_samples: 20_000,
        });
    let mut stream = ConceptDriftStream::new(&config).expect("calibrates");

    let distance = stream.achieved_distance().expect("calibrated");
    assert!((distance - 0.5).abs() <= 0.05);
    assert!(stream.report().expect("calibrated").within_tolerance);
    assert_eq!(stream.last_pre(), 10);
    assert_eq!(stream.first_post(), 111);
    assert_eq!(stream.pre().n_components(), 3);
    assert_eq!(stream.post().n_components(), 4);

    let late = stream.nth(199).expect("endless");
    assert_eq!(late.concept, Concept::Post);
    assert!(late.label < 4);
}

#[test]
fn test_invalid_config_rejected() {
    let config = StreamConfig::default().with_schedule(10, 0);
    assert!(ConceptDriftStream::new(&config).is_err());
}
