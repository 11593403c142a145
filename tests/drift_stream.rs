//! End-to-end tests: calibrate, stream, load.

use driftmix::drift::{Concept, Regime};
use driftmix::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn config() -> StreamConfig {
    StreamConfig::default()
        .with_dimensions(2)
        .with_components(3, 4)
        .with_schedule(10, 100)
        .with_drift(0.5, 0.01)
        .with_seeds(42, 42)
        .with_estimator(EstimatorSettings {
            min_samples: 20_000,
            max_samples: 100_000,
        })
}

#[test]
fn calibrated_stream_end_to_end() {
    init_tracing();
    let switched = Arc::new(AtomicUsize::new(0));
    let hook_seen = Arc::clone(&switched);
    let mut stream = ConceptDriftStream::new(&config())
        .expect("calibrates")
        .with_switch_hook(move |classes| hook_seen.store(classes, Ordering::SeqCst));

    let distance = stream.achieved_distance().expect("calibrated");
    assert!((distance - 0.5).abs() <= 0.01, "distance {distance}");

    for _ in 1..=5 {
        let instance = stream.next().expect("endless");
        assert_eq!(instance.concept, Concept::Pre);
        assert_eq!(instance.regime, Regime::Stable);
        assert!(instance.label < 3);
    }

    let instance = stream.nth(194).expect("endless");
    assert_eq!(stream.instances_emitted(), 200);
    assert_eq!(instance.concept, Concept::Post);
    assert!(instance.label < 4);
    assert_eq!(switched.load(Ordering::SeqCst), 4);
}

#[test]
fn calibrated_distance_reproduces() {
    init_tracing();
    let calibrator = DriftCalibrator::from_config(&config()).expect("valid");
    let pair = calibrator.calibrate().expect("calibrates");
    let estimate = calibrator
        .estimator()
        .expect("valid")
        .estimate(pair.pre(), pair.post(), 0.5)
        .expect("same dims");
    assert!(
        (0.49..=0.51).contains(&estimate.distance),
        "re-estimated {}",
        estimate.distance
    );
}

#[test]
fn loader_over_calibrated_stream() {
    init_tracing();
    let stream = ConceptDriftStream::new(&config()).expect("calibrates");
    let mut loader = StreamLoader::new(stream, 500, 50).expect("valid");

    let mut yielded = 0;
    for (features, label) in loader.by_ref() {
        assert_eq!(features.len(), 2);
        assert!(label < 4);
        yielded += 1;
    }
    assert_eq!(yielded, 500);
    assert_eq!(loader.timestamp(), 500);

    let window = loader.decay_dataset();
    assert_eq!(window.x.len(), 50);
    assert_eq!(window.y.len(), 50);
    let source = loader.into_inner();
    assert_eq!(source.instances_emitted(), 500);
}

#[test]
fn config_from_json_drives_stream() {
    let json = r#"{
        "dimensions": 2,
        "n_components_pre": 2,
        "n_components_post": 3,
        "burn_in_instances": 5,
        "drift_duration": 20,
        "drift_magnitude": 0.5,
        "precision": 0.05,
        "estimator": {"min_samples": 5000, "max_samples": 20000}
    }"#;
    let config = StreamConfig::from_json(json).expect("valid json");
    let mut stream = ConceptDriftStream::new(&config).expect("calibrates");
    assert_eq!(stream.dimensions(), 2);
    assert_eq!(stream.first_post(), 26);
    let late = stream.nth(30).expect("endless");
    assert_eq!(late.features.len(), 2);
    assert!(late.label < 3);
    assert_eq!(late.concept, Concept::Post);
}

#[test]
fn streams_are_send() {
    fn assert_send<T: Send>() {}
    assert_send::<ConceptDriftStream>();
    assert_send::<GaussianMixture>();
}
