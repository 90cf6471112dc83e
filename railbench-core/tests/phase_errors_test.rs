//! Concurrent accounting against shared phase counters

use railbench_config::ScoringConfig;
use railbench_core::*;
use std::sync::Arc;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_additions_are_all_counted() {
    let errors = Arc::new(PhaseErrors::new(PenaltyPolicy::default()));

    let mut handles = Vec::new();
    for i in 0..64 {
        let errors = Arc::clone(&errors);
        handles.push(tokio::spawn(async move {
            let err = if i % 2 == 0 {
                BenchError::timeout(format!("request {}", i))
            } else {
                BenchError::application(format!("request {}", i))
            };
            errors.benchmark().add_error(err);
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let snapshot = errors.benchmark().snapshot();
    assert_eq!(snapshot.timeout, 32);
    assert_eq!(snapshot.application, 32);
    assert_eq!(errors.benchmark().messages().len(), 64);
}

#[test]
fn test_penalty_follows_configured_policy() {
    let scoring = ScoringConfig {
        application_weight: 1,
        trivial_threshold: 2,
        trivial_weight: 100,
        trivial_per_count: 2,
        ..ScoringConfig::default()
    };
    let errors = PhaseErrors::new(PenaltyPolicy::from(&scoring));
    let benchmark = errors.benchmark();

    benchmark.add_error(BenchError::application("wrong fare"));
    benchmark.add_error(BenchError::timeout("slow"));
    benchmark.add_error(BenchError::temporary("reset"));
    assert_eq!(benchmark.penalty(), 1);

    benchmark.add_error(BenchError::timeout("slow"));
    assert_eq!(benchmark.penalty(), 1 + 100 * 2);
}

#[test]
fn test_application_volume_disqualifies() {
    let scoring = ScoringConfig {
        application_failure_threshold: 3,
        ..ScoringConfig::default()
    };
    let errors = PhaseErrors::new(PenaltyPolicy::from(scoring));
    for _ in 0..3 {
        errors.benchmark().add_error(BenchError::application("bad"));
    }
    assert!(!errors.benchmark().is_failure());

    errors.benchmark().add_error(BenchError::application("bad"));
    assert!(errors.benchmark().is_failure());
}

#[test]
fn test_result_messages_are_deduplicated() {
    let errors = PhaseErrors::default();
    for _ in 0..3 {
        errors.benchmark().add_error(BenchError::timeout("GET /api/train/search"));
    }
    let messages = unique_messages(errors.benchmark().messages());
    assert_eq!(messages, vec!["GET /api/train/search (timed out)".to_string()]);
}
