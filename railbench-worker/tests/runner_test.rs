#![cfg(unix)]

use async_trait::async_trait;
use parking_lot::Mutex;
use railbench_config::WorkerConfig;
use railbench_worker::runner::{BENCHMARK_TIMED_OUT, RESULTS_UNAVAILABLE};
use railbench_worker::{Alert, Alerter, BenchmarkRunner, Job, JobStatus, Server, Team, WorkerError};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

#[derive(Default)]
struct RecordingAlerter {
    alerts: Mutex<Vec<Alert>>,
}

#[async_trait]
impl Alerter for RecordingAlerter {
    async fn notify(&self, alert: &Alert) {
        self.alerts.lock().push(alert.clone());
    }
}

fn write_script(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("bench.sh");
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn config(benchmarker: &Path) -> WorkerConfig {
    WorkerConfig {
        benchmarker_path: benchmarker.display().to_string(),
        bench_timeout: Duration::from_secs(10),
        message_limit: 2,
        ..WorkerConfig::default()
    }
}

fn job() -> Job {
    Job {
        id: 42,
        team: Team {
            id: 7,
            name: "crabs".to_string(),
            servers: vec![Server {
                hostname: "app1".to_string(),
                global_ip: "203.0.113.10".to_string(),
                private_ip: "10.0.0.10".to_string(),
            }],
        },
    }
}

#[tokio::test]
async fn test_successful_run_reports_benchmark_result() {
    let dir = TempDir::new().unwrap();
    let script = write_script(
        dir.path(),
        r#"echo "starting $3" >&2
echo '{"pass":true,"score":1234,"messages":["a","b","c"],"available_days":30,"language":"rust"}'"#,
    );
    let alerter = Arc::new(RecordingAlerter::default());
    let runner = BenchmarkRunner::new(config(&script), alerter.clone());

    let result = runner.run(&job()).await.unwrap();

    assert_eq!(result.id, 42);
    assert_eq!(result.status, JobStatus::Succeeded);
    assert!(result.passed);
    assert_eq!(result.score, 1234);
    assert_eq!(result.reason, "a,\nb");
    assert!(result.stderr.contains("--target=https://203.0.113.10:443"));
    assert!(alerter.alerts.lock().is_empty());
}

#[tokio::test]
async fn test_non_zero_exit_is_aborted_but_keeps_result() {
    let dir = TempDir::new().unwrap();
    let script = write_script(
        dir.path(),
        r#"echo '{"pass":false,"score":0,"messages":["boom"]}'
exit 3"#,
    );
    let alerter = Arc::new(RecordingAlerter::default());
    let runner = BenchmarkRunner::new(config(&script), alerter.clone());

    let result = runner.run(&job()).await.unwrap();

    assert_eq!(result.status, JobStatus::Failed);
    assert_eq!(result.status.as_str(), "aborted");
    assert!(!result.passed);
    assert_eq!(result.reason, "boom");
    assert_eq!(alerter.alerts.lock().len(), 1);
}

#[tokio::test]
async fn test_unparseable_output_scores_unavailable() {
    let dir = TempDir::new().unwrap();
    let script = write_script(dir.path(), "echo 'panicked at somewhere'");
    let alerter = Arc::new(RecordingAlerter::default());
    let runner = BenchmarkRunner::new(config(&script), alerter.clone());

    let result = runner.run(&job()).await.unwrap();

    assert_eq!(result.status, JobStatus::Failed);
    assert_eq!(result.score, -1);
    assert_eq!(result.reason, RESULTS_UNAVAILABLE);
    let alerts = alerter.alerts.lock();
    assert_eq!(alerts.len(), 1);
    assert!(alerts[0].stdout.contains("panicked"));
}

#[tokio::test]
async fn test_timeout_kills_benchmarker_and_keeps_partial_output() {
    let dir = TempDir::new().unwrap();
    let script = write_script(dir.path(), "echo 'halfway'\nexec sleep 30");
    let alerter = Arc::new(RecordingAlerter::default());
    let runner = BenchmarkRunner::new(
        WorkerConfig {
            bench_timeout: Duration::from_millis(500),
            ..config(&script)
        },
        alerter.clone(),
    );

    let started = std::time::Instant::now();
    let result = runner.run(&job()).await.unwrap();

    assert!(started.elapsed() < Duration::from_secs(10));
    assert_eq!(result.status, JobStatus::TimedOut);
    assert_eq!(result.reason, BENCHMARK_TIMED_OUT);
    assert!(result.stdout.contains("halfway"));
    assert_eq!(alerter.alerts.lock()[0].message, "benchmark timed out");
}

#[tokio::test]
async fn test_job_without_global_ip_is_rejected() {
    let alerter = Arc::new(RecordingAlerter::default());
    let runner = BenchmarkRunner::new(WorkerConfig::default(), alerter);
    let mut job = job();
    job.team.servers[0].global_ip.clear();

    let err = runner.run(&job).await.unwrap_err();
    assert!(matches!(err, WorkerError::NoTargetServer { team_id: 7 }));
}

#[tokio::test]
async fn test_missing_benchmarker_fails_the_job() {
    let dir = TempDir::new().unwrap();
    let alerter = Arc::new(RecordingAlerter::default());
    let runner = BenchmarkRunner::new(config(&dir.path().join("missing")), alerter.clone());

    let result = runner.run(&job()).await.unwrap();

    assert_eq!(result.status, JobStatus::Failed);
    assert_eq!(result.score, -1);
    assert_eq!(
        alerter.alerts.lock()[0].message,
        "could not start the benchmarker"
    );
}
