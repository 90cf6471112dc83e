use clap::Parser;
use railbench_cli::cli::{RunArgs, WorkerCli};
use railbench_cli::commands::run::{apply_run_args, notify_failure, run_benchmark};
use railbench_cli::commands::worker::apply_worker_args;
use railbench_config::RailbenchConfig;
use railbench_core::BenchResult;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[test]
fn test_run_flags_override_config() {
    let mut config = RailbenchConfig::default();
    config.benchmark.webhook_url = Some("http://hooks.local/abc".to_string());

    let args = RunArgs {
        target: Some("https://203.0.113.7:443".to_string()),
        payment: Some("http://pay.local:5000".to_string()),
        assetdir: Some("/srv/assets".to_string()),
        webhookurl: Some(String::new()),
    };
    apply_run_args(&mut config, &args).unwrap();

    assert_eq!(config.benchmark.target_url, "https://203.0.113.7:443");
    assert_eq!(config.benchmark.payment_url, "http://pay.local:5000");
    assert_eq!(config.benchmark.asset_dir, "/srv/assets");
    assert_eq!(config.benchmark.webhook_url, None);
}

#[test]
fn test_invalid_target_is_rejected() {
    let mut config = RailbenchConfig::default();
    let args = RunArgs {
        target: Some("not a url".to_string()),
        ..RunArgs::default()
    };
    assert!(apply_run_args(&mut config, &args).is_err());
}

#[tokio::test]
async fn test_missing_asset_dir_gives_empty_failed_result() {
    let dir = TempDir::new().unwrap();
    let mut config = RailbenchConfig::default();
    config.benchmark.asset_dir = dir.path().join("missing").display().to_string();

    let result = run_benchmark(&config).await;

    assert!(!result.pass);
    assert_eq!(result.score, 0);
    assert!(result.messages.is_empty());
    assert_eq!(result.available_days, 10);
}

#[tokio::test]
async fn test_unreachable_service_fails_initialize() {
    let dir = TempDir::new().unwrap();
    let mut config = RailbenchConfig::default();
    config.benchmark.asset_dir = dir.path().display().to_string();
    config.benchmark.target_url = "http://127.0.0.1:1".to_string();
    config.benchmark.payment_url = "http://127.0.0.1:1".to_string();
    config.http.initialize_timeout = Duration::from_secs(2);

    let result = run_benchmark(&config).await;

    assert!(!result.pass);
    assert_eq!(result.score, 0);
    assert_eq!(result.messages.len(), 1);
    let line = result.to_json_line().unwrap();
    assert!(!line.contains('\n'));
}

#[tokio::test]
async fn test_failed_run_alerts_webhook() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .and(body_string_contains("POST /initialize: unexpected status code 500"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = RailbenchConfig::default();
    config.benchmark.webhook_url = Some(format!("{}/hook", server.uri()));
    let result = BenchResult::failed(
        vec!["POST /initialize: unexpected status code 500".to_string()],
        10,
        "",
    );

    notify_failure(&config, &result).await;
}

#[tokio::test]
async fn test_passing_run_does_not_alert() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = RailbenchConfig::default();
    config.benchmark.webhook_url = Some(format!("{}/hook", server.uri()));
    let result = BenchResult {
        pass: true,
        score: 1200,
        messages: Vec::new(),
        available_days: 30,
        language: "rust".to_string(),
    };

    notify_failure(&config, &result).await;
}

#[test]
fn test_worker_reads_benchworker_environment() {
    temp_env::with_vars(
        [
            ("BENCHWORKER_PORTAL_URL", Some("http://portal.local:8000")),
            ("BENCHWORKER_TARGET_PORT", Some("8443")),
            ("BENCHWORKER_RETRY_LIMIT", Some("4")),
            ("BENCHWORKER_RETRY_INTERVAL", Some("7")),
            ("BENCHWORKER_MESSAGE_LIMIT", Some("3")),
        ],
        || {
            let cli = WorkerCli::try_parse_from(["railbench-worker"]).unwrap();
            let mut config = RailbenchConfig::default();
            apply_worker_args(&mut config, &cli).unwrap();

            assert_eq!(config.worker.portal_url, "http://portal.local:8000");
            assert_eq!(config.worker.target_port, 8443);
            assert_eq!(config.worker.retry_limit, 4);
            assert_eq!(config.worker.retry_interval, Duration::from_secs(7));
            assert_eq!(config.worker.message_limit, 3);
        },
    );
}

#[test]
fn test_worker_rejects_zero_retry_limit() {
    let cli = WorkerCli::try_parse_from(["railbench-worker", "--retry-limit", "0"]).unwrap();
    let mut config = RailbenchConfig::default();
    assert!(apply_worker_args(&mut config, &cli).is_err());
}
