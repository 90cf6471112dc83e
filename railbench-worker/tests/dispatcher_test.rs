#![cfg(unix)]

use railbench_config::WorkerConfig;
use railbench_worker::{
    alerter_from_config, BenchmarkRunner, Dispatcher, JobQueue, PortalClient, Reporter,
};
use serde_json::{json, Value};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_partial_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn write_script(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("bench.sh");
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn job_payload() -> Value {
    json!({
        "id": 42,
        "team": {
            "id": 7,
            "name": "crabs",
            "servers": [{"hostname": "app1", "global_ip": "203.0.113.10", "private_ip": "10.0.0.10"}]
        }
    })
}

async fn mount_single_job(portal: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/internal/job"))
        .respond_with(ResponseTemplate::new(200).set_body_json(job_payload()))
        .up_to_n_times(1)
        .mount(portal)
        .await;
    Mock::given(method("GET"))
        .and(path("/internal/job"))
        .respond_with(ResponseTemplate::new(204))
        .mount(portal)
        .await;
}

fn worker_config(portal: &MockServer, script: &Path) -> WorkerConfig {
    WorkerConfig {
        portal_url: portal.uri(),
        benchmarker_path: script.display().to_string(),
        dequeue_interval: Duration::from_millis(50),
        retry_limit: 3,
        retry_interval: Duration::from_millis(50),
        bench_timeout: Duration::from_secs(10),
        ..WorkerConfig::default()
    }
}

fn dispatcher(config: &WorkerConfig) -> Dispatcher {
    let alerter = alerter_from_config(config.webhook_url.as_deref());
    let queue: Arc<dyn JobQueue> = Arc::new(PortalClient::new(&config.portal_url).unwrap());
    let runner = BenchmarkRunner::new(config.clone(), alerter.clone());
    let reporter = Reporter::from_config(config, queue.clone(), alerter);
    Dispatcher::new(queue, runner, reporter, config.dequeue_interval)
}

async fn run_for(dispatcher: Dispatcher, duration: Duration) -> u64 {
    let shutdown = CancellationToken::new();
    let handle = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move { dispatcher.run(shutdown).await })
    };
    tokio::time::sleep(duration).await;
    shutdown.cancel();
    handle.await.unwrap()
}

fn result_posts(requests: &[wiremock::Request]) -> Vec<Value> {
    requests
        .iter()
        .filter(|r| r.url.path() == "/internal/job/42/result")
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect()
}

#[tokio::test]
async fn test_dequeued_job_is_benchmarked_and_reported() {
    let portal = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let script = write_script(
        dir.path(),
        r#"echo '{"pass":true,"score":900,"messages":["ok"],"available_days":30,"language":"rust"}'"#,
    );
    mount_single_job(&portal).await;
    Mock::given(method("POST"))
        .and(path("/internal/job/42/result"))
        .and(body_partial_json(json!({"status": "done", "passed": true, "score": 900})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&portal)
        .await;

    let processed = run_for(dispatcher(&worker_config(&portal, &script)), Duration::from_secs(1)).await;

    assert_eq!(processed, 1);
}

#[tokio::test]
async fn test_timed_out_job_report_is_retried() {
    let portal = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let script = write_script(dir.path(), "exec sleep 30");
    mount_single_job(&portal).await;
    Mock::given(method("POST"))
        .and(path("/internal/job/42/result"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&portal)
        .await;
    Mock::given(method("POST"))
        .and(path("/internal/job/42/result"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&portal)
        .await;

    let config = WorkerConfig {
        bench_timeout: Duration::from_millis(300),
        ..worker_config(&portal, &script)
    };
    let processed = run_for(dispatcher(&config), Duration::from_secs(2)).await;

    assert_eq!(processed, 1);
    let posts = result_posts(&portal.received_requests().await.unwrap());
    assert_eq!(posts.len(), 3);
    let last = posts.last().unwrap();
    assert_eq!(last["status"], "aborted");
    assert_eq!(last["passed"], false);
    assert_eq!(last["score"], -1);
}

#[tokio::test]
async fn test_unreportable_result_alerts_webhook() {
    let portal = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let script = write_script(
        dir.path(),
        r#"echo '{"pass":true,"score":10,"messages":[]}'"#,
    );
    mount_single_job(&portal).await;
    Mock::given(method("POST"))
        .and(path("/internal/job/42/result"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&portal)
        .await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .and(body_string_contains("could not report the result after 3 attempts"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&portal)
        .await;

    let config = WorkerConfig {
        retry_limit: 2,
        webhook_url: Some(format!("{}/hook", portal.uri())),
        ..worker_config(&portal, &script)
    };
    let processed = run_for(dispatcher(&config), Duration::from_secs(1)).await;

    assert_eq!(processed, 1);
}

#[tokio::test]
async fn test_portal_outage_does_not_stop_worker() {
    let portal = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let script = write_script(dir.path(), "exit 0");
    Mock::given(method("GET"))
        .and(path("/internal/job"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&portal)
        .await;

    let processed = run_for(
        dispatcher(&worker_config(&portal, &script)),
        Duration::from_millis(300),
    )
    .await;

    assert_eq!(processed, 0);
    let polls = portal.received_requests().await.unwrap().len();
    assert!(polls >= 2, "worker stopped polling after {} requests", polls);
}
