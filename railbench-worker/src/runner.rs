//! Runs the benchmarker as a child process

use crate::alert::{Alert, Alerter};
use crate::error::{WorkerError, WorkerResult};
use crate::job::{Job, JobResult, JobStatus};
use parking_lot::Mutex;
use railbench_config::WorkerConfig;
use railbench_core::BenchResult;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Score reported when the benchmarker produced no readable result
pub const UNAVAILABLE_SCORE: i64 = -1;

pub const RESULTS_UNAVAILABLE: &str = "benchmark results unavailable, please contact the organizers";
pub const BENCHMARK_TIMED_OUT: &str = "the benchmark timed out";

/// How long to keep reading output after the process is gone
const OUTPUT_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

type Captured = Arc<Mutex<Vec<u8>>>;

/// Read `reader` to the end, appending as data arrives so a partial capture
/// survives an abandoned reader
fn capture<R>(mut reader: R) -> (Captured, JoinHandle<()>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let buffer: Captured = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&buffer);
    let handle = tokio::spawn(async move {
        let mut chunk = [0u8; 8192];
        loop {
            match reader.read(&mut chunk).await {
                Ok(0) | Err(_) => break,
                Ok(n) => sink.lock().extend_from_slice(&chunk[..n]),
            }
        }
    });
    (buffer, handle)
}

async fn drain(handle: Option<JoinHandle<()>>) {
    if let Some(handle) = handle {
        if tokio::time::timeout(OUTPUT_DRAIN_TIMEOUT, handle).await.is_err() {
            warn!("Benchmarker output still open after exit, keeping what was read");
        }
    }
}

fn text(buffer: &Option<Captured>) -> String {
    buffer
        .as_ref()
        .map(|b| String::from_utf8_lossy(&b.lock()).into_owned())
        .unwrap_or_default()
}

/// The first `limit` messages, one per line
pub fn join_messages(messages: &[String], limit: usize) -> String {
    messages
        .iter()
        .take(limit)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(",\n")
}

pub struct BenchmarkRunner {
    config: WorkerConfig,
    alerter: Arc<dyn Alerter>,
}

impl BenchmarkRunner {
    pub fn new(config: WorkerConfig, alerter: Arc<dyn Alerter>) -> Self {
        Self { config, alerter }
    }

    fn command(&self, target_url: &str) -> Command {
        let mut command = Command::new(&self.config.benchmarker_path);
        command
            .arg("run")
            .arg(format!("--payment={}", self.config.payment_url))
            .arg(format!("--target={}", target_url))
            .arg(format!("--assetdir={}", self.config.asset_dir))
            .arg(format!(
                "--webhookurl={}",
                self.config.webhook_url.as_deref().unwrap_or_default()
            ))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }

    /// Benchmark the team of `job`.
    ///
    /// Only a job without a usable server is an error; every other failure
    /// becomes a failed result so it still reaches the portal.
    pub async fn run(&self, job: &Job) -> WorkerResult<JobResult> {
        let server = job.target_server().ok_or_else(|| {
            WorkerError::NoTargetServer {
                team_id: job.team.id,
            }
        })?;
        let target_url = format!("https://{}:{}", server.global_ip.trim(), self.config.target_port);

        info!(
            job_id = job.id,
            team_id = job.team.id,
            target = %target_url,
            benchmarker = %self.config.benchmarker_path,
            "Starting benchmarker"
        );

        let mut child = match self.command(&target_url).spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!(job_id = job.id, "Could not start the benchmarker: {}", e);
                self.alerter
                    .notify(&Alert::for_job(job, "could not start the benchmarker").with_detail(e.to_string()))
                    .await;
                return Ok(JobResult {
                    score: UNAVAILABLE_SCORE,
                    ..JobResult::failed(job.id, RESULTS_UNAVAILABLE)
                });
            }
        };

        let (stdout_buf, stdout_task) = match child.stdout.take() {
            Some(out) => {
                let (buf, task) = capture(out);
                (Some(buf), Some(task))
            }
            None => (None, None),
        };
        let (stderr_buf, stderr_task) = match child.stderr.take() {
            Some(err) => {
                let (buf, task) = capture(err);
                (Some(buf), Some(task))
            }
            None => (None, None),
        };

        let status = match tokio::time::timeout(self.config.bench_timeout, child.wait()).await {
            Ok(Ok(exit)) if exit.success() => JobStatus::Succeeded,
            Ok(Ok(exit)) => {
                warn!(job_id = job.id, code = ?exit.code(), "Benchmarker exited with failure");
                JobStatus::Failed
            }
            Ok(Err(e)) => {
                warn!(job_id = job.id, "Waiting for the benchmarker failed: {}", e);
                JobStatus::Failed
            }
            Err(_) => {
                warn!(
                    job_id = job.id,
                    timeout_secs = self.config.bench_timeout.as_secs(),
                    "Benchmarker timed out, killing it"
                );
                if let Err(e) = child.kill().await {
                    warn!(job_id = job.id, "Could not kill the benchmarker: {}", e);
                }
                JobStatus::TimedOut
            }
        };

        drain(stdout_task).await;
        drain(stderr_task).await;
        let stdout = text(&stdout_buf);
        let stderr = text(&stderr_buf);
        debug!(job_id = job.id, stdout = %stdout, "Benchmarker output");

        let result = self.interpret(job, status, stdout, stderr);
        if result.status != JobStatus::Succeeded {
            let message = match result.status {
                JobStatus::TimedOut => "benchmark timed out",
                _ => "benchmark failed",
            };
            self.alerter
                .notify(&Alert::for_job(job, message).with_detail(result.reason.clone()).with_output(&result))
                .await;
        }

        Ok(result)
    }

    fn interpret(&self, job: &Job, status: JobStatus, stdout: String, stderr: String) -> JobResult {
        match BenchResult::from_output(&stdout) {
            Some(Ok(bench)) => JobResult {
                id: job.id,
                status,
                passed: bench.pass,
                score: bench.score,
                reason: join_messages(&bench.messages, self.config.message_limit),
                stdout,
                stderr,
            },
            parsed => {
                if let Some(Err(e)) = parsed {
                    warn!(job_id = job.id, "Benchmark result is not valid JSON: {}", e);
                }
                let (status, reason) = match status {
                    JobStatus::TimedOut => (JobStatus::TimedOut, BENCHMARK_TIMED_OUT),
                    _ => (JobStatus::Failed, RESULTS_UNAVAILABLE),
                };
                JobResult {
                    id: job.id,
                    status,
                    passed: false,
                    score: UNAVAILABLE_SCORE,
                    reason: reason.to_string(),
                    stdout,
                    stderr,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_messages_limits() {
        let messages: Vec<String> = (1..=5).map(|i| format!("m{}", i)).collect();
        assert_eq!(join_messages(&messages, 2), "m1,\nm2");
        assert_eq!(join_messages(&messages, 10).matches(",\n").count(), 4);
        assert_eq!(join_messages(&[], 3), "");
    }
}
