//! Operator alerts

use crate::job::{Job, JobResult};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, warn};

/// Captured output longer than this is cut in alerts
const OUTPUT_EXCERPT_LEN: usize = 2000;

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// Something an operator has to look at
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Alert {
    pub job_id: u64,
    pub team_id: u64,
    pub team_name: String,
    pub message: String,
    pub detail: Option<String>,
    pub stdout: String,
    pub stderr: String,
}

impl Alert {
    /// An alert raised outside any job
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn for_job(job: &Job, message: impl Into<String>) -> Self {
        Self {
            job_id: job.id,
            team_id: job.team.id,
            team_name: job.team.name.clone(),
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_output(mut self, result: &JobResult) -> Self {
        self.stdout = result.stdout.clone();
        self.stderr = result.stderr.clone();
        self
    }

    pub fn text(&self) -> String {
        // Job ids start at 1
        let mut text = if self.job_id == 0 {
            self.message.clone()
        } else {
            format!(
                "[job {}] team {} ({}): {}",
                self.job_id, self.team_id, self.team_name, self.message
            )
        };
        if let Some(detail) = &self.detail {
            text.push_str(&format!("\ndetail: {}", detail));
        }
        if !self.stdout.is_empty() {
            text.push_str(&format!("\nstdout: {}", excerpt(&self.stdout)));
        }
        if !self.stderr.is_empty() {
            text.push_str(&format!("\nstderr: {}", excerpt(&self.stderr)));
        }
        text
    }
}

fn excerpt(output: &str) -> &str {
    match output.char_indices().nth(OUTPUT_EXCERPT_LEN) {
        Some((idx, _)) => &output[..idx],
        None => output,
    }
}

/// Never fails; delivery problems are logged
#[async_trait]
pub trait Alerter: Send + Sync {
    async fn notify(&self, alert: &Alert);
}

/// Posts `{"text": ...}` to a chat webhook
#[derive(Debug, Clone)]
pub struct WebhookAlerter {
    client: Client,
    url: String,
}

impl WebhookAlerter {
    pub fn new(url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(WEBHOOK_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl Alerter for WebhookAlerter {
    async fn notify(&self, alert: &Alert) {
        let payload = json!({ "text": alert.text() });
        match self.client.post(&self.url).json(&payload).send().await {
            Ok(response) if response.status().is_success() => {}
            Ok(response) => warn!(
                status = response.status().as_u16(),
                job_id = alert.job_id,
                "Alert webhook rejected the alert"
            ),
            Err(e) => warn!(job_id = alert.job_id, "Alert webhook unreachable: {}", e),
        }
    }
}

/// Writes alerts to the log
#[derive(Debug, Clone, Default)]
pub struct LogAlerter;

#[async_trait]
impl Alerter for LogAlerter {
    async fn notify(&self, alert: &Alert) {
        error!(
            job_id = alert.job_id,
            team_id = alert.team_id,
            detail = alert.detail.as_deref().unwrap_or(""),
            "{}",
            alert.message
        );
    }
}

/// Webhook alerts when a URL is configured, log alerts otherwise
pub fn alerter_from_config(webhook_url: Option<&str>) -> Arc<dyn Alerter> {
    match webhook_url.filter(|url| !url.trim().is_empty()) {
        Some(url) => Arc::new(WebhookAlerter::new(url)),
        None => Arc::new(LogAlerter),
    }
}
