//! Job source and result sink

use crate::error::{WorkerError, WorkerResult};
use crate::job::{Job, JobResult};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Timeout of a single portal request
pub const PORTAL_TIMEOUT: Duration = Duration::from_secs(10);

#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Next pending job, `None` when the queue is empty
    async fn dequeue(&self) -> WorkerResult<Option<Job>>;

    async fn report(&self, result: &JobResult) -> WorkerResult<()>;
}

/// The portal's internal job API
#[derive(Debug, Clone)]
pub struct PortalClient {
    client: Client,
    base_url: Url,
}

impl PortalClient {
    pub fn new(portal_url: &str) -> WorkerResult<Self> {
        let base_url = Url::parse(portal_url).map_err(|e| WorkerError::InvalidUrl {
            url: portal_url.to_string(),
            reason: e.to_string(),
        })?;
        let client = Client::builder()
            .timeout(PORTAL_TIMEOUT)
            .build()
            .map_err(|e| WorkerError::Client(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    fn url(&self, path: &str) -> WorkerResult<Url> {
        self.base_url.join(path).map_err(|e| WorkerError::InvalidUrl {
            url: path.to_string(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl JobQueue for PortalClient {
    async fn dequeue(&self) -> WorkerResult<Option<Job>> {
        let response = self
            .client
            .get(self.url("/internal/job")?)
            .send()
            .await
            .map_err(|e| WorkerError::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            debug!("No pending job");
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WorkerError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Job>()
            .await
            .map(Some)
            .map_err(|e| WorkerError::Decode(e.to_string()))
    }

    async fn report(&self, result: &JobResult) -> WorkerResult<()> {
        let url = self.url(&format!("/internal/job/{}/result", result.id))?;
        let response = self
            .client
            .post(url)
            .json(result)
            .send()
            .await
            .map_err(|e| WorkerError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WorkerError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}
