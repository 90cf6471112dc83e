//! Result submission with retries

use crate::alert::{Alert, Alerter};
use crate::error::{WorkerError, WorkerResult};
use crate::job::{Job, JobResult};
use crate::queue::JobQueue;
use railbench_config::WorkerConfig;
use railbench_resilience::{RetryExecutor, RetryPolicy};
use std::sync::Arc;
use tracing::{error, info};

/// Reports job results to the portal, retrying at a fixed interval
pub struct Reporter {
    queue: Arc<dyn JobQueue>,
    retry: RetryExecutor,
    alerter: Arc<dyn Alerter>,
}

impl Reporter {
    pub fn new(queue: Arc<dyn JobQueue>, policy: RetryPolicy, alerter: Arc<dyn Alerter>) -> Self {
        Self {
            queue,
            retry: RetryExecutor::new(policy),
            alerter,
        }
    }

    pub fn from_config(
        config: &WorkerConfig,
        queue: Arc<dyn JobQueue>,
        alerter: Arc<dyn Alerter>,
    ) -> Self {
        Self::new(
            queue,
            RetryPolicy::with_retries(config.retry_limit, config.retry_interval),
            alerter,
        )
    }

    /// Submit `result`. An operator is alerted when every attempt fails.
    pub async fn report(&self, job: &Job, result: &JobResult) -> WorkerResult<()> {
        let outcome = self
            .retry
            .execute(|| self.queue.report(result))
            .await;

        match outcome {
            Ok(()) => {
                info!(
                    job_id = job.id,
                    status = result.status.as_str(),
                    passed = result.passed,
                    score = result.score,
                    "Reported benchmark result"
                );
                Ok(())
            }
            Err(retry_error) => {
                let attempts = retry_error.attempts();
                let last_error: WorkerError = retry_error.into_inner();
                error!(
                    job_id = job.id,
                    attempts,
                    "Giving up reporting benchmark result: {}",
                    last_error
                );
                let alert = Alert::for_job(
                    job,
                    format!("could not report the result after {} attempts", attempts),
                )
                .with_detail(format!(
                    "{} (status {}, passed {}, score {})",
                    last_error,
                    result.status.as_str(),
                    result.passed,
                    result.score
                ))
                .with_output(result);
                self.alerter.notify(&alert).await;
                Err(last_error)
            }
        }
    }
}
