//! Queue polling loop

use crate::job::JobResult;
use crate::queue::JobQueue;
use crate::reporter::Reporter;
use crate::runner::BenchmarkRunner;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

/// Runs jobs one at a time as they appear in the queue.
///
/// Reports are submitted in the background so a slow portal does not hold
/// up the next job.
pub struct Dispatcher {
    queue: Arc<dyn JobQueue>,
    runner: BenchmarkRunner,
    reporter: Arc<Reporter>,
    interval: Duration,
    tracker: TaskTracker,
}

impl Dispatcher {
    pub fn new(
        queue: Arc<dyn JobQueue>,
        runner: BenchmarkRunner,
        reporter: Reporter,
        interval: Duration,
    ) -> Self {
        Self {
            queue,
            runner,
            reporter: Arc::new(reporter),
            interval,
            tracker: TaskTracker::new(),
        }
    }

    /// Poll until `shutdown` is cancelled, then wait for pending reports.
    ///
    /// A benchmark already running when shutdown arrives is finished and
    /// reported. Returns the number of jobs processed.
    pub async fn run(&self, shutdown: CancellationToken) -> u64 {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut processed = 0u64;

        info!(interval_ms = self.interval.as_millis() as u64, "Worker started");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let job = match self.queue.dequeue().await {
                Ok(Some(job)) => job,
                Ok(None) => continue,
                Err(e) => {
                    warn!("Could not fetch a job: {}", e);
                    continue;
                }
            };

            info!(job_id = job.id, team_id = job.team.id, "Dequeued job");
            let result = match self.runner.run(&job).await {
                Ok(result) => result,
                Err(e) => {
                    warn!(job_id = job.id, "Job could not be run: {}", e);
                    JobResult::failed(job.id, e.to_string())
                }
            };
            processed += 1;

            let reporter = Arc::clone(&self.reporter);
            self.tracker.spawn(async move {
                // Failures are alerted by the reporter
                let _ = reporter.report(&job, &result).await;
            });
        }

        self.tracker.close();
        debug!(pending = self.tracker.len(), "Waiting for pending reports");
        self.tracker.wait().await;
        info!(processed, "Worker stopped");
        processed
    }
}
