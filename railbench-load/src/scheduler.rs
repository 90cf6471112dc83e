//! Concurrency-limited load scheduler

use async_trait::async_trait;
use railbench_core::PhaseErrors;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Semaphore, TryAcquireError};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{info, warn};

/// How long the scheduler waits before retrying when every permit is taken
const PERMIT_RETRY_INTERVAL: Duration = Duration::from_millis(5);

/// One unit of load, run repeatedly by the scheduler
#[async_trait]
pub trait Workload: Send + Sync + 'static {
    /// Run one unit. Implementations check `cancel` between steps.
    async fn run_unit(&self, cancel: CancellationToken);
}

/// Outcome of a scheduler run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerReport {
    pub units_launched: u64,
    /// The run stopped early because the benchmark counters disqualified it
    pub disqualified: bool,
}

/// Keeps up to `weight` load units in flight until the deadline.
///
/// Every unit holds one semaphore permit for its whole life and runs on a
/// task tracker, so the scheduler can wait for all of them before the
/// benchmark counters are finalized.
pub struct LoadScheduler {
    weight: usize,
    permits: Arc<Semaphore>,
    errors: Arc<PhaseErrors>,
    cancel: CancellationToken,
    tracker: TaskTracker,
}

impl LoadScheduler {
    pub fn new(weight: u32, errors: Arc<PhaseErrors>) -> Self {
        let weight = weight.max(1) as usize;
        info!("Load level {}", weight);

        Self {
            weight,
            permits: Arc::new(Semaphore::new(weight)),
            errors,
            cancel: CancellationToken::new(),
            tracker: TaskTracker::new(),
        }
    }

    pub fn weight(&self) -> usize {
        self.weight
    }

    /// Token observed by every running unit
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Launch units until `deadline` elapses or the run is disqualified,
    /// then stop all units, wait for them and finalize the benchmark phase.
    pub async fn run<W: Workload>(&self, deadline: Duration, workload: Arc<W>) -> SchedulerReport {
        let deadline_at = Instant::now() + deadline;
        let mut units_launched = 0u64;
        let mut disqualified = false;

        loop {
            if Instant::now() >= deadline_at || self.cancel.is_cancelled() {
                break;
            }

            if self.errors.benchmark().is_failure() {
                warn!("Benchmark disqualified, stopping load early");
                disqualified = true;
                break;
            }

            match Arc::clone(&self.permits).try_acquire_owned() {
                Ok(permit) => {
                    let workload = Arc::clone(&workload);
                    let cancel = self.cancel.clone();
                    self.tracker.spawn(async move {
                        workload.run_unit(cancel).await;
                        drop(permit);
                    });
                    units_launched += 1;
                    tokio::task::yield_now().await;
                }
                Err(TryAcquireError::NoPermits) => {
                    tokio::select! {
                        _ = tokio::time::sleep_until(deadline_at) => {}
                        _ = tokio::time::sleep(PERMIT_RETRY_INTERVAL) => {}
                    }
                }
                Err(TryAcquireError::Closed) => break,
            }
        }

        self.cancel.cancel();
        self.tracker.close();
        self.tracker.wait().await;

        info!(units_launched, disqualified, "Load phase finished");
        self.errors.benchmark().finalize();

        SchedulerReport {
            units_launched,
            disqualified,
        }
    }
}
