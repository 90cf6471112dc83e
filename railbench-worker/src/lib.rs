//! Benchmark job dispatch
//!
//! The worker polls the portal for jobs, runs the benchmarker as a child
//! process against the team's server and reports the outcome back, retrying
//! the report and alerting operators when the portal cannot be reached.

pub mod alert;
pub mod dispatcher;
pub mod error;
pub mod job;
pub mod queue;
pub mod reporter;
pub mod runner;

pub use alert::{alerter_from_config, Alert, Alerter, LogAlerter, WebhookAlerter};
pub use dispatcher::Dispatcher;
pub use error::{WorkerError, WorkerResult};
pub use job::{Job, JobResult, JobStatus, Server, Team};
pub use queue::{JobQueue, PortalClient};
pub use reporter::Reporter;
pub use runner::BenchmarkRunner;
