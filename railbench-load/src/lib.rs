//! Load generation for railbench
//!
//! The crate ties the other pieces together. [`LoadScheduler`] keeps a
//! bounded number of load units running until the deadline or until the
//! benchmark counters disqualify the run. Each unit is a [`ScenarioBundle`]
//! pass that talks to the service through metered sessions and checks every
//! accepted reservation against the shared ledger. [`Benchmark`] runs the
//! phases in order and always produces a [`BenchResult`].
//!
//! [`BenchResult`]: railbench_core::BenchResult

pub mod bundle;
pub mod calendar;
pub mod context;
pub mod metered;
pub mod pipeline;
pub mod random;
pub mod scenario;
pub mod scheduler;

pub use bundle::ScenarioBundle;
pub use calendar::Calendar;
pub use context::BenchContext;
pub use metered::MeteredService;
pub use pipeline::Benchmark;
pub use scheduler::{LoadScheduler, SchedulerReport, Workload};
