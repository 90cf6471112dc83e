//! Core types for railbench
//!
//! This crate holds the failure taxonomy shared by every other crate:
//! classified errors, per-phase error counters with their disqualification
//! and penalty rules, the endpoint success score and the final result
//! document written by the benchmarker.

pub mod error;
pub mod penalty;
pub mod phase;
pub mod result;
pub mod score;

pub use error::{BenchError, ErrorKind};
pub use penalty::PenaltyPolicy;
pub use phase::{CounterSnapshot, Phase, PhaseCounters, PhaseErrors};
pub use result::{unique_messages, BenchResult};
pub use score::{Endpoint, EndpointCounter};
