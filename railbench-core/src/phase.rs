//! Per-phase error accounting

use crate::error::{BenchError, ErrorKind};
use crate::penalty::PenaltyPolicy;
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

/// Lifecycle stage with independent error accounting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    System,
    Initialize,
    PreTest,
    Benchmark,
    FinalCheck,
}

impl Phase {
    pub const ALL: [Phase; 5] = [
        Phase::System,
        Phase::Initialize,
        Phase::PreTest,
        Phase::Benchmark,
        Phase::FinalCheck,
    ];
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::System => "system",
            Phase::Initialize => "initialize",
            Phase::PreTest => "pretest",
            Phase::Benchmark => "benchmark",
            Phase::FinalCheck => "final_check",
        };
        f.write_str(name)
    }
}

/// Counter values at one instant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CounterSnapshot {
    pub critical: u64,
    pub application: u64,
    pub timeout: u64,
    pub temporary: u64,
}

impl CounterSnapshot {
    /// Timeout plus temporary errors
    pub fn trivial(&self) -> u64 {
        self.timeout + self.temporary
    }
}

#[derive(Debug, Default)]
struct CounterState {
    messages: Vec<String>,
    internal_messages: Vec<String>,
    counts: CounterSnapshot,
    finalized: bool,
}

/// Error counters of one phase.
///
/// Every read and write goes through one mutex. Once [`finalize`] has run,
/// further additions are ignored so scoring sees a stable snapshot.
///
/// [`finalize`]: PhaseCounters::finalize
#[derive(Debug)]
pub struct PhaseCounters {
    phase: Phase,
    policy: PenaltyPolicy,
    state: Mutex<CounterState>,
}

impl PhaseCounters {
    pub fn new(phase: Phase, policy: PenaltyPolicy) -> Self {
        Self {
            phase,
            policy,
            state: Mutex::new(CounterState::default()),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Record a classified failure and hand it back to the caller.
    ///
    /// Unknown failures count as critical.
    pub fn add_error(&self, err: BenchError) -> BenchError {
        let mut state = self.state.lock();
        if state.finalized {
            return err;
        }

        state.internal_messages.push(err.internal_message());
        state.messages.push(err.user_message());

        match err.kind {
            ErrorKind::Critical | ErrorKind::Unknown => state.counts.critical += 1,
            ErrorKind::Application => state.counts.application += 1,
            ErrorKind::Timeout => state.counts.timeout += 1,
            ErrorKind::Temporary => state.counts.temporary += 1,
        }

        err
    }

    /// Record the error of a failed result, if any
    pub fn add_result<T>(&self, result: Result<T, BenchError>) -> Result<T, BenchError> {
        result.map_err(|err| self.add_error(err))
    }

    /// Whether any user message has been recorded
    pub fn is_error(&self) -> bool {
        !self.state.lock().messages.is_empty()
    }

    /// Disqualification predicate
    pub fn is_failure(&self) -> bool {
        let counts = self.state.lock().counts;
        self.policy.is_failure(&counts)
    }

    pub fn penalty(&self) -> u64 {
        let counts = self.state.lock().counts;
        let penalty = self.policy.penalty(&counts);
        if counts.trivial() > self.policy.trivial_threshold {
            warn!(
                phase = %self.phase,
                trivial = counts.trivial(),
                threshold = self.policy.trivial_threshold,
                "Timeout and temporary errors exceed the tolerated threshold"
            );
        }
        penalty
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        self.state.lock().counts
    }

    pub fn messages(&self) -> Vec<String> {
        self.state.lock().messages.clone()
    }

    pub fn internal_messages(&self) -> Vec<String> {
        self.state.lock().internal_messages.clone()
    }

    pub fn is_finalized(&self) -> bool {
        self.state.lock().finalized
    }

    /// Freeze the counters. Returns false when already frozen.
    pub fn finalize(&self) -> bool {
        let mut state = self.state.lock();
        if state.finalized {
            return false;
        }
        state.finalized = true;

        let counts = state.counts;
        info!(
            phase = %self.phase,
            critical = counts.critical,
            application = counts.application,
            timeout = counts.timeout,
            temporary = counts.temporary,
            "Error counters finalized"
        );
        true
    }
}

/// The five phase counter sets of one benchmark run
#[derive(Debug)]
pub struct PhaseErrors {
    system: PhaseCounters,
    initialize: PhaseCounters,
    pre_test: PhaseCounters,
    benchmark: PhaseCounters,
    final_check: PhaseCounters,
}

impl PhaseErrors {
    pub fn new(policy: PenaltyPolicy) -> Self {
        Self {
            system: PhaseCounters::new(Phase::System, policy),
            initialize: PhaseCounters::new(Phase::Initialize, policy),
            pre_test: PhaseCounters::new(Phase::PreTest, policy),
            benchmark: PhaseCounters::new(Phase::Benchmark, policy),
            final_check: PhaseCounters::new(Phase::FinalCheck, policy),
        }
    }

    pub fn phase(&self, phase: Phase) -> &PhaseCounters {
        match phase {
            Phase::System => &self.system,
            Phase::Initialize => &self.initialize,
            Phase::PreTest => &self.pre_test,
            Phase::Benchmark => &self.benchmark,
            Phase::FinalCheck => &self.final_check,
        }
    }

    pub fn system(&self) -> &PhaseCounters {
        &self.system
    }

    pub fn initialize(&self) -> &PhaseCounters {
        &self.initialize
    }

    pub fn pre_test(&self) -> &PhaseCounters {
        &self.pre_test
    }

    pub fn benchmark(&self) -> &PhaseCounters {
        &self.benchmark
    }

    pub fn final_check(&self) -> &PhaseCounters {
        &self.final_check
    }
}

impl Default for PhaseErrors {
    fn default() -> Self {
        Self::new(PenaltyPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counters() -> PhaseCounters {
        PhaseCounters::new(Phase::Benchmark, PenaltyPolicy::default())
    }

    #[test]
    fn test_add_error_counts_by_kind() {
        let counters = counters();
        counters.add_error(BenchError::application("a"));
        counters.add_error(BenchError::timeout("t"));
        counters.add_error(BenchError::temporary("tmp"));
        counters.add_error(BenchError::unknown("u"));

        let snapshot = counters.snapshot();
        assert_eq!(snapshot.application, 1);
        assert_eq!(snapshot.timeout, 1);
        assert_eq!(snapshot.temporary, 1);
        assert_eq!(snapshot.critical, 1);
        assert_eq!(counters.messages().len(), 4);
        assert_eq!(counters.internal_messages().len(), 4);
    }

    #[test]
    fn test_is_error_tracks_messages() {
        let counters = counters();
        assert!(!counters.is_error());
        counters.add_error(BenchError::timeout("slow"));
        assert!(counters.is_error());
        assert!(!counters.is_failure());
    }

    #[test]
    fn test_failure_is_sticky() {
        let counters = counters();
        counters.add_error(BenchError::critical("double booking"));
        assert!(counters.is_failure());

        for _ in 0..50 {
            counters.add_error(BenchError::application("noise"));
            counters.add_error(BenchError::timeout("noise"));
            assert!(counters.is_failure());
        }
        counters.finalize();
        assert!(counters.is_failure());
    }

    #[test]
    fn test_finalize_freezes_counters() {
        let counters = counters();
        counters.add_error(BenchError::application("before"));
        assert!(counters.finalize());
        assert!(!counters.finalize());

        counters.add_error(BenchError::critical("after"));
        assert_eq!(counters.snapshot().critical, 0);
        assert_eq!(counters.messages(), vec!["before".to_string()]);
        assert!(!counters.is_failure());
    }

    #[test]
    fn test_add_result_passes_values_through() {
        let counters = counters();
        assert_eq!(counters.add_result::<u32>(Ok(3)).unwrap(), 3);
        assert!(counters.add_result::<u32>(Err(BenchError::timeout("x"))).is_err());
        assert_eq!(counters.snapshot().timeout, 1);
    }

    #[test]
    fn test_phase_errors_are_independent() {
        let errors = PhaseErrors::default();
        errors.pre_test().add_error(BenchError::application("broken"));
        assert!(errors.phase(Phase::PreTest).is_error());
        for phase in Phase::ALL.into_iter().filter(|p| *p != Phase::PreTest) {
            assert!(!errors.phase(phase).is_error(), "{} polluted", phase);
        }
    }
}
