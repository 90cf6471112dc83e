//! Shared state of one benchmark run

use crate::calendar::Calendar;
use crate::metered::MeteredService;
use railbench_client::{ReservationService, ServiceFactory};
use railbench_core::{BenchError, EndpointCounter, Phase, PhaseCounters, PhaseErrors};
use railbench_ledger::{FareTable, ReservationLedger};
use std::sync::Arc;

/// Everything a scenario needs, cheap to clone.
///
/// Failures are recorded into the counters of the context's phase, so the
/// same scenario code serves the pretest, the load phase and the final check.
#[derive(Clone)]
pub struct BenchContext {
    factory: Arc<dyn ServiceFactory>,
    pub ledger: Arc<ReservationLedger>,
    pub errors: Arc<PhaseErrors>,
    pub endpoints: Arc<EndpointCounter>,
    pub fares: FareTable,
    pub calendar: Calendar,
    phase: Phase,
}

impl BenchContext {
    pub fn new(
        factory: Arc<dyn ServiceFactory>,
        ledger: Arc<ReservationLedger>,
        errors: Arc<PhaseErrors>,
        endpoints: Arc<EndpointCounter>,
        calendar: Calendar,
    ) -> Self {
        Self {
            factory,
            ledger,
            errors,
            endpoints,
            fares: FareTable::new(),
            calendar,
            phase: Phase::Benchmark,
        }
    }

    /// Same run, recording into another phase
    pub fn with_phase(&self, phase: Phase) -> Self {
        Self {
            phase,
            ..self.clone()
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn counters(&self) -> &PhaseCounters {
        self.errors.phase(self.phase)
    }

    pub fn record(&self, err: BenchError) -> BenchError {
        self.counters().add_error(err)
    }

    /// Record the failure of a scenario, if any
    pub fn record_result(&self, result: Result<(), BenchError>) {
        if let Err(err) = result {
            self.record(err);
        }
    }

    /// Failures of the benchmarker itself, kept out of the score
    pub fn record_system(&self, err: BenchError) {
        self.errors.system().add_error(err);
    }

    /// A fresh metered session
    pub fn session(&self) -> Result<Arc<dyn ReservationService>, BenchError> {
        let inner = self.factory.session()?;
        Ok(Arc::new(MeteredService::new(inner, Arc::clone(&self.endpoints))))
    }
}
