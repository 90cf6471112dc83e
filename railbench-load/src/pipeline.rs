//! The phased benchmark run

use crate::bundle::ScenarioBundle;
use crate::calendar::Calendar;
use crate::context::BenchContext;
use crate::scenario;
use crate::scheduler::LoadScheduler;
use railbench_client::ServiceFactory;
use railbench_config::BenchmarkConfig;
use railbench_core::{unique_messages, BenchResult, EndpointCounter, PenaltyPolicy, Phase, PhaseErrors};
use railbench_ledger::ReservationLedger;
use std::sync::Arc;
use tracing::{info, warn};

/// One benchmark run against one service.
///
/// Phases run in order: initialize, pretest, load, final check. A failing
/// phase ends the run with a failed result carrying that phase's messages.
pub struct Benchmark {
    config: BenchmarkConfig,
    factory: Arc<dyn ServiceFactory>,
    policy: PenaltyPolicy,
    errors: Arc<PhaseErrors>,
}

impl Benchmark {
    pub fn new(config: BenchmarkConfig, factory: Arc<dyn ServiceFactory>, policy: PenaltyPolicy) -> Self {
        Self {
            config,
            factory,
            policy,
            errors: Arc::new(PhaseErrors::new(policy)),
        }
    }

    /// Counters of this run, for inspection after [`run`](Self::run)
    pub fn errors(&self) -> Arc<PhaseErrors> {
        Arc::clone(&self.errors)
    }

    pub async fn run(&self) -> BenchResult {
        let errors = Arc::clone(&self.errors);
        let default_days = self.config.calendar.default_available_days;

        info!("===== Initialize =====");
        let initialized = match self.factory.initialize_session() {
            Ok(session) => errors.initialize().add_result(session.initialize().await),
            Err(err) => Err(errors.initialize().add_error(err)),
        };
        errors.initialize().finalize();

        let Ok(initialized) = initialized else {
            warn!("Initialize failed: {:?}", errors.initialize().internal_messages());
            return BenchResult::failed(errors.initialize().messages(), default_days, "");
        };

        let available_days = if initialized.available_days == 0 {
            default_days
        } else {
            initialized.available_days
        };
        let language = initialized.language;
        let calendar = Calendar::new(&self.config.calendar, available_days);
        let failed = |messages: Vec<String>| BenchResult::failed(messages, available_days, language.clone());

        let endpoints = Arc::new(EndpointCounter::new());
        let ctx = BenchContext::new(
            Arc::clone(&self.factory),
            Arc::new(ReservationLedger::new()),
            Arc::clone(&errors),
            Arc::clone(&endpoints),
            calendar,
        );

        info!("===== Pretest =====");
        let pretest_ctx = ctx.with_phase(Phase::PreTest);
        pretest_ctx.record_result(scenario::pretest(&pretest_ctx).await);
        errors.pre_test().finalize();
        if errors.pre_test().is_error() {
            warn!("Pretest failed: {:?}", errors.pre_test().internal_messages());
            return failed(errors.pre_test().messages());
        }

        info!("===== Benchmark =====");
        let load_level = self.config.load_level.unwrap_or_else(|| calendar.load_level());
        let scheduler = LoadScheduler::new(load_level, Arc::clone(&errors));
        let report = scheduler
            .run(self.config.benchmark_timeout, Arc::new(ScenarioBundle::new(ctx.clone())))
            .await;
        if report.disqualified || errors.benchmark().is_failure() {
            return failed(unique_messages(errors.benchmark().messages()));
        }

        info!("===== Final check =====");
        info!(
            reservations = ctx.ledger.count().await,
            committed = ctx.ledger.committed_count().await,
            canceled = ctx.ledger.canceled_count().await,
            "Ledger before final check"
        );
        tokio::time::sleep(self.config.final_check_delay).await;
        let final_ctx = ctx.with_phase(Phase::FinalCheck);
        scenario::final_check(&final_ctx).await;
        errors.final_check().finalize();
        if errors.final_check().is_error() {
            warn!("Final check failed: {:?}", errors.final_check().internal_messages());
            let mut messages = unique_messages(errors.benchmark().messages());
            messages.extend(errors.final_check().messages());
            return failed(messages);
        }

        info!("===== System errors =====");
        errors.system().finalize();
        for message in errors.system().internal_messages() {
            warn!("{}", message);
        }

        info!("===== Score =====");
        let raw_score = endpoints.score();
        let penalty = errors.benchmark().penalty();
        let score = raw_score as i64 - penalty as i64;
        info!(raw_score, penalty, score, policy = ?self.policy, "Final score");

        let mut messages = unique_messages(errors.benchmark().messages());
        messages.push(format!("endpoint successes: {}", endpoints.total_count()));
        messages.push(format!("score: {}", raw_score));
        messages.push(format!("penalty: {}", penalty));

        BenchResult {
            pass: true,
            score,
            messages,
            available_days,
            language,
        }
    }
}
