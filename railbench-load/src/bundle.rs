//! The production load unit

use crate::context::BenchContext;
use crate::scenario;
use crate::scheduler::Workload;
use async_trait::async_trait;
use chrono::Datelike;
use tokio_util::sync::CancellationToken;

/// Reservations per seasonal scenario
const SEASONAL_RESERVATIONS: u32 = 5;

/// Month above which the repeated search and cancel scenarios join in
const REPEAT_MONTH_THRESHOLD: u32 = 3;

/// Runs every scenario once, in a fixed order, recording failures into the
/// benchmark counters. Seasonal scenarios depend on the reservable window.
#[derive(Clone)]
pub struct ScenarioBundle {
    ctx: BenchContext,
}

impl ScenarioBundle {
    pub fn new(ctx: BenchContext) -> Self {
        Self { ctx }
    }

    /// Repetitions of the search and cancel scenarios, if they run at all
    pub fn repeat_count(&self) -> Option<u32> {
        let month = self.ctx.calendar.end_date().month();
        (month > REPEAT_MONTH_THRESHOLD).then_some(month * 3)
    }
}

#[async_trait]
impl Workload for ScenarioBundle {
    async fn run_unit(&self, cancel: CancellationToken) {
        let ctx = &self.ctx;
        let calendar = ctx.calendar;

        macro_rules! step {
            ($scenario:expr) => {
                if cancel.is_cancelled() {
                    return;
                }
                ctx.record_result($scenario.await);
            };
        }

        step!(scenario::normal_reservation(ctx));
        step!(scenario::normal_cancellation(ctx));
        step!(scenario::cancel_other_users_reservation(ctx));
        step!(scenario::reserve_race_condition(ctx));
        step!(scenario::reserve_wrong_section(ctx));
        step!(scenario::reserve_wrong_seat(ctx));

        if let Some(count) = self.repeat_count() {
            step!(scenario::many_ambiguous_searches(ctx, count, &cancel));
            step!(scenario::many_cancellations(ctx, count, &cancel));
        }

        step!(scenario::vague_search(ctx));

        if calendar.is_golden_week_started() {
            step!(scenario::golden_week_reservations(
                ctx,
                calendar.golden_week_start,
                SEASONAL_RESERVATIONS,
                &cancel
            ));
        }
        if calendar.is_golden_week_ended() {
            step!(scenario::golden_week_reservations(
                ctx,
                calendar.golden_week_end,
                SEASONAL_RESERVATIONS,
                &cancel
            ));
        }
        if calendar.is_olympic() {
            step!(scenario::olympic_reservations(ctx, SEASONAL_RESERVATIONS, &cancel));
        }
    }
}
