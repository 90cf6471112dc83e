//! Scenarios of well-behaved users

use super::{
    cancel_reservation, create_reservation, expect_listed, expect_not_listed, pick_train,
    register_and_login, search_trains, Itinerary,
};
use crate::context::BenchContext;
use crate::random;
use chrono::NaiveDate;
use railbench_core::BenchError;
use tokio_util::sync::CancellationToken;

/// Sign up, reserve, pay and find the reservation in the listing
pub async fn normal_reservation(ctx: &BenchContext) -> Result<(), BenchError> {
    let session = ctx.session()?;
    let user = random::random_user();
    register_and_login(session.as_ref(), &user).await?;
    session.list_stations().await?;

    let itinerary = Itinerary::at(random::random_use_at(&ctx.calendar));
    if let Some(created) = create_reservation(ctx, session.as_ref(), &user, &itinerary, true).await? {
        expect_listed(session.as_ref(), created.id).await?;
    }

    session.logout().await
}

/// Reserve, pay, cancel and check the reservation is gone
pub async fn normal_cancellation(ctx: &BenchContext) -> Result<(), BenchError> {
    let session = ctx.session()?;
    let user = random::random_user();
    register_and_login(session.as_ref(), &user).await?;

    let itinerary = Itinerary::at(random::random_use_at(&ctx.calendar));
    if let Some(created) = create_reservation(ctx, session.as_ref(), &user, &itinerary, true).await? {
        cancel_reservation(ctx, session.as_ref(), created.id).await?;
        expect_not_listed(session.as_ref(), created.id).await?;
    }

    session.logout().await
}

/// Search `count` times without a train class
pub async fn many_ambiguous_searches(
    ctx: &BenchContext,
    count: u32,
    cancel: &CancellationToken,
) -> Result<(), BenchError> {
    let session = ctx.session()?;
    let user = random::random_user();
    register_and_login(session.as_ref(), &user).await?;

    for _ in 0..count {
        if cancel.is_cancelled() {
            break;
        }

        let itinerary = Itinerary::at(random::random_use_at(&ctx.calendar));
        if let Err(err) = session.search_trains(&itinerary.search_query()).await {
            ctx.record(err);
        }
    }

    Ok(())
}

/// Reserve and cancel `count` times
pub async fn many_cancellations(
    ctx: &BenchContext,
    count: u32,
    cancel: &CancellationToken,
) -> Result<(), BenchError> {
    let session = ctx.session()?;
    let user = random::random_user();
    register_and_login(session.as_ref(), &user).await?;

    for _ in 0..count {
        if cancel.is_cancelled() {
            break;
        }

        let itinerary = Itinerary::at(random::random_use_at(&ctx.calendar));
        let outcome = async {
            if let Some(created) =
                create_reservation(ctx, session.as_ref(), &user, &itinerary, false).await?
            {
                cancel_reservation(ctx, session.as_ref(), created.id).await?;
            }
            Ok::<(), BenchError>(())
        }
        .await;

        if let Err(err) = outcome {
            ctx.record(err);
        }
    }

    Ok(())
}

/// Search any class and look at the seats of one result
pub async fn vague_search(ctx: &BenchContext) -> Result<(), BenchError> {
    let session = ctx.session()?;
    let user = random::random_user();
    register_and_login(session.as_ref(), &user).await?;

    let itinerary = Itinerary::at(random::random_use_at(&ctx.calendar));
    let trains = search_trains(session.as_ref(), &itinerary).await?;
    if let Some(train) = pick_train(&trains).cloned() {
        let car_number = random::random_car(random::random_seat_class());
        session
            .list_train_seats(&itinerary.seat_query(&train, car_number))
            .await?;
    }

    Ok(())
}

/// `count` committed reservations departing on `date`
pub async fn golden_week_reservations(
    ctx: &BenchContext,
    date: NaiveDate,
    count: u32,
    cancel: &CancellationToken,
) -> Result<(), BenchError> {
    seasonal_reservations(ctx, count, cancel, || random::random_use_at_on(date)).await
}

/// `count` committed reservations during the olympic window
pub async fn olympic_reservations(
    ctx: &BenchContext,
    count: u32,
    cancel: &CancellationToken,
) -> Result<(), BenchError> {
    let calendar = ctx.calendar;
    seasonal_reservations(ctx, count, cancel, || random::random_olympic_use_at(&calendar)).await
}

async fn seasonal_reservations<F>(
    ctx: &BenchContext,
    count: u32,
    cancel: &CancellationToken,
    use_at: F,
) -> Result<(), BenchError>
where
    F: Fn() -> chrono::NaiveDateTime,
{
    let session = ctx.session()?;
    let user = random::random_user();
    register_and_login(session.as_ref(), &user).await?;

    for _ in 0..count {
        if cancel.is_cancelled() {
            break;
        }

        let itinerary = Itinerary::at(use_at());
        if let Err(err) = create_reservation(ctx, session.as_ref(), &user, &itinerary, true).await {
            ctx.record(err);
        }
    }

    session.logout().await
}
