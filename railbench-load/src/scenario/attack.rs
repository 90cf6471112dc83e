//! Scenarios that try to break the service's guarantees

use super::{
    create_reservation, free_seats, pick_train, record_ledger_fault, register_and_login,
    search_trains, Itinerary,
};
use crate::context::BenchContext;
use crate::random;
use futures::future::join_all;
use railbench_core::{BenchError, Endpoint};
use railbench_ledger::{ReservationRequest, SeatClass, TrainClass};
use tracing::{info, warn};

/// Identical reservations fired at once by the race scenario
pub const RACE_REQUESTS: usize = 10;

/// Car the race scenario fights over
const RACE_CAR: u32 = 9;

/// Let one user reserve, then try to cancel that reservation as another.
///
/// The service must refuse; accepting is disqualifying.
pub async fn cancel_other_users_reservation(ctx: &BenchContext) -> Result<(), BenchError> {
    let session = ctx.session()?;
    let owner = random::random_user();
    let intruder = random::random_user();

    register_and_login(session.as_ref(), &owner).await?;
    let itinerary = Itinerary::at(random::random_use_at(&ctx.calendar))
        .with_train_class(TrainClass::Local);
    let Some(created) = create_reservation(ctx, session.as_ref(), &owner, &itinerary, false).await?
    else {
        return session.logout().await;
    };
    session.logout().await?;

    register_and_login(session.as_ref(), &intruder).await?;
    if session.cancel_reservation(created.id).await.is_ok() {
        warn!(id = created.id, "Reservation canceled by another user");
        // Keep the ledger in line with what the service now holds
        if let Err(err) = ctx.ledger.cancel(created.id).await {
            record_ledger_fault(ctx, err);
        }
        return Err(
            BenchError::critical("another user's reservation could be canceled")
                .context(Endpoint::CancelReservation),
        );
    }

    Ok(())
}

/// Fire identical reservations for the same seats concurrently.
///
/// Exactly one may succeed. More than one is double issuance, none at all
/// means the service cannot take a reservation it must accept.
pub async fn reserve_race_condition(ctx: &BenchContext) -> Result<(), BenchError> {
    let session = ctx.session()?;
    let user = random::random_user();
    register_and_login(session.as_ref(), &user).await?;
    session.list_stations().await?;

    let mut itinerary = Itinerary::at(random::random_use_at(&ctx.calendar))
        .with_train_class(TrainClass::Local);
    itinerary.adult = 1;
    itinerary.child = 1;

    let trains = search_trains(session.as_ref(), &itinerary).await?;
    let Some(train) = pick_train(&trains).cloned() else {
        return Ok(());
    };

    let seats = session
        .list_train_seats(&itinerary.seat_query(&train, RACE_CAR))
        .await?;
    let Some(chosen) = free_seats(&seats, itinerary.passengers()) else {
        return Ok(());
    };

    let request = ReservationRequest {
        date: itinerary.date(),
        departure: itinerary.departure.clone(),
        arrival: itinerary.arrival.clone(),
        train_class: train.train_class.clone(),
        train_name: train.train_name.clone(),
        car_number: RACE_CAR,
        seat_class: SeatClass::for_car(RACE_CAR).unwrap_or(SeatClass::Reserved),
        seats: chosen,
        adult: itinerary.adult,
        child: itinerary.child,
    };

    // Stale listing: the seats are already ours elsewhere
    if !ctx.ledger.can_admit(&request).await {
        return Ok(());
    }

    let attempts = (0..RACE_REQUESTS).map(|_| session.reserve(&request));
    let accepted: Vec<_> = join_all(attempts)
        .await
        .into_iter()
        .filter_map(Result::ok)
        .collect();

    match accepted.as_slice() {
        [] => Err(BenchError::application("the reservation could not be made").context(Endpoint::Reserve)),
        [only] => {
            if let Err(err) = ctx.ledger.register(user, &request, only.reservation_id).await {
                record_ledger_fault(ctx, err);
            }
            Ok(())
        }
        many => {
            info!(issued = many.len(), "Multiple issuance detected");
            for response in many {
                if let Err(err) = ctx
                    .ledger
                    .register(user.clone(), &request, response.reservation_id)
                    .await
                {
                    record_ledger_fault(ctx, err);
                }
            }
            Err(BenchError::critical("the same seats were issued multiple times")
                .context(Endpoint::Reserve))
        }
    }
}
