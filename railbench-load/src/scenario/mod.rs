//! Scenarios run against the service
//!
//! A scenario returns its first failure; the caller records it into the
//! counters of the context's phase. Looping scenarios record failures as
//! they go and keep running until their count or the cancellation token
//! stops them.

mod abnormal;
mod attack;
mod check;
mod normal;

pub use abnormal::{reserve_wrong_seat, reserve_wrong_section};
pub use attack::{cancel_other_users_reservation, reserve_race_condition, RACE_REQUESTS};
pub use check::{final_check, pretest};
pub use normal::{
    golden_week_reservations, many_ambiguous_searches, many_cancellations,
    normal_cancellation, normal_reservation, olympic_reservations, vague_search,
};

use crate::context::BenchContext;
use crate::random;
use chrono::NaiveDateTime;
use rand::seq::SliceRandom;
use railbench_client::{
    ReservationService, ReserveResponse, SeatQuery, Train, TrainSearchQuery, TrainSeat,
};
use railbench_core::{BenchError, Endpoint};
use railbench_ledger::{
    Admission, LedgerError, ReservationId, ReservationRequest, SeatCoordinate, TrainClass, User,
};
use tracing::{debug, warn};

/// Where and when a scenario wants to travel
#[derive(Debug, Clone)]
pub struct Itinerary {
    pub use_at: NaiveDateTime,
    pub departure: String,
    pub arrival: String,
    /// `None` searches every class
    pub train_class: Option<TrainClass>,
    pub adult: u32,
    pub child: u32,
}

impl Itinerary {
    pub fn at(use_at: NaiveDateTime) -> Self {
        let (departure, arrival) = random::random_section();
        let (adult, child) = random::random_passengers();
        Self {
            use_at,
            departure,
            arrival,
            train_class: None,
            adult,
            child,
        }
    }

    pub fn with_train_class(mut self, train_class: TrainClass) -> Self {
        self.train_class = Some(train_class);
        self
    }

    pub fn search_query(&self) -> TrainSearchQuery {
        TrainSearchQuery {
            use_at: self.use_at,
            train_class: self.train_class.map(|class| class.to_string()),
            from: self.departure.clone(),
            to: self.arrival.clone(),
            adult: self.adult,
            child: self.child,
        }
    }

    pub fn seat_query(&self, train: &Train, car_number: u32) -> SeatQuery {
        SeatQuery {
            date: self.date(),
            train_class: train.train_class.clone(),
            train_name: train.train_name.clone(),
            car_number,
            from: self.departure.clone(),
            to: self.arrival.clone(),
        }
    }

    pub fn date(&self) -> String {
        self.use_at.format("%Y-%m-%d").to_string()
    }

    pub fn passengers(&self) -> usize {
        (self.adult + self.child) as usize
    }
}

/// A reservation the service accepted and the ledger now holds
#[derive(Debug, Clone)]
pub struct CreatedReservation {
    pub id: ReservationId,
    pub request: ReservationRequest,
    pub amount: u64,
}

pub(crate) async fn register_and_login(
    session: &dyn ReservationService,
    user: &User,
) -> Result<(), BenchError> {
    session.signup(user).await?;
    session.login(user).await
}

/// The first `count` free seats, or `None` when the car is too full
pub(crate) fn free_seats(seats: &[TrainSeat], count: usize) -> Option<Vec<SeatCoordinate>> {
    let free: Vec<SeatCoordinate> = seats
        .iter()
        .filter(|seat| !seat.is_occupied)
        .take(count)
        .map(TrainSeat::coordinate)
        .collect();

    (count > 0 && free.len() == count).then_some(free)
}

pub(crate) fn pick_train(trains: &[Train]) -> Option<&Train> {
    trains.choose(&mut rand::thread_rng())
}

/// Failures of our own bookkeeping go to the system counters
pub(crate) fn record_ledger_fault(ctx: &BenchContext, err: LedgerError) {
    warn!("Ledger rejected an update: {}", err);
    ctx.record_system(
        BenchError::unknown("the benchmarker lost track of a reservation").with_detail(err.to_string()),
    );
}

pub(crate) async fn search_trains(
    session: &dyn ReservationService,
    itinerary: &Itinerary,
) -> Result<Vec<Train>, BenchError> {
    let trains = session.search_trains(&itinerary.search_query()).await?;
    if trains.is_empty() {
        return Err(BenchError::critical("no trains were found").context(Endpoint::SearchTrains));
    }
    Ok(trains)
}

/// Reserve with the ledger's prediction checked against the outcome.
///
/// An accepted reservation that the ledger says conflicts with a live one is
/// double booking. A rejected reservation the ledger would have admitted is
/// the service's failure; a rejected conflicting one is expected.
pub(crate) async fn reserve_and_verify(
    ctx: &BenchContext,
    session: &dyn ReservationService,
    user: &User,
    request: &ReservationRequest,
) -> Result<Option<ReserveResponse>, BenchError> {
    let predicted = ctx.ledger.check_admission(request).await;

    match session.reserve(request).await {
        Ok(response) => {
            if let Admission::Conflict(_) = predicted {
                // The holder may have canceled in the meantime
                if let Admission::Conflict(existing) = ctx.ledger.check_admission(request).await {
                    warn!(
                        existing,
                        issued = response.reservation_id,
                        "Service issued seats that are already reserved"
                    );
                    return Err(BenchError::critical(format!(
                        "double booking: seats of reservation {} were issued again",
                        existing
                    ))
                    .context(Endpoint::Reserve));
                }
            }

            if let Err(err) = ctx
                .ledger
                .register(user.clone(), request, response.reservation_id)
                .await
            {
                record_ledger_fault(ctx, err);
            }
            Ok(Some(response))
        }
        Err(err) => {
            // Timeouts say nothing about the seats, so they are always recorded
            if err.kind.is_trivial() || ctx.ledger.can_admit(request).await {
                Err(err)
            } else {
                debug!("Conflicting reservation rejected as expected");
                Ok(None)
            }
        }
    }
}

/// Search, pick free seats, reserve and optionally commit.
///
/// Returns `None` when no free seats were found or the service rightly
/// refused the seats.
pub(crate) async fn create_reservation(
    ctx: &BenchContext,
    session: &dyn ReservationService,
    user: &User,
    itinerary: &Itinerary,
    commit: bool,
) -> Result<Option<CreatedReservation>, BenchError> {
    let trains = search_trains(session, itinerary).await?;
    let Some(train) = pick_train(&trains).cloned() else {
        return Ok(None);
    };

    let seat_class = random::random_seat_class();
    let car_number = random::random_car(seat_class);
    let seats = session
        .list_train_seats(&itinerary.seat_query(&train, car_number))
        .await?;

    let Some(chosen) = free_seats(&seats, itinerary.passengers()) else {
        debug!(train = %train.train_name, car_number, "Not enough free seats");
        return Ok(None);
    };

    let request = ReservationRequest {
        date: itinerary.date(),
        departure: itinerary.departure.clone(),
        arrival: itinerary.arrival.clone(),
        train_class: train.train_class.clone(),
        train_name: train.train_name.clone(),
        car_number,
        seat_class,
        seats: chosen,
        adult: itinerary.adult,
        child: itinerary.child,
    };

    let Some(response) = reserve_and_verify(ctx, session, user, &request).await? else {
        return Ok(None);
    };

    if commit {
        session.commit_reservation(response.reservation_id).await?;
        if let Err(err) = ctx.ledger.commit(response.reservation_id).await {
            record_ledger_fault(ctx, err);
        }
    }

    Ok(Some(CreatedReservation {
        id: response.reservation_id,
        request,
        amount: response.amount,
    }))
}

/// Cancel at the service, then in the ledger
pub(crate) async fn cancel_reservation(
    ctx: &BenchContext,
    session: &dyn ReservationService,
    id: ReservationId,
) -> Result<(), BenchError> {
    session.cancel_reservation(id).await?;
    if let Err(err) = ctx.ledger.cancel(id).await {
        record_ledger_fault(ctx, err);
    }
    Ok(())
}

/// Fails when `id` is missing from the user's listing
pub(crate) async fn expect_listed(
    session: &dyn ReservationService,
    id: ReservationId,
) -> Result<(), BenchError> {
    let listed = session.list_reservations().await?;
    if listed.iter().any(|r| r.reservation_id == id) {
        Ok(())
    } else {
        Err(BenchError::application(format!("reservation {} is not listed", id))
            .context(Endpoint::ListReservations))
    }
}

/// Fails when `id` is still in the user's listing
pub(crate) async fn expect_not_listed(
    session: &dyn ReservationService,
    id: ReservationId,
) -> Result<(), BenchError> {
    let listed = session.list_reservations().await?;
    if listed.iter().any(|r| r.reservation_id == id) {
        Err(
            BenchError::application(format!("canceled reservation {} is still listed", id))
                .context(Endpoint::ListReservations),
        )
    } else {
        Ok(())
    }
}
