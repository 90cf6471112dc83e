//! Reservations the service must refuse

use super::register_and_login;
use crate::context::BenchContext;
use crate::random;
use railbench_client::ReservationService;
use railbench_core::{BenchError, Endpoint};
use railbench_ledger::{ReservationRequest, SeatClass, SeatCoordinate, TrainClass};

fn base_request(ctx: &BenchContext) -> ReservationRequest {
    let (departure, arrival) = random::random_section();
    let car_number = random::random_car(SeatClass::Reserved);
    ReservationRequest {
        date: random::random_use_at(&ctx.calendar).format("%Y-%m-%d").to_string(),
        departure,
        arrival,
        train_class: TrainClass::Express.to_string(),
        train_name: "1".to_string(),
        car_number,
        seat_class: SeatClass::Reserved,
        seats: vec![SeatCoordinate::new(1, "A")],
        adult: 1,
        child: 0,
    }
}

async fn expect_refusal(
    session: &dyn ReservationService,
    request: &ReservationRequest,
    message: &str,
) -> Result<(), BenchError> {
    match session.reserve(request).await {
        Ok(_) => Err(BenchError::application(message).context(Endpoint::Reserve)),
        Err(_) => Ok(()),
    }
}

/// Departure and arrival at the same station
pub async fn reserve_wrong_section(ctx: &BenchContext) -> Result<(), BenchError> {
    let session = ctx.session()?;
    let user = random::random_user();
    register_and_login(session.as_ref(), &user).await?;

    let mut request = base_request(ctx);
    request.arrival = request.departure.clone();

    expect_refusal(
        session.as_ref(),
        &request,
        "a reservation with an invalid section was accepted",
    )
    .await
}

/// A seat that does not exist in the car
pub async fn reserve_wrong_seat(ctx: &BenchContext) -> Result<(), BenchError> {
    let session = ctx.session()?;
    let user = random::random_user();
    register_and_login(session.as_ref(), &user).await?;

    let mut request = base_request(ctx);
    request.seats = vec![SeatCoordinate::new(1000, "Z")];

    expect_refusal(
        session.as_ref(),
        &request,
        "a reservation for a nonexistent seat was accepted",
    )
    .await
}
