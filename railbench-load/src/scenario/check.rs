//! Correctness checks before and after the load phase

use super::{cancel_reservation, create_reservation, expect_not_listed, register_and_login, Itinerary};
use crate::context::BenchContext;
use crate::random;
use futures::stream::{self, StreamExt};
use railbench_client::Reservation;
use railbench_core::{BenchError, Endpoint};
use railbench_ledger::{ReservationId, ReservationRecord, User, STATIONS};
use std::collections::{BTreeMap, HashMap};
use tracing::info;

/// Owners checked concurrently by the final check
const FINAL_CHECK_CONCURRENCY: usize = 8;

/// One complete, correct reservation flow on a fresh service.
///
/// Any failure here means the run cannot be scored.
pub async fn pretest(ctx: &BenchContext) -> Result<(), BenchError> {
    let session = ctx.session()?;
    let user = random::random_user();
    register_and_login(session.as_ref(), &user).await?;

    let stations = session.list_stations().await?;
    if stations.len() != STATIONS.len() {
        return Err(BenchError::application(format!(
            "expected {} stations, got {}",
            STATIONS.len(),
            stations.len()
        ))
        .context(Endpoint::ListStations));
    }

    let itinerary = Itinerary::at(random::random_use_at(&ctx.calendar));
    let created = create_reservation(ctx, session.as_ref(), &user, &itinerary, true)
        .await?
        .ok_or_else(|| {
            BenchError::application("no seat could be reserved on an empty train")
                .context(Endpoint::Reserve)
        })?;

    let listed = session.list_reservations().await?;
    let reservation = listed
        .iter()
        .find(|r| r.reservation_id == created.id)
        .ok_or_else(|| {
            BenchError::application(format!("reservation {} is not listed", created.id))
                .context(Endpoint::ListReservations)
        })?;
    if reservation.amount != created.amount {
        return Err(BenchError::application(format!(
            "reservation {} is listed at {}, reserved at {}",
            created.id, reservation.amount, created.amount
        ))
        .context(Endpoint::ListReservations));
    }

    cancel_reservation(ctx, session.as_ref(), created.id).await?;
    expect_not_listed(session.as_ref(), created.id).await?;

    session.logout().await
}

#[derive(Debug)]
struct Owner {
    user: User,
    committed: Vec<ReservationRecord>,
    canceled: Vec<ReservationRecord>,
}

impl Owner {
    fn new(user: &User) -> Self {
        Self {
            user: user.clone(),
            committed: Vec::new(),
            canceled: Vec::new(),
        }
    }
}

/// Reconcile the ledger with every owner's reservation listing.
///
/// A committed reservation that vanished is critical. A canceled one that is
/// still listed, or a wrong price, is an application error. Failures are
/// recorded into the context's counters as they are found.
pub async fn final_check(ctx: &BenchContext) {
    let mut owners: BTreeMap<String, Owner> = BTreeMap::new();
    ctx.ledger
        .for_each_committed(|record| {
            owners
                .entry(record.user.email.clone())
                .or_insert_with(|| Owner::new(&record.user))
                .committed
                .push(record.clone());
        })
        .await;
    ctx.ledger
        .for_each_canceled(|record| {
            owners
                .entry(record.user.email.clone())
                .or_insert_with(|| Owner::new(&record.user))
                .canceled
                .push(record.clone());
        })
        .await;

    info!(owners = owners.len(), "Reconciling reservations");

    stream::iter(owners.into_values())
        .for_each_concurrent(FINAL_CHECK_CONCURRENCY, |owner| async move {
            if let Err(err) = check_owner(ctx, &owner).await {
                ctx.record(err);
            }
        })
        .await;
}

async fn check_owner(ctx: &BenchContext, owner: &Owner) -> Result<(), BenchError> {
    let session = ctx.session()?;
    session.login(&owner.user).await?;
    let listed: HashMap<ReservationId, Reservation> = session
        .list_reservations()
        .await?
        .into_iter()
        .map(|r| (r.reservation_id, r))
        .collect();

    for record in &owner.committed {
        let Some(reservation) = listed.get(&record.id) else {
            ctx.record(
                BenchError::critical(format!("committed reservation {} is missing", record.id))
                    .context(Endpoint::ListReservations),
            );
            continue;
        };

        match record.amount(&ctx.fares) {
            Ok(expected) if expected != reservation.amount => {
                ctx.record(
                    BenchError::application(format!(
                        "reservation {} costs {}, expected {}",
                        record.id, reservation.amount, expected
                    ))
                    .context(Endpoint::ListReservations),
                );
            }
            Ok(_) => {}
            Err(err) => super::record_ledger_fault(ctx, err),
        }
    }

    for record in &owner.canceled {
        if listed.contains_key(&record.id) {
            ctx.record(
                BenchError::application(format!("canceled reservation {} is still listed", record.id))
                    .context(Endpoint::ListReservations),
            );
        }
    }

    Ok(())
}
