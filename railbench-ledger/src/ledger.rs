//! The reservation ledger

use crate::error::{LedgerError, LedgerResult};
use crate::model::{parse_date, ReservationId, ReservationRecord, ReservationRequest, User};
use crate::station::Section;
use futures::future::try_join_all;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Outcome of an admission check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// No existing reservation holds any requested seat on the section
    Admit,
    /// The given reservation already holds a requested seat
    Conflict(ReservationId),
    /// The candidate could not be evaluated; treated as "do not admit"
    Indeterminate,
}

impl Admission {
    pub fn is_admissible(&self) -> bool {
        matches!(self, Admission::Admit)
    }
}

// Why a single pairwise check refused the candidate
enum Refusal {
    Conflict(ReservationId),
    Indeterminate,
}

#[derive(Debug, Default)]
struct LedgerState {
    all: HashMap<ReservationId, Arc<ReservationRecord>>,
    committed: HashMap<ReservationId, Arc<ReservationRecord>>,
    canceled: HashMap<ReservationId, Arc<ReservationRecord>>,
}

/// In-memory record of accepted reservations.
///
/// Reads (admission checks, lookups, traversals) share the lock; register,
/// commit and cancel take it exclusively. No lock is held across a call to
/// the service.
#[derive(Debug, Default)]
pub struct ReservationLedger {
    state: RwLock<LedgerState>,
}

impl ReservationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lookup(&self, id: ReservationId) -> Option<ReservationRecord> {
        let state = self.state.read().await;
        state.all.get(&id).map(|record| record.as_ref().clone())
    }

    pub async fn can_admit(&self, candidate: &ReservationRequest) -> bool {
        self.check_admission(candidate).await.is_admissible()
    }

    /// Decide whether the service must accept `candidate`.
    ///
    /// One check per existing reservation runs concurrently under the shared
    /// read guard; the first refusal wins. Canceled reservations no longer
    /// hold their seats and are skipped.
    pub async fn check_admission(&self, candidate: &ReservationRequest) -> Admission {
        let date = match parse_date(&candidate.date) {
            Ok(date) => date,
            Err(e) => {
                debug!(error = %e, "Admission check on malformed date");
                return Admission::Indeterminate;
            }
        };

        let section = match Section::new(&candidate.departure, &candidate.arrival) {
            Ok(section) => section,
            Err(e) => {
                debug!(error = %e, "Admission check on unknown section");
                return Admission::Indeterminate;
            }
        };

        let state = self.state.read().await;

        let checks = state
            .all
            .values()
            .filter(|record| !state.canceled.contains_key(&record.id))
            .map(|record| async move {
                if record.date != date
                    || record.train_class != candidate.train_class
                    || record.train_name != candidate.train_name
                {
                    return Ok(());
                }

                let existing = Section::new(&record.departure, &record.arrival).map_err(|e| {
                    warn!(id = record.id, error = %e, "Recorded reservation has an invalid section");
                    Refusal::Indeterminate
                })?;

                if existing.direction != section.direction || !existing.overlaps(&section) {
                    return Ok(());
                }

                if record.car_number == candidate.car_number && record.shares_seat(&candidate.seats) {
                    return Err(Refusal::Conflict(record.id));
                }

                Ok::<(), Refusal>(())
            });

        match try_join_all(checks).await {
            Ok(_) => Admission::Admit,
            Err(Refusal::Conflict(id)) => Admission::Conflict(id),
            Err(Refusal::Indeterminate) => Admission::Indeterminate,
        }
    }

    /// Record a reservation the service accepted under `id`
    pub async fn register(
        &self,
        user: User,
        candidate: &ReservationRequest,
        id: ReservationId,
    ) -> LedgerResult<()> {
        let record = ReservationRecord::from_request(user, candidate, id)?;

        info!(
            id,
            user = %record.user.email,
            date = %record.date,
            departure = %record.departure,
            arrival = %record.arrival,
            train_class = %record.train_class,
            train_name = %record.train_name,
            car_number = record.car_number,
            seat_class = %record.seat_class,
            seats = record.seats.len(),
            adult = record.adult,
            child = record.child,
            "Reservation registered"
        );

        let mut state = self.state.write().await;
        state.all.insert(id, Arc::new(record));
        Ok(())
    }

    /// Mark committed. Committed and canceled stay disjoint, so a canceled
    /// reservation is refused.
    pub async fn commit(&self, id: ReservationId) -> LedgerResult<()> {
        let mut state = self.state.write().await;
        let record = state.all.get(&id).cloned().ok_or_else(|| {
            warn!(id, "Commit of an unknown reservation");
            LedgerError::UnknownReservation(id)
        })?;
        if state.canceled.contains_key(&id) {
            warn!(id, "Commit of a canceled reservation");
            return Err(LedgerError::AlreadyCanceled(id));
        }

        state.committed.insert(id, record);
        Ok(())
    }

    /// Mark canceled; a committed reservation stops being committed
    pub async fn cancel(&self, id: ReservationId) -> LedgerResult<()> {
        let mut state = self.state.write().await;
        let record = state.all.get(&id).cloned().ok_or_else(|| {
            warn!(id, "Cancel of an unknown reservation");
            LedgerError::UnknownReservation(id)
        })?;

        state.committed.remove(&id);
        state.canceled.insert(id, record);
        Ok(())
    }

    pub async fn for_each_committed<F>(&self, mut visit: F)
    where
        F: FnMut(&ReservationRecord),
    {
        let state = self.state.read().await;
        for record in state.committed.values() {
            visit(record);
        }
    }

    pub async fn for_each_canceled<F>(&self, mut visit: F)
    where
        F: FnMut(&ReservationRecord),
    {
        let state = self.state.read().await;
        for record in state.canceled.values() {
            visit(record);
        }
    }

    pub async fn is_committed(&self, id: ReservationId) -> bool {
        self.state.read().await.committed.contains_key(&id)
    }

    pub async fn is_canceled(&self, id: ReservationId) -> bool {
        self.state.read().await.canceled.contains_key(&id)
    }

    pub async fn count(&self) -> usize {
        self.state.read().await.all.len()
    }

    pub async fn committed_count(&self) -> usize {
        self.state.read().await.committed.len()
    }

    pub async fn canceled_count(&self) -> usize {
        self.state.read().await.canceled.len()
    }
}
