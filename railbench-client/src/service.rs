//! The service boundary

use crate::types::{
    InitializeResponse, Reservation, ReserveResponse, SeatQuery, StationInfo, Train,
    TrainSearchQuery, TrainSeat,
};
use async_trait::async_trait;
use railbench_core::BenchError;
use railbench_ledger::{ReservationId, ReservationRequest, User};
use std::sync::Arc;

/// One authenticated session against the reservation service.
///
/// Every failure is returned already classified.
#[async_trait]
pub trait ReservationService: Send + Sync {
    /// Reset the service's data. Reports the reservable window and language.
    async fn initialize(&self) -> Result<InitializeResponse, BenchError>;

    async fn signup(&self, user: &User) -> Result<(), BenchError>;

    async fn login(&self, user: &User) -> Result<(), BenchError>;

    async fn logout(&self) -> Result<(), BenchError>;

    async fn list_stations(&self) -> Result<Vec<StationInfo>, BenchError>;

    async fn search_trains(&self, query: &TrainSearchQuery) -> Result<Vec<Train>, BenchError>;

    async fn list_train_seats(&self, query: &SeatQuery) -> Result<Vec<TrainSeat>, BenchError>;

    async fn reserve(&self, request: &ReservationRequest) -> Result<ReserveResponse, BenchError>;

    /// Pay for a reservation and confirm it
    async fn commit_reservation(&self, id: ReservationId) -> Result<(), BenchError>;

    async fn cancel_reservation(&self, id: ReservationId) -> Result<(), BenchError>;

    /// Reservations of the logged-in user
    async fn list_reservations(&self) -> Result<Vec<Reservation>, BenchError>;
}

/// Opens independent sessions, one per scenario
pub trait ServiceFactory: Send + Sync {
    fn session(&self) -> Result<Arc<dyn ReservationService>, BenchError>;

    /// Session for the initialize call, which has its own deadline
    fn initialize_session(&self) -> Result<Arc<dyn ReservationService>, BenchError> {
        self.session()
    }
}
