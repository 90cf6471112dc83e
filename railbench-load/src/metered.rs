//! Success metering of service calls

use async_trait::async_trait;
use railbench_client::{
    InitializeResponse, Reservation, ReservationService, ReserveResponse, SeatQuery, StationInfo,
    Train, TrainSearchQuery, TrainSeat,
};
use railbench_core::{BenchError, Endpoint, EndpointCounter};
use railbench_ledger::{ReservationId, ReservationRequest, User};
use std::sync::Arc;

/// Decorates a session so every successful call is counted for scoring
pub struct MeteredService {
    inner: Arc<dyn ReservationService>,
    counter: Arc<EndpointCounter>,
}

impl MeteredService {
    pub fn new(inner: Arc<dyn ReservationService>, counter: Arc<EndpointCounter>) -> Self {
        Self { inner, counter }
    }

    fn record<T>(&self, endpoint: Endpoint, result: Result<T, BenchError>) -> Result<T, BenchError> {
        if result.is_ok() {
            self.counter.increment(endpoint);
        }
        result
    }
}

#[async_trait]
impl ReservationService for MeteredService {
    async fn initialize(&self) -> Result<InitializeResponse, BenchError> {
        let result = self.inner.initialize().await;
        self.record(Endpoint::Initialize, result)
    }

    async fn signup(&self, user: &User) -> Result<(), BenchError> {
        let result = self.inner.signup(user).await;
        self.record(Endpoint::Signup, result)
    }

    async fn login(&self, user: &User) -> Result<(), BenchError> {
        let result = self.inner.login(user).await;
        self.record(Endpoint::Login, result)
    }

    async fn logout(&self) -> Result<(), BenchError> {
        let result = self.inner.logout().await;
        self.record(Endpoint::Logout, result)
    }

    async fn list_stations(&self) -> Result<Vec<StationInfo>, BenchError> {
        let result = self.inner.list_stations().await;
        self.record(Endpoint::ListStations, result)
    }

    async fn search_trains(&self, query: &TrainSearchQuery) -> Result<Vec<Train>, BenchError> {
        let result = self.inner.search_trains(query).await;
        self.record(Endpoint::SearchTrains, result)
    }

    async fn list_train_seats(&self, query: &SeatQuery) -> Result<Vec<TrainSeat>, BenchError> {
        let result = self.inner.list_train_seats(query).await;
        self.record(Endpoint::ListTrainSeats, result)
    }

    async fn reserve(&self, request: &ReservationRequest) -> Result<ReserveResponse, BenchError> {
        let result = self.inner.reserve(request).await;
        self.record(Endpoint::Reserve, result)
    }

    async fn commit_reservation(&self, id: ReservationId) -> Result<(), BenchError> {
        let result = self.inner.commit_reservation(id).await;
        self.record(Endpoint::CommitReservation, result)
    }

    async fn cancel_reservation(&self, id: ReservationId) -> Result<(), BenchError> {
        let result = self.inner.cancel_reservation(id).await;
        self.record(Endpoint::CancelReservation, result)
    }

    async fn list_reservations(&self) -> Result<Vec<Reservation>, BenchError> {
        let result = self.inner.list_reservations().await;
        self.record(Endpoint::ListReservations, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use railbench_client::testing::FakeServiceFactory;
    use railbench_client::ServiceFactory;

    #[tokio::test]
    async fn test_only_successes_are_counted() {
        let factory = FakeServiceFactory::default();
        let counter = Arc::new(EndpointCounter::new());
        let session = MeteredService::new(factory.session().unwrap(), Arc::clone(&counter));

        let user = User::new("a@example.com", "pw");
        session.signup(&user).await.unwrap();
        assert!(session.signup(&user).await.is_err());
        session.login(&user).await.unwrap();
        session.list_stations().await.unwrap();

        assert_eq!(counter.count(Endpoint::Signup), 1);
        assert_eq!(counter.count(Endpoint::Login), 1);
        assert_eq!(counter.count(Endpoint::ListStations), 1);
        assert_eq!(counter.total_count(), 3);
    }
}
