//! In-memory fake of the reservation service
//!
//! The fake behaves like a correct implementation unless a [`FakeBehavior`]
//! flag asks it to reproduce a known class of bug. Sessions created by one
//! [`FakeServiceFactory`] share a backend, so concurrent scenarios observe
//! each other's reservations.

use crate::service::{ReservationService, ServiceFactory};
use crate::types::{
    InitializeResponse, Reservation, ReserveResponse, SeatQuery, StationInfo, Train,
    TrainSearchQuery, TrainSeat,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::Mutex;
use railbench_core::{BenchError, Endpoint};
use railbench_ledger::{
    parse_date, FareTable, ReservationId, ReservationRequest, SeatClass, SeatCoordinate, Section,
    TrainClass, User, STATIONS,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

/// Rows per car
pub const FAKE_ROWS: u32 = 10;
/// Seat columns per row
pub const FAKE_COLUMNS: [&str; 5] = ["A", "B", "C", "D", "E"];
/// Trains per class and day
pub const FAKE_TRAINS_PER_CLASS: u32 = 2;

/// Bugs the fake can reproduce
#[derive(Debug, Clone)]
pub struct FakeBehavior {
    pub available_days: u32,
    pub language: String,
    /// Accept reservations for seats that are already taken
    pub allow_double_booking: bool,
    /// Let any logged-in user cancel any reservation
    pub allow_foreign_cancel: bool,
    /// Keep canceled reservations in the owner's listing
    pub keep_canceled_in_listing: bool,
    /// Added to every listed amount
    pub price_offset: u64,
    /// Make initialize fail with a server error
    pub fail_initialize: bool,
    /// Make every reservation attempt time out
    pub time_out_reserve: bool,
    /// Delay applied to every call
    pub latency: Duration,
}

impl Default for FakeBehavior {
    fn default() -> Self {
        Self {
            available_days: 30,
            language: "rust".to_string(),
            allow_double_booking: false,
            allow_foreign_cancel: false,
            keep_canceled_in_listing: false,
            price_offset: 0,
            fail_initialize: false,
            time_out_reserve: false,
            latency: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone)]
struct FakeReservation {
    owner: String,
    request: ReservationRequest,
    date: NaiveDate,
    section: Section,
    amount: u64,
    committed: bool,
    canceled: bool,
}

impl FakeReservation {
    fn holds(&self, date: NaiveDate, class: &str, name: &str, car: u32, section: &Section) -> bool {
        !self.canceled
            && self.date == date
            && self.request.train_class == class
            && self.request.train_name == name
            && self.request.car_number == car
            && self.section.direction == section.direction
            && self.section.overlaps(section)
    }
}

#[derive(Debug, Default)]
struct FakeState {
    users: HashMap<String, String>,
    reservations: BTreeMap<ReservationId, FakeReservation>,
    next_id: ReservationId,
}

/// State shared by all sessions of one fake service
#[derive(Debug)]
pub struct FakeBackend {
    behavior: FakeBehavior,
    fares: FareTable,
    state: Mutex<FakeState>,
}

impl FakeBackend {
    pub fn new(behavior: FakeBehavior) -> Self {
        Self {
            behavior,
            fares: FareTable::new(),
            state: Mutex::new(FakeState {
                next_id: 1,
                ..FakeState::default()
            }),
        }
    }

    pub fn reservation_count(&self) -> usize {
        self.state.lock().reservations.len()
    }

    pub fn committed_count(&self) -> usize {
        self.state
            .lock()
            .reservations
            .values()
            .filter(|r| r.committed)
            .count()
    }

    pub fn user_count(&self) -> usize {
        self.state.lock().users.len()
    }
}

/// Hands out sessions against one shared backend
#[derive(Debug, Clone)]
pub struct FakeServiceFactory {
    backend: Arc<FakeBackend>,
}

impl FakeServiceFactory {
    pub fn new(behavior: FakeBehavior) -> Self {
        Self {
            backend: Arc::new(FakeBackend::new(behavior)),
        }
    }

    pub fn backend(&self) -> Arc<FakeBackend> {
        Arc::clone(&self.backend)
    }

    pub fn fake_session(&self) -> FakeSession {
        FakeSession {
            backend: Arc::clone(&self.backend),
            user: Mutex::new(None),
        }
    }
}

impl Default for FakeServiceFactory {
    fn default() -> Self {
        Self::new(FakeBehavior::default())
    }
}

impl ServiceFactory for FakeServiceFactory {
    fn session(&self) -> Result<Arc<dyn ReservationService>, BenchError> {
        Ok(Arc::new(self.fake_session()))
    }
}

/// One logged-in (or anonymous) client of the fake
#[derive(Debug)]
pub struct FakeSession {
    backend: Arc<FakeBackend>,
    user: Mutex<Option<String>>,
}

/// Train names the fake timetable uses, e.g. `E1` for the first express
pub fn fake_train_name(class: TrainClass, n: u32) -> String {
    let prefix = match class {
        TrainClass::Express => "E",
        TrainClass::SemiExpress => "S",
        TrainClass::Local => "L",
    };
    format!("{prefix}{n}")
}

fn rejected(endpoint: Endpoint, message: &str) -> BenchError {
    BenchError::application(message.to_string()).context(endpoint)
}

impl FakeSession {
    async fn pause(&self) {
        if !self.backend.behavior.latency.is_zero() {
            tokio::time::sleep(self.backend.behavior.latency).await;
        }
    }

    fn current_user(&self, endpoint: Endpoint) -> Result<String, BenchError> {
        self.user
            .lock()
            .clone()
            .ok_or_else(|| rejected(endpoint, "login required"))
    }

    fn validate_request(&self, request: &ReservationRequest) -> Result<(NaiveDate, Section), BenchError> {
        let endpoint = Endpoint::Reserve;
        let date = parse_date(&request.date).map_err(|_| rejected(endpoint, "invalid date"))?;
        let section = Section::new(&request.departure, &request.arrival)
            .map_err(|_| rejected(endpoint, "invalid section"))?;

        if request.seats.is_empty() || request.seats.len() as u32 != request.passenger_count() {
            return Err(rejected(endpoint, "seat count does not match passengers"));
        }

        if SeatClass::for_car(request.car_number) != Some(request.seat_class) {
            return Err(rejected(endpoint, "seat class does not match car"));
        }

        let valid_seat = |seat: &SeatCoordinate| {
            (1..=FAKE_ROWS).contains(&seat.row) && FAKE_COLUMNS.contains(&seat.column.as_str())
        };
        if !request.seats.iter().all(valid_seat) {
            return Err(rejected(endpoint, "no such seat"));
        }

        Ok((date, section))
    }
}

#[async_trait]
impl ReservationService for FakeSession {
    async fn initialize(&self) -> Result<InitializeResponse, BenchError> {
        self.pause().await;
        if self.backend.behavior.fail_initialize {
            return Err(rejected(Endpoint::Initialize, "unexpected status code 500"));
        }

        let mut state = self.backend.state.lock();
        state.reservations.clear();
        state.next_id = 1;

        Ok(InitializeResponse {
            available_days: self.backend.behavior.available_days,
            language: self.backend.behavior.language.clone(),
        })
    }

    async fn signup(&self, user: &User) -> Result<(), BenchError> {
        self.pause().await;
        let mut state = self.backend.state.lock();
        if state.users.contains_key(&user.email) {
            return Err(rejected(Endpoint::Signup, "user already exists"));
        }
        state.users.insert(user.email.clone(), user.password.clone());
        Ok(())
    }

    async fn login(&self, user: &User) -> Result<(), BenchError> {
        self.pause().await;
        let known = self.backend.state.lock().users.get(&user.email).cloned();
        match known {
            Some(password) if password == user.password => {
                *self.user.lock() = Some(user.email.clone());
                Ok(())
            }
            _ => Err(rejected(Endpoint::Login, "authentication failed")),
        }
    }

    async fn logout(&self) -> Result<(), BenchError> {
        self.pause().await;
        self.current_user(Endpoint::Logout)?;
        *self.user.lock() = None;
        Ok(())
    }

    async fn list_stations(&self) -> Result<Vec<StationInfo>, BenchError> {
        self.pause().await;
        Ok(STATIONS
            .iter()
            .enumerate()
            .map(|(idx, station)| StationInfo {
                name: station.name.to_string(),
                distance: station.distance_km,
                is_stop_express: idx % 3 == 0,
            })
            .collect())
    }

    async fn search_trains(&self, query: &TrainSearchQuery) -> Result<Vec<Train>, BenchError> {
        self.pause().await;
        Section::new(&query.from, &query.to)
            .map_err(|_| rejected(Endpoint::SearchTrains, "invalid section"))?;

        let classes: Vec<TrainClass> = match query.train_class.as_deref() {
            None | Some("") => TrainClass::ALL.to_vec(),
            Some(name) => vec![name
                .parse()
                .map_err(|_| rejected(Endpoint::SearchTrains, "unknown train class"))?],
        };

        let trains = classes
            .into_iter()
            .flat_map(|class| {
                (1..=FAKE_TRAINS_PER_CLASS).map(move |n| Train {
                    train_class: class.to_string(),
                    train_name: fake_train_name(class, n),
                    departure: query.from.clone(),
                    arrival: query.to.clone(),
                    departure_at: query.use_at.format("%H:%M:%S").to_string(),
                    arrival_at: String::new(),
                    seat_availability: HashMap::new(),
                })
            })
            .collect();

        Ok(trains)
    }

    async fn list_train_seats(&self, query: &SeatQuery) -> Result<Vec<TrainSeat>, BenchError> {
        self.pause().await;
        let endpoint = Endpoint::ListTrainSeats;
        let date = parse_date(&query.date).map_err(|_| rejected(endpoint, "invalid date"))?;
        let section =
            Section::new(&query.from, &query.to).map_err(|_| rejected(endpoint, "invalid section"))?;
        let class =
            SeatClass::for_car(query.car_number).ok_or_else(|| rejected(endpoint, "no such car"))?;

        let state = self.backend.state.lock();
        let taken: Vec<&SeatCoordinate> = state
            .reservations
            .values()
            .filter(|r| r.holds(date, &query.train_class, &query.train_name, query.car_number, &section))
            .flat_map(|r| r.request.seats.iter())
            .collect();

        let seats = (1..=FAKE_ROWS)
            .flat_map(|row| FAKE_COLUMNS.iter().map(move |column| (row, *column)))
            .map(|(row, column)| {
                let coordinate = SeatCoordinate::new(row, column);
                TrainSeat {
                    row,
                    column: column.to_string(),
                    class,
                    is_smoking_seat: false,
                    is_occupied: taken.contains(&&coordinate),
                }
            })
            .collect();

        Ok(seats)
    }

    async fn reserve(&self, request: &ReservationRequest) -> Result<ReserveResponse, BenchError> {
        self.pause().await;
        if self.backend.behavior.time_out_reserve {
            return Err(BenchError::timeout("request timed out").context(Endpoint::Reserve));
        }
        let owner = self.current_user(Endpoint::Reserve)?;
        let (date, section) = self.validate_request(request)?;

        let fare = self
            .backend
            .fares
            .fare(date, &request.departure, &request.arrival, &request.train_class, request.seat_class)
            .map_err(|_| rejected(Endpoint::Reserve, "unknown train class"))?;
        let amount = fare * u64::from(request.adult) + fare * u64::from(request.child) / 2;

        // check and insert under one lock
        let mut state = self.backend.state.lock();
        if !self.backend.behavior.allow_double_booking {
            let conflict = state.reservations.values().any(|r| {
                r.holds(date, &request.train_class, &request.train_name, request.car_number, &section)
                    && request.seats.iter().any(|seat| r.request.seats.contains(seat))
            });
            if conflict {
                return Err(rejected(Endpoint::Reserve, "seat already reserved"));
            }
        }

        let id = state.next_id;
        state.next_id += 1;
        state.reservations.insert(
            id,
            FakeReservation {
                owner,
                request: request.clone(),
                date,
                section,
                amount,
                committed: false,
                canceled: false,
            },
        );

        Ok(ReserveResponse {
            reservation_id: id,
            amount,
            is_ok: true,
        })
    }

    async fn commit_reservation(&self, id: ReservationId) -> Result<(), BenchError> {
        self.pause().await;
        let endpoint = Endpoint::CommitReservation;
        let owner = self.current_user(endpoint)?;

        let mut state = self.backend.state.lock();
        let reservation = state
            .reservations
            .get_mut(&id)
            .filter(|r| r.owner == owner && !r.canceled)
            .ok_or_else(|| rejected(endpoint, "reservation not found"))?;
        reservation.committed = true;
        Ok(())
    }

    async fn cancel_reservation(&self, id: ReservationId) -> Result<(), BenchError> {
        self.pause().await;
        let endpoint = Endpoint::CancelReservation;
        let owner = self.current_user(endpoint)?;
        let allow_foreign = self.backend.behavior.allow_foreign_cancel;

        let mut state = self.backend.state.lock();
        let reservation = state
            .reservations
            .get_mut(&id)
            .filter(|r| !r.canceled && (allow_foreign || r.owner == owner))
            .ok_or_else(|| rejected(endpoint, "reservation not found"))?;
        reservation.canceled = true;
        reservation.committed = false;
        Ok(())
    }

    async fn list_reservations(&self) -> Result<Vec<Reservation>, BenchError> {
        self.pause().await;
        let owner = self.current_user(Endpoint::ListReservations)?;
        let keep_canceled = self.backend.behavior.keep_canceled_in_listing;
        let offset = self.backend.behavior.price_offset;

        let state = self.backend.state.lock();
        Ok(state
            .reservations
            .iter()
            .filter(|(_, r)| r.owner == owner && (keep_canceled || !r.canceled))
            .map(|(id, r)| Reservation {
                reservation_id: *id,
                date: r.date.format("%Y-%m-%d").to_string(),
                train_class: r.request.train_class.clone(),
                train_name: r.request.train_name.clone(),
                car_number: r.request.car_number,
                seat_class: r.request.seat_class,
                amount: r.amount + offset,
                adult: r.request.adult,
                child: r.request.child,
                departure: r.request.departure.clone(),
                arrival: r.request.arrival.clone(),
                seats: r.request.seats.clone(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ReservationRequest {
        ReservationRequest {
            date: "2020-01-10".to_string(),
            departure: "Tokyo".to_string(),
            arrival: "Kyoto".to_string(),
            train_class: "express".to_string(),
            train_name: "71".to_string(),
            car_number: 5,
            seat_class: SeatClass::Reserved,
            seats: vec![SeatCoordinate::new(2, "B")],
            adult: 1,
            child: 0,
        }
    }

    async fn logged_in(factory: &FakeServiceFactory, email: &str) -> FakeSession {
        let session = factory.fake_session();
        let user = User::new(email, "pw");
        session.signup(&user).await.unwrap();
        session.login(&user).await.unwrap();
        session
    }

    #[tokio::test]
    async fn test_honest_fake_rejects_double_booking() {
        let factory = FakeServiceFactory::default();
        let session = logged_in(&factory, "a@example.com").await;

        session.reserve(&request()).await.unwrap();
        assert!(session.reserve(&request()).await.is_err());

        let seats = session
            .list_train_seats(&SeatQuery {
                date: "2020-01-10".to_string(),
                train_class: "express".to_string(),
                train_name: "71".to_string(),
                car_number: 5,
                from: "Tokyo".to_string(),
                to: "Kyoto".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(seats.iter().filter(|s| s.is_occupied).count(), 1);
    }

    #[tokio::test]
    async fn test_buggy_fake_allows_double_booking() {
        let factory = FakeServiceFactory::new(FakeBehavior {
            allow_double_booking: true,
            ..FakeBehavior::default()
        });
        let session = logged_in(&factory, "a@example.com").await;

        session.reserve(&request()).await.unwrap();
        assert!(session.reserve(&request()).await.is_ok());
    }

    #[tokio::test]
    async fn test_foreign_cancel_rejected() {
        let factory = FakeServiceFactory::default();
        let alice = logged_in(&factory, "alice@example.com").await;
        let bob = logged_in(&factory, "bob@example.com").await;

        let id = alice.reserve(&request()).await.unwrap().reservation_id;
        assert!(bob.cancel_reservation(id).await.is_err());
        assert!(alice.cancel_reservation(id).await.is_ok());
        assert!(alice.list_reservations().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reserve_requires_login() {
        let factory = FakeServiceFactory::default();
        let err = factory.fake_session().reserve(&request()).await.unwrap_err();
        assert_eq!(err.message, "POST /api/train/reserve: login required");
    }

    #[tokio::test]
    async fn test_wrong_section_rejected() {
        let factory = FakeServiceFactory::default();
        let session = logged_in(&factory, "a@example.com").await;

        let mut wrong = request();
        wrong.arrival = "Tokyo".to_string();
        assert!(session.reserve(&wrong).await.is_err());
        assert_eq!(factory.backend().reservation_count(), 0);
    }
}
