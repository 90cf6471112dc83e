//! Client of the reservation service under test
//!
//! [`ReservationService`] is the boundary every scenario talks to. Each call
//! returns failures already classified as [`BenchError`]s so the error
//! counters can consume them directly.
//!
//! [`BenchError`]: railbench_core::BenchError

pub mod errors;
pub mod http;
pub mod service;
pub mod types;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use http::{HttpReservationClient, HttpServiceFactory};
pub use service::{ReservationService, ServiceFactory};
pub use types::{
    CardInformation, InitializeResponse, Reservation, ReserveResponse, SeatQuery, StationInfo,
    Train, TrainSearchQuery, TrainSeat,
};
