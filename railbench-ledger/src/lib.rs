//! Reservation ledger for railbench
//!
//! The ledger is the benchmarker's own record of every reservation the
//! service accepted. It predicts, independently of the service, whether a
//! new reservation must be admitted, which is how double booking and race
//! conditions in the service under test are detected.

pub mod error;
pub mod fare;
pub mod ledger;
pub mod model;
pub mod station;

pub use error::{LedgerError, LedgerResult};
pub use fare::FareTable;
pub use ledger::{Admission, ReservationLedger};
pub use model::{
    parse_date, ReservationId, ReservationRecord, ReservationRequest, SeatClass, SeatCoordinate,
    TrainClass, User,
};
pub use station::{Direction, Section, Station, STATIONS};
