//! Ledger error types

use crate::model::ReservationId;
use thiserror::Error;

pub type LedgerResult<T> = Result<T, LedgerError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("unknown reservation: {0}")]
    UnknownReservation(ReservationId),

    /// Canceled reservations cannot become committed again
    #[error("reservation {0} is already canceled")]
    AlreadyCanceled(ReservationId),

    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error("unknown station: {0}")]
    UnknownStation(String),

    #[error("departure and arrival are the same station: {0}")]
    EmptySection(String),

    #[error("unknown train class: {0}")]
    UnknownTrainClass(String),

    #[error("unknown seat class: {0}")]
    UnknownSeatClass(String),
}
