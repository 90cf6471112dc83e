//! Wire types of the reservation service

use chrono::NaiveDateTime;
use railbench_ledger::{ReservationId, SeatClass, SeatCoordinate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Format of `use_at` query values
pub const USE_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitializeResponse {
    /// Days ahead the service accepts reservations for
    pub available_days: u32,
    /// Implementation language reported by the team
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationInfo {
    pub name: String,
    #[serde(default)]
    pub distance: f64,
    #[serde(default)]
    pub is_stop_express: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainSearchQuery {
    pub use_at: NaiveDateTime,
    /// Empty searches all classes
    pub train_class: Option<String>,
    pub from: String,
    pub to: String,
    pub adult: u32,
    pub child: u32,
}

impl TrainSearchQuery {
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("use_at", self.use_at.format(USE_AT_FORMAT).to_string()),
            ("train_class", self.train_class.clone().unwrap_or_default()),
            ("from", self.from.clone()),
            ("to", self.to.clone()),
            ("adult", self.adult.to_string()),
            ("child", self.child.to_string()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Train {
    pub train_class: String,
    pub train_name: String,
    pub departure: String,
    pub arrival: String,
    #[serde(default)]
    pub departure_at: String,
    #[serde(default)]
    pub arrival_at: String,
    /// Seat class -> availability label
    #[serde(default)]
    pub seat_availability: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatQuery {
    /// `YYYY-MM-DD`
    pub date: String,
    pub train_class: String,
    pub train_name: String,
    pub car_number: u32,
    pub from: String,
    pub to: String,
}

impl SeatQuery {
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("date", self.date.clone()),
            ("train_class", self.train_class.clone()),
            ("train_name", self.train_name.clone()),
            ("car_number", self.car_number.to_string()),
            ("from", self.from.clone()),
            ("to", self.to.clone()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainSeat {
    pub row: u32,
    pub column: String,
    pub class: SeatClass,
    #[serde(default)]
    pub is_smoking_seat: bool,
    #[serde(default)]
    pub is_occupied: bool,
}

impl TrainSeat {
    pub fn coordinate(&self) -> SeatCoordinate {
        SeatCoordinate::new(self.row, self.column.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct SeatListing {
    pub seats: Vec<TrainSeat>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveResponse {
    pub reservation_id: ReservationId,
    #[serde(default)]
    pub amount: u64,
    #[serde(default)]
    pub is_ok: bool,
}

/// A reservation as listed by the service for its owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub reservation_id: ReservationId,
    pub date: String,
    pub train_class: String,
    pub train_name: String,
    pub car_number: u32,
    pub seat_class: SeatClass,
    pub amount: u64,
    pub adult: u32,
    pub child: u32,
    pub departure: String,
    pub arrival: String,
    #[serde(default)]
    pub seats: Vec<SeatCoordinate>,
}

/// Card registered with the payment service before a commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardInformation {
    pub card_number: String,
    pub cvv: String,
    pub expiry_date: String,
}

impl Default for CardInformation {
    fn default() -> Self {
        Self {
            card_number: "11111111".to_string(),
            cvv: "111".to_string(),
            expiry_date: "11/22".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CardTokenResponse {
    pub card_token: String,
    #[serde(default)]
    pub is_ok: bool,
}
