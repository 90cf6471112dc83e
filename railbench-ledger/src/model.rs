//! Reservation domain types

use crate::error::{LedgerError, LedgerResult};
use crate::fare::FareTable;
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier assigned by the service to an accepted reservation
pub type ReservationId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub password: String,
}

impl User {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeatCoordinate {
    pub row: u32,
    pub column: String,
}

impl SeatCoordinate {
    pub fn new(row: u32, column: impl Into<String>) -> Self {
        Self {
            row,
            column: column.into(),
        }
    }
}

impl fmt::Display for SeatCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.row, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainClass {
    Express,
    SemiExpress,
    Local,
}

impl TrainClass {
    pub const ALL: [TrainClass; 3] = [TrainClass::Express, TrainClass::SemiExpress, TrainClass::Local];

    pub fn as_str(&self) -> &'static str {
        match self {
            TrainClass::Express => "express",
            TrainClass::SemiExpress => "semi_express",
            TrainClass::Local => "local",
        }
    }
}

impl fmt::Display for TrainClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrainClass {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TrainClass::ALL
            .into_iter()
            .find(|class| class.as_str() == s)
            .ok_or_else(|| LedgerError::UnknownTrainClass(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SeatClass {
    Premium,
    Reserved,
    NonReserved,
}

impl SeatClass {
    pub const ALL: [SeatClass; 3] = [SeatClass::Premium, SeatClass::Reserved, SeatClass::NonReserved];

    /// Seat class of a car: 1-2 premium, 3-14 reserved, 15-16 non-reserved
    pub fn for_car(car_number: u32) -> Option<SeatClass> {
        match car_number {
            1..=2 => Some(SeatClass::Premium),
            3..=14 => Some(SeatClass::Reserved),
            15..=16 => Some(SeatClass::NonReserved),
            _ => None,
        }
    }

    /// Cars carrying this seat class
    pub fn cars(&self) -> std::ops::RangeInclusive<u32> {
        match self {
            SeatClass::Premium => 1..=2,
            SeatClass::Reserved => 3..=14,
            SeatClass::NonReserved => 15..=16,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SeatClass::Premium => "premium",
            SeatClass::Reserved => "reserved",
            SeatClass::NonReserved => "non-reserved",
        }
    }
}

impl fmt::Display for SeatClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeatClass {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SeatClass::ALL
            .into_iter()
            .find(|class| class.as_str() == s)
            .ok_or_else(|| LedgerError::UnknownSeatClass(s.to_string()))
    }
}

/// A reservation as requested from the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationRequest {
    /// `YYYY-MM-DD` or RFC 3339
    pub date: String,
    pub departure: String,
    pub arrival: String,
    pub train_class: String,
    pub train_name: String,
    pub car_number: u32,
    pub seat_class: SeatClass,
    pub seats: Vec<SeatCoordinate>,
    pub adult: u32,
    pub child: u32,
}

impl ReservationRequest {
    pub fn passenger_count(&self) -> u32 {
        self.adult + self.child
    }
}

/// Parse a travel date, keeping only the calendar day
pub fn parse_date(value: &str) -> LedgerResult<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date);
    }

    DateTime::parse_from_rfc3339(value)
        .map(|datetime| datetime.date_naive())
        .map_err(|_| LedgerError::InvalidDate(value.to_string()))
}

/// One reservation accepted by the service. Never mutated once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReservationRecord {
    pub user: User,
    pub id: ReservationId,
    pub date: NaiveDate,
    pub departure: String,
    pub arrival: String,
    pub train_class: String,
    pub train_name: String,
    pub car_number: u32,
    pub seat_class: SeatClass,
    pub seats: Vec<SeatCoordinate>,
    pub adult: u32,
    pub child: u32,
}

impl ReservationRecord {
    pub fn from_request(
        user: User,
        request: &ReservationRequest,
        id: ReservationId,
    ) -> LedgerResult<Self> {
        Ok(Self {
            user,
            id,
            date: parse_date(&request.date)?,
            departure: request.departure.clone(),
            arrival: request.arrival.clone(),
            train_class: request.train_class.clone(),
            train_name: request.train_name.clone(),
            car_number: request.car_number,
            seat_class: request.seat_class,
            seats: request.seats.clone(),
            adult: request.adult,
            child: request.child,
        })
    }

    pub fn seat_count(&self) -> u32 {
        self.adult + self.child
    }

    /// Whether any requested seat is one of ours
    pub fn shares_seat(&self, seats: &[SeatCoordinate]) -> bool {
        seats.iter().any(|seat| self.seats.contains(seat))
    }

    /// Total price: children pay half, floored
    pub fn amount(&self, fares: &FareTable) -> LedgerResult<u64> {
        let fare = fares.fare(
            self.date,
            &self.departure,
            &self.arrival,
            &self.train_class,
            self.seat_class,
        )?;

        let adult_fare = fare * u64::from(self.adult);
        let child_fare = fare * u64::from(self.child) / 2;
        Ok(adult_fare + child_fare)
    }
}
