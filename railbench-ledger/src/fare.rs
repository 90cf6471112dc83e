//! Published fare tables
//!
//! fare = ⌊distance fare × season multiplier × class multiplier⌋

use crate::error::LedgerResult;
use crate::model::{SeatClass, TrainClass};
use crate::station::Section;
use chrono::{Datelike, NaiveDate};
use tracing::debug;

/// Distance bands: (lower bound in km, fare)
const DISTANCE_FARES: &[(f64, u64)] = &[
    (0.0, 2500),
    (50.0, 3000),
    (75.0, 3700),
    (100.0, 4500),
    (150.0, 5200),
    (200.0, 6000),
    (300.0, 7200),
    (400.0, 8300),
    (500.0, 10000),
];

/// Busy seasons as inclusive (month, day) windows, repeated every year
const SEASONS: &[((u32, u32), (u32, u32), f64)] = &[
    ((1, 1), (1, 5), 5.0),
    ((3, 13), (3, 31), 3.0),
    ((4, 24), (5, 10), 5.0),
    ((8, 7), (8, 23), 3.0),
    ((12, 25), (12, 31), 5.0),
];

#[derive(Debug, Clone, Default)]
pub struct FareTable;

impl FareTable {
    pub fn new() -> Self {
        Self
    }

    /// Fare of the highest band not above the section length
    pub fn distance_fare(&self, departure: &str, arrival: &str) -> LedgerResult<u64> {
        let distance = Section::new(departure, arrival)?.distance_km();
        let fare = DISTANCE_FARES
            .iter()
            .rev()
            .find(|(lower, _)| distance >= *lower)
            .map(|(_, fare)| *fare)
            .unwrap_or(DISTANCE_FARES[0].1);
        Ok(fare)
    }

    pub fn season_multiplier(&self, date: NaiveDate) -> f64 {
        let day = (date.month(), date.day());
        SEASONS
            .iter()
            .find(|(start, end, _)| *start <= day && day <= *end)
            .map(|(_, _, multiplier)| *multiplier)
            .unwrap_or(1.0)
    }

    pub fn class_multiplier(&self, train_class: TrainClass, seat_class: SeatClass) -> f64 {
        match (train_class, seat_class) {
            (TrainClass::Express, SeatClass::Premium) => 3.0,
            (TrainClass::Express, SeatClass::Reserved) => 1.875,
            (TrainClass::Express, SeatClass::NonReserved) => 1.5,
            (TrainClass::SemiExpress, SeatClass::Premium) => 2.0,
            (TrainClass::SemiExpress, SeatClass::Reserved) => 1.25,
            (TrainClass::SemiExpress, SeatClass::NonReserved) => 1.0,
            (TrainClass::Local, SeatClass::Premium) => 1.6,
            (TrainClass::Local, SeatClass::Reserved) => 1.0,
            (TrainClass::Local, SeatClass::NonReserved) => 0.8,
        }
    }

    /// Adult fare for one passenger
    pub fn fare(
        &self,
        date: NaiveDate,
        departure: &str,
        arrival: &str,
        train_class: &str,
        seat_class: SeatClass,
    ) -> LedgerResult<u64> {
        let train_class: TrainClass = train_class.parse()?;
        let distance_fare = self.distance_fare(departure, arrival)?;
        let multiplier = self.season_multiplier(date) * self.class_multiplier(train_class, seat_class);

        debug!(
            %date,
            departure,
            arrival,
            %train_class,
            %seat_class,
            distance_fare,
            multiplier,
            "Fare lookup"
        );

        Ok((distance_fare as f64 * multiplier).floor() as u64)
    }
}
