//! The fixed station line
//!
//! Stations are listed in line order starting from Tokyo. Travelling
//! towards a later station is "down", towards an earlier one is "up".

use crate::error::{LedgerError, LedgerResult};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Station {
    pub name: &'static str,
    /// Kilometre post measured from Tokyo
    pub distance_km: f64,
}

const fn station(name: &'static str, distance_km: f64) -> Station {
    Station { name, distance_km }
}

pub const STATIONS: &[Station] = &[
    station("Tokyo", 0.0),
    station("Furuoka", 12.7),
    station("Sanpo", 31.4),
    station("Minami Kawagoe", 58.9),
    station("Isokawa", 82.2),
    station("Yamada", 104.3),
    station("Arakawa", 131.4),
    station("Naruto", 152.5),
    station("Hayama", 176.2),
    station("Kitagawa", 202.1),
    station("Shirakawa", 230.0),
    station("Tokai", 256.8),
    station("Nishi Hama", 281.6),
    station("Kameoka", 310.9),
    station("Nagaura", 338.3),
    station("Futami", 369.1),
    station("Omiya", 395.2),
    station("Kiyosato", 421.0),
    station("Kyoto", 476.3),
    station("Osaka", 552.6),
];

/// Position of a station along the line
pub fn station_index(name: &str) -> LedgerResult<usize> {
    STATIONS
        .iter()
        .position(|station| station.name == name)
        .ok_or_else(|| LedgerError::UnknownStation(name.to_string()))
}

pub fn lookup(name: &str) -> LedgerResult<&'static Station> {
    station_index(name).map(|idx| &STATIONS[idx])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Away from Tokyo
    Down,
    /// Towards Tokyo
    Up,
}

/// A direction-normalised stretch of line: `from < to` as line positions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    pub from: usize,
    pub to: usize,
    pub direction: Direction,
}

impl Section {
    pub fn new(departure: &str, arrival: &str) -> LedgerResult<Self> {
        let dep = station_index(departure)?;
        let arr = station_index(arrival)?;

        match dep.cmp(&arr) {
            std::cmp::Ordering::Less => Ok(Self {
                from: dep,
                to: arr,
                direction: Direction::Down,
            }),
            std::cmp::Ordering::Greater => Ok(Self {
                from: arr,
                to: dep,
                direction: Direction::Up,
            }),
            std::cmp::Ordering::Equal => Err(LedgerError::EmptySection(departure.to_string())),
        }
    }

    /// Whether two same-direction sections share track.
    ///
    /// Sections that only touch at one station do not overlap.
    pub fn overlaps(&self, other: &Section) -> bool {
        self.from < other.to && other.from < self.to
    }

    pub fn distance_km(&self) -> f64 {
        STATIONS[self.to].distance_km - STATIONS[self.from].distance_km
    }
}
