//! Random test data
//!
//! The thread-local generator is created and dropped inside each function so
//! callers never hold it across an await point.

use crate::calendar::Calendar;
use chrono::{Duration as ChronoDuration, NaiveDate, NaiveDateTime, NaiveTime};
use rand::distributions::Alphanumeric;
use rand::seq::{IteratorRandom, SliceRandom};
use rand::Rng;
use railbench_ledger::{SeatClass, User, STATIONS};

const CREDENTIAL_LEN: usize = 20;

fn random_string(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// A fresh user with random credentials
pub fn random_user() -> User {
    User::new(
        format!("{}@example.com", random_string(CREDENTIAL_LEN)),
        random_string(CREDENTIAL_LEN),
    )
}

/// Adult and child counts, each between one and three
pub fn random_passengers() -> (u32, u32) {
    let mut rng = rand::thread_rng();
    (rng.gen_range(1..=3), rng.gen_range(1..=3))
}

/// Two distinct stations in random order
pub fn random_section() -> (String, String) {
    let mut rng = rand::thread_rng();
    let picked: Vec<&str> = STATIONS
        .iter()
        .map(|station| station.name)
        .choose_multiple(&mut rng, 2);

    match picked.as_slice() {
        [a, b] if rng.gen_bool(0.5) => (a.to_string(), b.to_string()),
        [a, b] => (b.to_string(), a.to_string()),
        _ => (STATIONS[0].name.to_string(), STATIONS[STATIONS.len() - 1].name.to_string()),
    }
}

pub fn random_seat_class() -> SeatClass {
    *SeatClass::ALL
        .choose(&mut rand::thread_rng())
        .unwrap_or(&SeatClass::Reserved)
}

/// A car of the given seat class
pub fn random_car(seat_class: SeatClass) -> u32 {
    rand::thread_rng().gen_range(seat_class.cars())
}

/// A departure time between 06:00 and 15:59
pub fn random_time() -> NaiveTime {
    let mut rng = rand::thread_rng();
    NaiveTime::from_hms_opt(rng.gen_range(6..=15), rng.gen_range(0..60), rng.gen_range(0..60))
        .unwrap_or_default()
}

/// A departure within the reservable window, excluding its last day
pub fn random_use_at(calendar: &Calendar) -> NaiveDateTime {
    let span = calendar.available_days.saturating_sub(1).max(1);
    let offset = rand::thread_rng().gen_range(0..span);
    let date = calendar.start_date + ChronoDuration::days(i64::from(offset));
    date.and_time(random_time())
}

/// A departure on `date`
pub fn random_use_at_on(date: NaiveDate) -> NaiveDateTime {
    date.and_time(random_time())
}

/// A departure during the olympic window
pub fn random_olympic_use_at(calendar: &Calendar) -> NaiveDateTime {
    let span = (calendar.olympic_end - calendar.olympic_start).num_days().max(1);
    let offset = rand::thread_rng().gen_range(0..span);
    random_use_at_on(calendar.olympic_start + ChronoDuration::days(offset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use railbench_config::CalendarConfig;

    #[test]
    fn test_random_users_differ() {
        let a = random_user();
        let b = random_user();
        assert_ne!(a.email, b.email);
        assert!(a.email.ends_with("@example.com"));
        assert_eq!(a.password.len(), CREDENTIAL_LEN);
    }

    #[test]
    fn test_random_section_is_distinct() {
        for _ in 0..100 {
            let (from, to) = random_section();
            assert_ne!(from, to);
        }
    }

    #[test]
    fn test_use_at_stays_in_window() {
        let calendar = Calendar::new(&CalendarConfig::default(), 10);
        for _ in 0..100 {
            let use_at = random_use_at(&calendar).date();
            assert!(use_at >= calendar.start_date);
            assert!(use_at < calendar.end_date());
        }
    }

    #[test]
    fn test_olympic_use_at_in_window() {
        let calendar = Calendar::new(&CalendarConfig::default(), 300);
        for _ in 0..50 {
            let date = random_olympic_use_at(&calendar).date();
            assert!(date >= calendar.olympic_start && date < calendar.olympic_end);
        }
    }

    #[test]
    fn test_random_car_matches_class() {
        for class in SeatClass::ALL {
            let car = random_car(class);
            assert_eq!(SeatClass::for_car(car), Some(class));
        }
    }
}
