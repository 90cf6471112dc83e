//! Reservable window and seasonal gates

use chrono::{Datelike, Duration as ChronoDuration, NaiveDate};
use railbench_config::CalendarConfig;

/// The reservable window reported by the service, combined with the
/// configured seasonal windows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calendar {
    pub start_date: NaiveDate,
    pub available_days: u32,
    pub golden_week_start: NaiveDate,
    pub golden_week_end: NaiveDate,
    pub olympic_start: NaiveDate,
    pub olympic_end: NaiveDate,
}

impl Calendar {
    pub fn new(config: &CalendarConfig, available_days: u32) -> Self {
        Self {
            start_date: config.reservation_start_date,
            available_days,
            golden_week_start: config.golden_week_start,
            golden_week_end: config.golden_week_end,
            olympic_start: config.olympic_start,
            olympic_end: config.olympic_end,
        }
    }

    /// Last reservable date
    pub fn end_date(&self) -> NaiveDate {
        self.start_date + ChronoDuration::days(i64::from(self.available_days))
    }

    /// Number of concurrent load units: the month of the last reservable date
    pub fn load_level(&self) -> u32 {
        self.end_date().month()
    }

    pub fn is_golden_week_started(&self) -> bool {
        self.end_date() >= self.golden_week_start
    }

    pub fn is_golden_week_ended(&self) -> bool {
        self.end_date() > self.golden_week_end
    }

    pub fn is_olympic(&self) -> bool {
        self.end_date() >= self.olympic_start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calendar(days: u32) -> Calendar {
        Calendar::new(&CalendarConfig::default(), days)
    }

    #[test]
    fn test_load_level_follows_end_month() {
        assert_eq!(calendar(10).load_level(), 1);
        assert_eq!(calendar(60).load_level(), 3);
        assert_eq!(calendar(366).load_level(), 1);
    }

    #[test]
    fn test_season_gates() {
        let early = calendar(30);
        assert!(!early.is_golden_week_started());
        assert!(!early.is_olympic());

        // 2020-01-01 + 120 days = 2020-04-30
        let golden = calendar(120);
        assert!(golden.is_golden_week_started());
        assert!(!golden.is_golden_week_ended());

        let summer = calendar(220);
        assert!(summer.is_golden_week_ended());
        assert!(summer.is_olympic());
    }
}
