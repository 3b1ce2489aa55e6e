use std::fmt;

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// An immutable instant with day-granularity comparison helpers.
///
/// Budget windows compare timestamps by calendar date only, so most helpers
/// here come in a `date_is_*` flavour that ignores the time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
    pub fn new(value: NaiveDateTime) -> Self {
        Self(value)
    }

    /// Midnight at the start of `date`.
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.and_time(NaiveTime::MIN))
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self::from_date)
    }

    /// The current local wall-clock time.
    pub fn now() -> Self {
        Self(Local::now().naive_local())
    }

    pub fn date_time(&self) -> NaiveDateTime {
        self.0
    }

    pub fn date(&self) -> NaiveDate {
        self.0.date()
    }

    pub fn start_of_day(&self) -> Self {
        Self::from_date(self.date())
    }

    /// 23:59:59 on the same calendar date.
    pub fn end_of_day(&self) -> Self {
        let last_second = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
        Self(self.date().and_time(last_second))
    }

    pub fn plus_days(&self, days: i64) -> Self {
        Self(
            self.0
                .checked_add_signed(Duration::days(days))
                .unwrap_or(NaiveDateTime::MAX),
        )
    }

    pub fn minus_days(&self, days: i64) -> Self {
        Self(
            self.0
                .checked_sub_signed(Duration::days(days))
                .unwrap_or(NaiveDateTime::MIN),
        )
    }

    pub fn is_before(&self, other: &Timestamp) -> bool {
        self.0 < other.0
    }

    pub fn is_after(&self, other: &Timestamp) -> bool {
        self.0 > other.0
    }

    pub fn date_is_before(&self, other: &Timestamp) -> bool {
        self.date() < other.date()
    }

    pub fn date_is_after(&self, other: &Timestamp) -> bool {
        self.date() > other.date()
    }

    pub fn date_is_equal(&self, other: &Timestamp) -> bool {
        self.date() == other.date()
    }

    /// Whole calendar days from `self` to `other` (negative when `other` is earlier).
    pub fn days_until(&self, other: &Timestamp) -> i64 {
        (other.date() - self.date()).num_days()
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day_of_month(&self) -> u32 {
        self.0.day()
    }

    pub fn day_of_year(&self) -> u32 {
        self.0.ordinal()
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(value: NaiveDateTime) -> Self {
        Self::new(value)
    }
}

impl From<NaiveDate> for Timestamp {
    fn from(value: NaiveDate) -> Self {
        Self::from_date(value)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d %H:%M:%S"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> Timestamp {
        Timestamp::new(
            NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(h, min, 0)
                .unwrap(),
        )
    }

    #[test]
    fn day_boundaries_truncate_time_of_day() {
        let ts = at(2019, 10, 5, 14, 30);
        assert_eq!(ts.start_of_day(), at(2019, 10, 5, 0, 0));
        assert_eq!(ts.end_of_day().to_string(), "2019-10-05 23:59:59");
    }

    #[test]
    fn date_comparisons_ignore_time_of_day() {
        let morning = at(2019, 10, 5, 8, 0);
        let evening = at(2019, 10, 5, 22, 0);
        assert!(morning.is_before(&evening));
        assert!(morning.date_is_equal(&evening));
        assert!(!morning.date_is_before(&evening));
        assert!(evening.plus_days(1).date_is_after(&morning));
    }

    #[test]
    fn day_arithmetic_crosses_month_and_year_boundaries() {
        let ts = at(2019, 12, 31, 9, 0);
        assert_eq!(ts.plus_days(1).date(), NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert_eq!(
            at(2020, 3, 1, 0, 0).minus_days(1).date(),
            NaiveDate::from_ymd_opt(2020, 2, 29).unwrap()
        );
        assert_eq!(at(2019, 1, 1, 0, 0).days_until(&at(2018, 12, 25, 0, 0)), -7);
    }

    #[test]
    fn serializes_as_plain_datetime() {
        let ts = at(2019, 1, 31, 0, 0);
        let json = serde_json::to_string(&ts).unwrap();
        assert_eq!(json, "\"2019-01-31T00:00:00\"");
        let back: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ts);
    }
}
