//! Recurring budget windows and their calendar normalization.

use std::fmt;

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{
    common::{clamped_date, shift_month},
    period::BudgetPeriod,
    timestamp::Timestamp,
};

/// The `[start, end]` day range currently active for a budget.
///
/// `start` sits at 00:00:00 and `end` at 23:59:59. `anchor` is the date the
/// recurrence was first pinned to: monthly windows restart on the anchor's day
/// of month and yearly windows on its month and day, each clamped to the last
/// day of shorter months. Consecutive windows tile the calendar with no gaps
/// or overlaps, so `end` is always the day before the next cycle start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BudgetWindow {
    start: Timestamp,
    end: Timestamp,
    period: BudgetPeriod,
    anchor: NaiveDate,
}

impl BudgetWindow {
    /// Creates a window beginning on the day of `start` and recurring from it.
    pub fn new(start: Timestamp, period: BudgetPeriod) -> Self {
        let start = start.date();
        Self::aligned(start, period, start)
    }

    /// Same start and anchor, recurring under `period` instead.
    pub fn with_period(&self, period: BudgetPeriod) -> Self {
        Self::aligned(self.start.date(), period, self.anchor)
    }

    pub fn start(&self) -> Timestamp {
        self.start
    }

    pub fn end(&self) -> Timestamp {
        self.end
    }

    pub fn period(&self) -> BudgetPeriod {
        self.period
    }

    pub fn anchor(&self) -> NaiveDate {
        self.anchor
    }

    /// Number of calendar days covered, both ends included.
    pub fn length_days(&self) -> i64 {
        self.start.days_until(&self.end) + 1
    }

    /// True when `timestamp` falls on any day from `start` to `end` inclusive.
    pub fn contains(&self, timestamp: &Timestamp) -> bool {
        timestamp.date_is_after(&self.start.minus_days(1))
            && timestamp.date_is_before(&self.end.plus_days(1))
    }

    /// Returns the window of the same period whose cycle contains `anchor`.
    ///
    /// Every branch is closed-form, so distant anchors cost the same as
    /// nearby ones. Normalizing to a date already inside the window returns
    /// an identical window.
    pub fn normalize(&self, anchor: &Timestamp) -> Self {
        let target = anchor.date();
        let start = match self.period {
            BudgetPeriod::Unbounded if self.contains(anchor) => self.start.date(),
            BudgetPeriod::Day | BudgetPeriod::Unbounded => target,
            BudgetPeriod::Week => {
                let offset = self.start.days_until(anchor).rem_euclid(7) as u64;
                target.checked_sub_days(Days::new(offset)).unwrap_or(target)
            }
            BudgetPeriod::Month => month_cycle_start(self.anchor, target),
            BudgetPeriod::Year => year_cycle_start(self.anchor, target),
        };
        Self::aligned(start, self.period, self.anchor)
    }

    fn aligned(start: NaiveDate, period: BudgetPeriod, anchor: NaiveDate) -> Self {
        let next_start = match period {
            BudgetPeriod::Month => {
                let (year, month) = shift_month(start.year(), start.month(), 1);
                clamped_date(year, month, anchor.day())
            }
            BudgetPeriod::Year => clamped_date(start.year() + 1, anchor.month(), anchor.day()),
            BudgetPeriod::Day | BudgetPeriod::Week | BudgetPeriod::Unbounded => {
                period.advance(start)
            }
        };
        let last_day = next_start.pred_opt().unwrap_or(next_start);
        Self {
            start: Timestamp::from_date(start),
            end: Timestamp::from_date(last_day).end_of_day(),
            period,
            anchor,
        }
    }
}

fn month_cycle_start(anchor: NaiveDate, target: NaiveDate) -> NaiveDate {
    let this_month = clamped_date(target.year(), target.month(), anchor.day());
    if target >= this_month {
        this_month
    } else {
        let (year, month) = shift_month(target.year(), target.month(), -1);
        clamped_date(year, month, anchor.day())
    }
}

fn year_cycle_start(anchor: NaiveDate, target: NaiveDate) -> NaiveDate {
    let this_year = clamped_date(target.year(), anchor.month(), anchor.day());
    if target >= this_year {
        this_year
    } else {
        clamped_date(target.year() - 1, anchor.month(), anchor.day())
    }
}

impl fmt::Display for BudgetWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} to {}",
            self.period.label(),
            self.start.date(),
            self.end.date()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::days_in_month;
    use chrono::NaiveDateTime;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ts(y: i32, m: u32, d: u32) -> Timestamp {
        Timestamp::from_date(date(y, m, d))
    }

    fn window(y: i32, m: u32, d: u32, period: BudgetPeriod) -> BudgetWindow {
        BudgetWindow::new(ts(y, m, d), period)
    }

    fn days(from: NaiveDate, to: NaiveDate) -> impl Iterator<Item = NaiveDate> {
        from.iter_days().take_while(move |day| *day <= to)
    }

    #[test]
    fn new_window_truncates_to_day_boundaries() {
        let noon = NaiveDateTime::parse_from_str("2019-10-05 12:34:56", "%Y-%m-%d %H:%M:%S")
            .unwrap();
        let w = BudgetWindow::new(Timestamp::new(noon), BudgetPeriod::Week);
        assert_eq!(w.start().to_string(), "2019-10-05 00:00:00");
        assert_eq!(w.end().to_string(), "2019-10-11 23:59:59");
        assert_eq!(w.length_days(), 7);
    }

    #[test]
    fn contains_is_inclusive_at_day_granularity() {
        let w = window(2019, 10, 1, BudgetPeriod::Month);
        let last_minute = NaiveDateTime::parse_from_str("2019-10-31 23:59:00", "%Y-%m-%d %H:%M:%S")
            .unwrap();
        assert!(w.contains(&ts(2019, 10, 1)));
        assert!(w.contains(&Timestamp::new(last_minute)));
        assert!(!w.contains(&ts(2019, 9, 30)));
        assert!(!w.contains(&ts(2019, 11, 1)));
    }

    #[test]
    fn month_anchored_on_31st_clamps_into_short_months() {
        let w = window(2019, 1, 31, BudgetPeriod::Month);
        assert_eq!(w.start().date(), date(2019, 1, 31));
        assert_eq!(w.end().date(), date(2019, 2, 27));

        let february = w.normalize(&ts(2019, 2, 10));
        assert_eq!(february.start().date(), date(2019, 1, 31));
        assert_eq!(february.end().date(), date(2019, 2, 27));

        let march = w.normalize(&ts(2019, 3, 10));
        assert_eq!(march.start().date(), date(2019, 2, 28));
        assert_eq!(march.end().date(), date(2019, 3, 30));

        let april = w.normalize(&ts(2019, 4, 30));
        assert_eq!(april.start().date(), date(2019, 4, 30));
        assert_eq!(april.end().date(), date(2019, 5, 30));
    }

    #[test]
    fn month_anchor_survives_a_clamped_start() {
        let clamped = window(2019, 1, 31, BudgetPeriod::Month).normalize(&ts(2019, 3, 1));
        assert_eq!(clamped.start().date(), date(2019, 2, 28));

        let later = clamped.normalize(&ts(2019, 7, 31));
        assert_eq!(later.start().date(), date(2019, 7, 31));
        assert_eq!(later.end().date(), date(2019, 8, 30));
        assert_eq!(later.anchor(), date(2019, 1, 31));
    }

    #[test]
    fn clamped_cycle_reaches_the_day_before_the_next_anchor() {
        let w = window(2019, 1, 31, BudgetPeriod::Month);

        let late_march = w.normalize(&ts(2019, 3, 29));
        assert_eq!(late_march.start().date(), date(2019, 2, 28));
        assert!(late_march.contains(&ts(2019, 3, 30)));
        assert!(!late_march.contains(&ts(2019, 3, 31)));

        let february_end = w.normalize(&ts(2019, 2, 28));
        assert_eq!(february_end.start().date(), date(2019, 2, 28));
        assert!(!w.contains(&ts(2019, 2, 28)));
    }

    #[test]
    fn changing_period_keeps_the_anchor() {
        let clamped = window(2019, 1, 31, BudgetPeriod::Month).normalize(&ts(2019, 3, 10));
        assert_eq!(clamped.start().date(), date(2019, 2, 28));

        let rebuilt = clamped.with_period(BudgetPeriod::Month);
        assert_eq!(rebuilt, clamped);
        assert_eq!(rebuilt.end().date(), date(2019, 3, 30));

        let yearly = clamped.with_period(BudgetPeriod::Year);
        assert_eq!(yearly.anchor(), date(2019, 1, 31));
        assert_eq!(
            yearly.normalize(&ts(2020, 2, 10)).start().date(),
            date(2020, 1, 31)
        );
    }

    #[test]
    fn month_leap_february_uses_29th() {
        let w = window(2020, 1, 31, BudgetPeriod::Month).normalize(&ts(2020, 3, 15));
        assert_eq!(w.start().date(), date(2020, 2, 29));
        assert_eq!(w.end().date(), date(2020, 3, 30));
        assert_eq!(w.length_days(), 31);
    }

    #[test]
    fn month_windows_tile_the_calendar_for_every_anchor_day() {
        let first = date(2019, 1, 1);
        let last = date(2021, 12, 31);
        for anchor_day in 1..=31 {
            let base = window(2019, 1, anchor_day, BudgetPeriod::Month);
            for target in days(first, last) {
                let w = base.normalize(&Timestamp::from_date(target));
                let start = w.start().date();
                assert!(w.contains(&Timestamp::from_date(target)), "{w} misses {target}");
                assert!((28..=31).contains(&w.length_days()), "{w} has bad length");
                assert_eq!(
                    start.day(),
                    anchor_day.min(days_in_month(start.year(), start.month()))
                );
                assert_eq!(w.normalize(&w.start()), w);
                assert_eq!(w.normalize(&w.end()), w);
                let next = w.normalize(&w.end().plus_days(1));
                assert_eq!(next.start().date(), w.end().date().succ_opt().unwrap());
            }
        }
    }

    #[test]
    fn year_window_handles_leap_day_anchor() {
        let leap = window(2020, 2, 29, BudgetPeriod::Year);
        assert_eq!(leap.end().date(), date(2021, 2, 27));
        assert_eq!(leap.length_days(), 365);

        let common = leap.normalize(&ts(2021, 3, 1));
        assert_eq!(common.start().date(), date(2021, 2, 28));
        assert_eq!(common.end().date(), date(2022, 2, 27));

        let back_to_leap = common.normalize(&ts(2024, 6, 1));
        assert_eq!(back_to_leap.start().date(), date(2024, 2, 29));
        assert_eq!(back_to_leap.end().date(), date(2025, 2, 27));

        let before_cycle = leap.normalize(&ts(2021, 1, 15));
        assert_eq!(before_cycle.start().date(), date(2020, 2, 29));
    }

    #[test]
    fn year_windows_span_365_or_366_days() {
        for (y, m, d) in [(2019, 3, 1), (2020, 2, 29), (2019, 12, 31), (2019, 1, 1)] {
            let base = window(y, m, d, BudgetPeriod::Year);
            for target in days(date(2019, 1, 1), date(2026, 12, 31)).step_by(3) {
                let w = base.normalize(&Timestamp::from_date(target));
                assert!(w.contains(&Timestamp::from_date(target)));
                assert!((365..=366).contains(&w.length_days()), "{w}");
                assert_eq!(w.normalize(&w.start()), w);
                assert_eq!(w.normalize(&w.end()), w);
            }
        }
        let spans_leap_day = window(2019, 3, 1, BudgetPeriod::Year);
        assert_eq!(spans_leap_day.end().date(), date(2020, 2, 29));
        assert_eq!(spans_leap_day.length_days(), 366);
    }

    #[test]
    fn week_normalization_keeps_weekday_alignment() {
        let monday = window(2019, 9, 30, BudgetPeriod::Week);

        let same_week = monday.normalize(&ts(2019, 10, 3));
        assert_eq!(same_week, monday);

        let next_week = monday.normalize(&ts(2019, 10, 10));
        assert_eq!(next_week.start().date(), date(2019, 10, 7));
        assert_eq!(next_week.end().date(), date(2019, 10, 13));

        let earlier = monday.normalize(&ts(2019, 9, 28));
        assert_eq!(earlier.start().date(), date(2019, 9, 23));
        assert_eq!(earlier.length_days(), 7);
    }

    #[test]
    fn day_window_follows_anchor() {
        let w = window(2019, 5, 5, BudgetPeriod::Day).normalize(&ts(2018, 12, 31));
        assert_eq!(w.start().date(), date(2018, 12, 31));
        assert_eq!(w.end().date(), date(2018, 12, 31));
    }

    #[test]
    fn unbounded_window_only_moves_to_cover_outside_anchor() {
        let w = window(2019, 1, 1, BudgetPeriod::Unbounded);
        assert_eq!(w.end().date(), date(3017, 12, 31));
        assert_eq!(w.normalize(&ts(2030, 6, 1)), w);

        let earlier = w.normalize(&ts(2018, 6, 1));
        assert_eq!(earlier.start().date(), date(2018, 6, 1));
        assert_eq!(earlier.end().date(), date(3017, 5, 31));
    }

    #[test]
    fn distant_anchors_resolve_in_closed_form() {
        let w = window(2019, 1, 31, BudgetPeriod::Month);
        let far_future = w.normalize(&ts(9000, 2, 15));
        assert_eq!(far_future.start().date(), date(9000, 1, 31));
        let far_past = w.normalize(&ts(1, 3, 30));
        assert_eq!(far_past.start().date(), date(1, 2, 28));
        assert_eq!(far_past.end().date(), date(1, 3, 30));
    }

    #[test]
    fn display_names_period_and_dates() {
        let w = window(2019, 1, 31, BudgetPeriod::Month);
        insta::assert_snapshot!(w.to_string(), @"Monthly: 2019-01-31 to 2019-02-27");
    }
}
