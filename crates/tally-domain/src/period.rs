use std::{fmt, str::FromStr};

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Length of the "effectively infinite" period.
pub const UNBOUNDED_YEARS: u32 = 999;

/// Enumerates the recurrence cadences a budget window can follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    Day,
    Week,
    Month,
    Year,
    #[serde(alias = "infinity")]
    Unbounded,
}

impl BudgetPeriod {
    pub const ALL: [BudgetPeriod; 5] = [
        BudgetPeriod::Day,
        BudgetPeriod::Week,
        BudgetPeriod::Month,
        BudgetPeriod::Year,
        BudgetPeriod::Unbounded,
    ];

    /// Adds one nominal period to `date`, clamping to the last day of shorter
    /// months. Saturates at the latest representable date.
    pub fn advance(self, date: NaiveDate) -> NaiveDate {
        let next = match self {
            BudgetPeriod::Day => date.checked_add_days(Days::new(1)),
            BudgetPeriod::Week => date.checked_add_days(Days::new(7)),
            BudgetPeriod::Month => date.checked_add_months(Months::new(1)),
            BudgetPeriod::Year => date.checked_add_months(Months::new(12)),
            BudgetPeriod::Unbounded => date.checked_add_months(Months::new(UNBOUNDED_YEARS * 12)),
        };
        next.unwrap_or(NaiveDate::MAX)
    }

    /// Periods whose length depends on the calendar month they start in.
    pub fn is_calendar_based(self) -> bool {
        matches!(self, BudgetPeriod::Month | BudgetPeriod::Year)
    }

    pub fn label(self) -> &'static str {
        match self {
            BudgetPeriod::Day => "Daily",
            BudgetPeriod::Week => "Weekly",
            BudgetPeriod::Month => "Monthly",
            BudgetPeriod::Year => "Yearly",
            BudgetPeriod::Unbounded => "Unbounded",
        }
    }
}

impl fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keyword = match self {
            BudgetPeriod::Day => "day",
            BudgetPeriod::Week => "week",
            BudgetPeriod::Month => "month",
            BudgetPeriod::Year => "year",
            BudgetPeriod::Unbounded => "infinity",
        };
        f.write_str(keyword)
    }
}

impl FromStr for BudgetPeriod {
    type Err = ParsePeriodError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(BudgetPeriod::Day),
            "week" => Ok(BudgetPeriod::Week),
            "month" => Ok(BudgetPeriod::Month),
            "year" => Ok(BudgetPeriod::Year),
            "infinity" | "unbounded" => Ok(BudgetPeriod::Unbounded),
            _ => Err(ParsePeriodError(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Returned when a period selector is not one of day/week/month/year/infinity.
pub struct ParsePeriodError(pub String);

impl fmt::Display for ParsePeriodError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "`{}` is not a budget period (expected day/week/month/year/infinity)",
            self.0
        )
    }
}

impl std::error::Error for ParsePeriodError {}
