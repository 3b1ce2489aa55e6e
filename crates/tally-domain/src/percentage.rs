use std::fmt;

use serde::{Deserialize, Serialize};

/// A whole-number share of a budget's limit, always within `0..=100`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct Percentage(u8);

impl Percentage {
    pub const ZERO: Percentage = Percentage(0);
    pub const HALF: Percentage = Percentage(50);
    pub const NEAR: Percentage = Percentage(90);
    pub const FULL: Percentage = Percentage(100);

    pub fn new(value: u8) -> Result<Self, PercentageError> {
        if value > 100 {
            return Err(PercentageError(value));
        }
        Ok(Self(value))
    }

    /// Rounds `part / whole` to the nearest percent and saturates at 100.
    ///
    /// A non-positive or non-finite ratio yields zero.
    pub fn calculate(part: f64, whole: f64) -> Self {
        if whole <= 0.0 || !whole.is_finite() {
            return Self::ZERO;
        }
        let ratio = (part / whole * 100.0).round();
        if !ratio.is_finite() || ratio <= 0.0 {
            Self::ZERO
        } else if ratio >= 100.0 {
            Self::FULL
        } else {
            Self(ratio as u8)
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// True once this share is at or above `threshold`.
    pub fn reaches(self, threshold: Percentage) -> bool {
        self.0 >= threshold.0
    }
}

impl TryFrom<u8> for Percentage {
    type Error = PercentageError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Percentage> for u8 {
    fn from(value: Percentage) -> Self {
        value.0
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PercentageError(pub u8);

impl fmt::Display for PercentageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "percentage must be between 0 and 100, got {}", self.0)
    }
}

impl std::error::Error for PercentageError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calculate_rounds_and_saturates() {
        assert_eq!(Percentage::calculate(57.5, 200.0).value(), 29);
        assert_eq!(Percentage::calculate(300.0, 200.0), Percentage::FULL);
        assert_eq!(Percentage::calculate(0.0, 200.0), Percentage::ZERO);
        assert_eq!(Percentage::calculate(10.0, 0.0), Percentage::ZERO);
        assert_eq!(Percentage::calculate(-5.0, 10.0), Percentage::ZERO);
        assert_eq!(Percentage::calculate(1_000.0, f64::MAX), Percentage::ZERO);
    }

    #[test]
    fn rejects_values_above_hundred() {
        assert!(Percentage::new(100).is_ok());
        assert_eq!(Percentage::new(101), Err(PercentageError(101)));
        assert!(serde_json::from_str::<Percentage>("150").is_err());
        assert_eq!(serde_json::from_str::<Percentage>("42").unwrap().value(), 42);
    }

    #[test]
    fn thresholds_are_inclusive() {
        let ninety = Percentage::new(90).unwrap();
        assert!(ninety.reaches(Percentage::NEAR));
        assert!(ninety.reaches(Percentage::HALF));
        assert!(!Percentage::new(49).unwrap().reaches(Percentage::HALF));
        assert_eq!(ninety.to_string(), "90%");
    }
}
