//! Scheduled spending that becomes an expense once its date arrives.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{common::*, expense::Expense, timestamp::Timestamp};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub description: String,
    pub price: f64,
    pub timestamp: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<String>,
}

impl Event {
    pub fn new(description: impl Into<String>, price: f64, timestamp: Timestamp) -> Self {
        Self {
            id: Uuid::new_v4(),
            description: description.into(),
            price,
            timestamp,
            budget: None,
        }
    }

    pub fn with_budget(mut self, budget: impl Into<String>) -> Self {
        self.budget = Some(budget.into());
        self
    }

    pub fn budget_name(&self) -> Option<&str> {
        self.budget.as_deref()
    }

    /// True once `now` has reached the event's date.
    pub fn is_due(&self, now: &Timestamp) -> bool {
        !self.timestamp.is_after(now)
    }

    /// Converts into an expense with the same identifier, filed under the
    /// event's budget or `fallback_budget` when it has none.
    pub fn to_expense(&self, fallback_budget: &str) -> Expense {
        Expense {
            id: self.id,
            description: self.description.clone(),
            price: self.price,
            timestamp: self.timestamp,
            budget: Some(
                self.budget
                    .clone()
                    .unwrap_or_else(|| fallback_budget.to_string()),
            ),
        }
    }
}

impl Identifiable for Event {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for Event {
    fn name(&self) -> &str {
        &self.description
    }
}

impl Amounted for Event {
    fn amount(&self) -> f64 {
        self.price
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({:.2}) due {}",
            self.description, self.price, self.timestamp
        )
    }
}
