//! Recorded spending entries.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{common::*, timestamp::Timestamp};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub description: String,
    pub price: f64,
    pub timestamp: Timestamp,
    /// Name of the owning budget. `None` until the ledger files it, at which
    /// point it falls back to the primary budget.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<String>,
}

impl Expense {
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

    pub fn belongs_to(&self, budget: &str) -> bool {
        self.budget_name() == Some(budget)
    }

    /// Two expenses describe the same purchase when every user-visible field
    /// matches, regardless of identifier.
    pub fn is_same_expense(&self, other: &Expense) -> bool {
        self.description == other.description
            && self.price == other.price
            && self.timestamp == other.timestamp
            && self.budget == other.budget
    }
}

impl Identifiable for Expense {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for Expense {
    fn name(&self) -> &str {
        &self.description
    }
}

impl Amounted for Expense {
    fn amount(&self) -> f64 {
        self.price
    }
}

impl fmt::Display for Expense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({:.2}) on {}",
            self.description,
            self.price,
            self.timestamp.date()
        )?;
        if let Some(budget) = &self.budget {
            write!(f, " [{budget}]")?;
        }
        Ok(())
    }
}
