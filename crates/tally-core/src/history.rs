//! Two-stack undo/redo over ledger slices.

use std::collections::VecDeque;

use tally_domain::{Event, Expense};

use crate::{ledger::Ledger, registry::BudgetRegistry, CoreError};

/// Replacement values for the ledger slices a change touched.
///
/// `None` leaves that slice alone when applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerDelta {
    pub expenses: Option<Vec<Expense>>,
    pub budgets: Option<BudgetRegistry>,
    pub events: Option<Vec<Event>>,
}

impl LedgerDelta {
    pub fn is_empty(&self) -> bool {
        self.expenses.is_none() && self.budgets.is_none() && self.events.is_none()
    }

    pub fn apply(&self, ledger: &mut Ledger) {
        if let Some(expenses) = &self.expenses {
            ledger.expenses = expenses.clone();
        }
        if let Some(budgets) = &self.budgets {
            ledger.budgets = budgets.clone();
        }
        if let Some(events) = &self.events {
            ledger.events = events.clone();
        }
    }
}

/// A labelled, reversible ledger transition.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelChange {
    label: String,
    forward: LedgerDelta,
    backward: LedgerDelta,
}

impl ModelChange {
    /// Records the slices that differ between `before` and `after`.
    pub fn between(label: impl Into<String>, before: &Ledger, after: &Ledger) -> Self {
        let mut forward = LedgerDelta::default();
        let mut backward = LedgerDelta::default();
        if before.expenses != after.expenses {
            forward.expenses = Some(after.expenses.clone());
            backward.expenses = Some(before.expenses.clone());
        }
        if before.budgets != after.budgets {
            forward.budgets = Some(after.budgets.clone());
            backward.budgets = Some(before.budgets.clone());
        }
        if before.events != after.events {
            forward.events = Some(after.events.clone());
            backward.events = Some(before.events.clone());
        }
        Self {
            label: label.into(),
            forward,
            backward,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn forward(&self) -> &LedgerDelta {
        &self.forward
    }

    pub fn backward(&self) -> &LedgerDelta {
        &self.backward
    }

    /// True when the change left the ledger as it was.
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }
}

/// Committed changes available for rollback, and rolled-back ones available
/// for migration. An optional limit caps the rollback depth.
#[derive(Debug, Clone, Default)]
pub struct ModelHistory {
    past: VecDeque<ModelChange>,
    future: Vec<ModelChange>,
    limit: Option<usize>,
}

impl ModelHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Pushes `change` and discards everything that could have been migrated.
    pub fn commit(&mut self, change: ModelChange) {
        self.future.clear();
        self.past.push_back(change);
        if let Some(limit) = self.limit {
            while self.past.len() > limit {
                self.past.pop_front();
            }
        }
    }

    /// Reverts the most recent change on `ledger` and returns its label.
    pub fn rollback(&mut self, ledger: &mut Ledger) -> Result<String, CoreError> {
        let change = self.past.pop_back().ok_or(CoreError::NoPastChanges)?;
        change.backward.apply(ledger);
        let label = change.label.clone();
        self.future.push(change);
        Ok(label)
    }

    /// Re-applies the most recently rolled-back change and returns its label.
    pub fn migrate(&mut self, ledger: &mut Ledger) -> Result<String, CoreError> {
        let change = self.future.pop().ok_or(CoreError::NoFutureChanges)?;
        change.forward.apply(ledger);
        let label = change.label.clone();
        self.past.push_back(change);
        Ok(label)
    }

    pub fn can_rollback(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_migrate(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn next_rollback_label(&self) -> Option<&str> {
        self.past.back().map(ModelChange::label)
    }

    pub fn next_migrate_label(&self) -> Option<&str> {
        self.future.last().map(ModelChange::label)
    }

    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    pub fn future_len(&self) -> usize {
        self.future.len()
    }

    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }
}
