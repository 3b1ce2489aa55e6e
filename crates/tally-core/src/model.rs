//! The orchestrator that front-ends every ledger operation.

use tracing::info;
use uuid::Uuid;

use tally_domain::{Budget, Event, Expense, NamedEntity, Timestamp};

use crate::{
    history::{ModelChange, ModelHistory},
    ledger::{BudgetEdit, Ledger},
    time::Clock,
    CoreError,
};

/// Owns the ledger and its history.
///
/// Each mutating call runs against a working copy of the ledger. Only a
/// successful call replaces the live ledger and commits exactly one change,
/// so a failure leaves both untouched.
pub struct Model {
    ledger: Ledger,
    history: ModelHistory,
    clock: Box<dyn Clock>,
}

impl Model {
    pub fn new(ledger: Ledger, clock: Box<dyn Clock>) -> Self {
        Self {
            ledger,
            history: ModelHistory::new(),
            clock,
        }
    }

    /// Caps how many changes can be rolled back.
    pub fn with_history_limit(mut self, limit: Option<usize>) -> Self {
        self.history = ModelHistory::with_limit(limit);
        self
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn history(&self) -> &ModelHistory {
        &self.history
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    pub fn primary_budget(&self) -> &Budget {
        self.ledger.primary_budget()
    }

    pub fn budget(&self, name: &str) -> Option<&Budget> {
        self.ledger.budget(name)
    }

    pub fn expenses(&self) -> &[Expense] {
        self.ledger.expenses()
    }

    pub fn events(&self) -> &[Event] {
        self.ledger.events()
    }

    /// Swaps in a freshly loaded ledger and forgets all history.
    pub fn reset(&mut self, ledger: Ledger) {
        self.ledger = ledger;
        self.history.clear();
    }

    pub fn add_expense(&mut self, expense: Expense) -> Result<Expense, CoreError> {
        self.apply(
            |ledger| ledger.add_expense(expense),
            |filed| format!("Add expense {} ({:.2})", filed.description, filed.price),
        )
    }

    pub fn delete_expense(&mut self, id: Uuid) -> Result<Expense, CoreError> {
        self.apply(
            |ledger| ledger.remove_expense(id),
            |removed| format!("Delete expense {}", removed.description),
        )
    }

    pub fn edit_expense(&mut self, id: Uuid, edited: Expense) -> Result<Expense, CoreError> {
        self.apply(
            |ledger| ledger.replace_expense(id, edited),
            |updated| format!("Edit expense {}", updated.description),
        )
    }

    /// Adds `budget` as the new primary, its window normalized to today.
    pub fn add_budget(&mut self, budget: Budget) -> Result<Budget, CoreError> {
        let today = self.clock.today();
        self.apply(
            |ledger| ledger.add_budget(budget, &today),
            |added| format!("Add budget {}", added.name()),
        )
    }

    pub fn delete_budget(&mut self, name: &str) -> Result<Budget, CoreError> {
        self.apply(
            |ledger| ledger.remove_budget(name),
            |removed| format!("Delete budget {}", removed.name()),
        )
    }

    pub fn edit_budget(&mut self, name: &str, edit: BudgetEdit) -> Result<Budget, CoreError> {
        let today = self.clock.today();
        self.apply(
            |ledger| ledger.edit_budget(name, edit, &today),
            |_| format!("Edit budget {name}"),
        )
    }

    /// Makes `name` the primary budget.
    pub fn switch_budget(&mut self, name: &str) -> Result<(), CoreError> {
        self.apply(
            |ledger| ledger.set_primary_budget(name),
            |_| format!("Switch to budget {name}"),
        )
    }

    /// Shows the primary budget's period containing `date`. Dates after the
    /// current period are rejected.
    pub fn switch_window(&mut self, date: Timestamp) -> Result<(), CoreError> {
        let today = self.clock.today();
        let primary = self.primary_budget().name().to_string();
        self.apply(
            |ledger| ledger.switch_window(&date, &today),
            |_| format!("Switch period of {primary} to {}", date.date()),
        )
    }

    pub fn clear_budgets(&mut self) -> Result<Vec<Budget>, CoreError> {
        self.apply(
            |ledger| ledger.clear_budgets(),
            |removed| format!("Clear {} budget(s)", removed.len()),
        )
    }

    pub fn add_event(&mut self, event: Event) -> Result<Event, CoreError> {
        self.apply(
            |ledger| ledger.add_event(event),
            |added| format!("Add event {} ({:.2})", added.description, added.price),
        )
    }

    pub fn delete_event(&mut self, id: Uuid) -> Result<Event, CoreError> {
        self.apply(
            |ledger| ledger.remove_event(id),
            |removed| format!("Delete event {}", removed.description),
        )
    }

    pub fn edit_event(&mut self, id: Uuid, edited: Event) -> Result<Event, CoreError> {
        self.apply(
            |ledger| ledger.replace_event(id, edited),
            |updated| format!("Edit event {}", updated.description),
        )
    }

    /// Converts every event due by now into an expense. Commits nothing when
    /// no event is due.
    pub fn transpire_events(&mut self) -> Result<Vec<Expense>, CoreError> {
        let now = self.clock.now();
        if !self.ledger.events().iter().any(|event| event.is_due(&now)) {
            return Ok(Vec::new());
        }
        self.apply(
            |ledger| ledger.transpire_events(&now),
            |expenses| format!("Transpire {} event(s)", expenses.len()),
        )
    }

    /// Undoes the most recent committed change and returns its label.
    pub fn rollback(&mut self) -> Result<String, CoreError> {
        let label = self.history.rollback(&mut self.ledger)?;
        info!(change = %label, "rolled back");
        Ok(label)
    }

    /// Redoes the most recently rolled-back change and returns its label.
    pub fn migrate(&mut self) -> Result<String, CoreError> {
        let label = self.history.migrate(&mut self.ledger)?;
        info!(change = %label, "migrated");
        Ok(label)
    }

    pub fn can_rollback(&self) -> bool {
        self.history.can_rollback()
    }

    pub fn can_migrate(&self) -> bool {
        self.history.can_migrate()
    }

    fn apply<T, Op, Label>(&mut self, op: Op, label: Label) -> Result<T, CoreError>
    where
        Op: FnOnce(&mut Ledger) -> Result<T, CoreError>,
        Label: FnOnce(&T) -> String,
    {
        let mut working = self.ledger.clone();
        let outcome = op(&mut working)?;
        let label = label(&outcome);
        let change = ModelChange::between(label.clone(), &self.ledger, &working);
        self.ledger = working;
        self.history.commit(change);
        info!(change = %label, "committed");
        Ok(outcome)
    }
}
