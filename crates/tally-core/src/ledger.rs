//! The in-memory ledger: expenses, budgets and scheduled events.

use tracing::warn;
use uuid::Uuid;

use tally_domain::{
    Budget, BudgetPeriod, BudgetWindow, Event, Expense, NamedEntity, Timestamp,
    DEFAULT_BUDGET_NAME,
};

use crate::{
    registry::BudgetRegistry,
    storage::{ensure_schema_support, BudgetRecord, LedgerSnapshot, CURRENT_SCHEMA_VERSION},
    CoreError,
};

/// Every piece of user state that history can roll back.
///
/// Expenses are kept twice: in filing order here, and inside the budget they
/// belong to. Each operation keeps the two views in step.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Ledger {
    pub(crate) expenses: Vec<Expense>,
    pub(crate) budgets: BudgetRegistry,
    pub(crate) events: Vec<Event>,
}

/// Fields to change on an existing budget; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BudgetEdit {
    pub name: Option<String>,
    pub limit: Option<f64>,
    pub period: Option<BudgetPeriod>,
    pub start: Option<Timestamp>,
}

impl BudgetEdit {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.limit.is_none() && self.period.is_none() && self.start.is_none()
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn budgets(&self) -> &BudgetRegistry {
        &self.budgets
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn expense(&self, id: Uuid) -> Option<&Expense> {
        self.expenses.iter().find(|expense| expense.id == id)
    }

    pub fn event(&self, id: Uuid) -> Option<&Event> {
        self.events.iter().find(|event| event.id == id)
    }

    pub fn budget(&self, name: &str) -> Option<&Budget> {
        self.budgets.get(name)
    }

    pub fn primary_budget(&self) -> &Budget {
        self.budgets.primary()
    }

    /// Files `expense` under its named budget, or the primary one when unnamed.
    pub fn add_expense(&mut self, expense: Expense) -> Result<Expense, CoreError> {
        if self.expense(expense.id).is_some() {
            return Err(CoreError::DuplicateExpense(expense.id));
        }
        validate_amount(expense.price)?;
        let budget = self.resolve_budget(expense.budget_name())?;
        let filed = expense.with_budget(budget.clone());
        self.budgets
            .update(&budget, |current| current.with_expense(filed.clone()))?;
        self.expenses.push(filed.clone());
        Ok(filed)
    }

    pub fn remove_expense(&mut self, id: Uuid) -> Result<Expense, CoreError> {
        let index = self
            .expenses
            .iter()
            .position(|expense| expense.id == id)
            .ok_or(CoreError::ExpenseNotFound(id))?;
        let removed = self.expenses.remove(index);
        if let Some(budget) = removed.budget_name() {
            if self.budgets.contains(budget) {
                self.budgets
                    .update(budget, |current| current.without_expense(id))?;
            }
        }
        Ok(removed)
    }

    /// Replaces the expense `id` with `edited`, keeping the identifier. When
    /// `edited` names no budget the expense stays where it was.
    pub fn replace_expense(&mut self, id: Uuid, edited: Expense) -> Result<Expense, CoreError> {
        let index = self
            .expenses
            .iter()
            .position(|expense| expense.id == id)
            .ok_or(CoreError::ExpenseNotFound(id))?;
        validate_amount(edited.price)?;
        let previous = self.expenses[index].clone();
        let target = self.resolve_budget(edited.budget_name().or(previous.budget_name()))?;
        let updated = Expense { id, ..edited }.with_budget(target.clone());

        if let Some(source) = previous.budget_name().filter(|source| *source != target) {
            if self.budgets.contains(source) {
                self.budgets
                    .update(source, |current| current.without_expense(id))?;
            }
        }
        self.budgets
            .update(&target, |current| current.with_expense(updated.clone()))?;
        self.expenses[index] = updated.clone();
        Ok(updated)
    }

    /// Adds `budget` with its window normalized to `today` and makes it primary.
    pub fn add_budget(&mut self, budget: Budget, today: &Timestamp) -> Result<Budget, CoreError> {
        validate_amount(budget.limit())?;
        let prepared = budget
            .without_expenses()
            .normalized(today)
            .with_primary(true);
        self.budgets.add(prepared.clone())?;
        Ok(prepared)
    }

    /// Deletes the budget called `name`; its expenses and events move to the
    /// default budget.
    pub fn remove_budget(&mut self, name: &str) -> Result<Budget, CoreError> {
        let removed = self.budgets.remove(name)?;
        self.adopt_orphans(&[removed.name().to_string()])?;
        Ok(removed)
    }

    /// Drops every budget except the default and adopts their expenses.
    pub fn clear_budgets(&mut self) -> Result<Vec<Budget>, CoreError> {
        let removed = self.budgets.clear();
        let names: Vec<String> = removed.iter().map(|b| b.name().to_string()).collect();
        self.adopt_orphans(&names)?;
        Ok(removed)
    }

    /// Applies `edit` to the budget called `name`. A new start or period
    /// rebuilds the window and normalizes it to `today`; a rename re-points
    /// every expense and event filed under the old name.
    pub fn edit_budget(
        &mut self,
        name: &str,
        edit: BudgetEdit,
        today: &Timestamp,
    ) -> Result<Budget, CoreError> {
        if edit.is_empty() {
            return Err(CoreError::Validation("nothing to edit".into()));
        }
        let current = self
            .budgets
            .get(name)
            .cloned()
            .ok_or_else(|| CoreError::BudgetNotFound(name.to_string()))?;

        let mut edited = current.clone();
        if let Some(limit) = edit.limit {
            validate_amount(limit)?;
            edited = edited.with_limit(limit);
        }
        if edit.period.is_some() || edit.start.is_some() {
            let period = edit.period.unwrap_or(current.period());
            let window = match edit.start {
                Some(start) => BudgetWindow::new(start, period),
                None => current.window().with_period(period),
            };
            edited = edited.with_window(window.normalize(today));
        }
        let new_name = edit.name.filter(|new_name| new_name != name);
        if let Some(new_name) = &new_name {
            edited = edited.renamed(new_name.clone());
        }

        self.budgets.replace(name, edited)?;
        if let Some(new_name) = &new_name {
            self.repoint(name, new_name);
        }
        let final_name = new_name.as_deref().unwrap_or(name);
        self.budgets
            .get(final_name)
            .cloned()
            .ok_or_else(|| CoreError::BudgetNotFound(final_name.to_string()))
    }

    pub fn set_primary_budget(&mut self, name: &str) -> Result<(), CoreError> {
        self.budgets.set_primary(name)
    }

    /// Moves the primary budget's window to the period containing `date`.
    pub fn switch_window(&mut self, date: &Timestamp, today: &Timestamp) -> Result<(), CoreError> {
        self.budgets.switch_window(date, today)
    }

    pub fn add_event(&mut self, event: Event) -> Result<Event, CoreError> {
        if self.event(event.id).is_some() {
            return Err(CoreError::DuplicateEvent(event.id));
        }
        validate_amount(event.price)?;
        if let Some(budget) = event.budget_name() {
            if !self.budgets.contains(budget) {
                return Err(CoreError::BudgetNotFound(budget.to_string()));
            }
        }
        self.events.push(event.clone());
        Ok(event)
    }

    pub fn remove_event(&mut self, id: Uuid) -> Result<Event, CoreError> {
        let index = self
            .events
            .iter()
            .position(|event| event.id == id)
            .ok_or(CoreError::EventNotFound(id))?;
        Ok(self.events.remove(index))
    }

    pub fn replace_event(&mut self, id: Uuid, edited: Event) -> Result<Event, CoreError> {
        let index = self
            .events
            .iter()
            .position(|event| event.id == id)
            .ok_or(CoreError::EventNotFound(id))?;
        validate_amount(edited.price)?;
        let previous = &self.events[index];
        let updated = Event {
            id,
            budget: edited.budget.or_else(|| previous.budget.clone()),
            ..edited
        };
        if let Some(budget) = updated.budget_name() {
            if !self.budgets.contains(budget) {
                return Err(CoreError::BudgetNotFound(budget.to_string()));
            }
        }
        self.events[index] = updated.clone();
        Ok(updated)
    }

    /// Turns every event due by `now` into an expense and drops it from the
    /// schedule. Returns the new expenses in schedule order.
    pub fn transpire_events(&mut self, now: &Timestamp) -> Result<Vec<Expense>, CoreError> {
        let (due, pending): (Vec<Event>, Vec<Event>) =
            self.events.iter().cloned().partition(|event| event.is_due(now));
        let primary = self.budgets.primary().name().to_string();
        let mut transpired = Vec::with_capacity(due.len());
        for event in &due {
            let mut expense = event.to_expense(&primary);
            if matches!(expense.budget_name(), Some(budget) if !self.budgets.contains(budget)) {
                expense = expense.with_budget(primary.clone());
            }
            transpired.push(self.add_expense(expense)?);
        }
        self.events = pending;
        Ok(transpired)
    }

    /// Captures the persistable form of this ledger.
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            schema_version: CURRENT_SCHEMA_VERSION,
            budgets: self.budgets.iter().map(BudgetRecord::from).collect(),
            expenses: self.expenses.clone(),
            events: self.events.clone(),
        }
    }

    /// Rebuilds a ledger from `snapshot` exactly as stored: windows are not
    /// normalized and no date guard applies. Expenses or events that point at
    /// a missing budget are filed under the default budget.
    pub fn restore(snapshot: LedgerSnapshot) -> Result<Self, CoreError> {
        ensure_schema_support(&snapshot)?;
        let mut ledger = Ledger::new();
        let mut primary = None;
        for record in snapshot.budgets {
            if record.is_primary {
                primary = Some(record.name.clone());
            }
            ledger.budgets.restore(record.into_budget())?;
        }
        ledger
            .budgets
            .set_primary(primary.as_deref().unwrap_or(DEFAULT_BUDGET_NAME))?;
        for expense in snapshot.expenses {
            let expense = match ledger.rehome(expense.budget_name(), expense.id, "expense") {
                Some(budget) => expense.with_budget(budget),
                None => expense,
            };
            ledger.add_expense(expense)?;
        }
        for event in snapshot.events {
            let event = match ledger.rehome(event.budget_name(), event.id, "event") {
                Some(budget) => event.with_budget(budget),
                None => event,
            };
            ledger.add_event(event)?;
        }
        Ok(ledger)
    }

    fn rehome(&self, budget: Option<&str>, id: Uuid, kind: &str) -> Option<&'static str> {
        let budget = budget?;
        if self.budgets.contains(budget) {
            return None;
        }
        warn!(%id, %budget, kind, "entry references a missing budget; filing under default");
        Some(DEFAULT_BUDGET_NAME)
    }

    fn resolve_budget(&self, requested: Option<&str>) -> Result<String, CoreError> {
        match requested {
            Some(name) if self.budgets.contains(name) => Ok(name.to_string()),
            Some(name) => Err(CoreError::BudgetNotFound(name.to_string())),
            None => Ok(self.budgets.primary().name().to_string()),
        }
    }

    fn adopt_orphans(&mut self, names: &[String]) -> Result<(), CoreError> {
        let orphaned = |budget: Option<&str>| matches!(budget, Some(b) if names.iter().any(|n| n == b));
        let mut adopted = Vec::new();
        for expense in self.expenses.iter_mut() {
            if orphaned(expense.budget_name()) {
                *expense = expense.clone().with_budget(DEFAULT_BUDGET_NAME);
                adopted.push(expense.clone());
            }
        }
        for event in self.events.iter_mut() {
            if orphaned(event.budget_name()) {
                *event = event.clone().with_budget(DEFAULT_BUDGET_NAME);
            }
        }
        if !adopted.is_empty() {
            self.budgets.update(DEFAULT_BUDGET_NAME, |default| {
                adopted
                    .into_iter()
                    .fold(default.clone(), |budget, expense| budget.with_expense(expense))
            })?;
        }
        Ok(())
    }

    fn repoint(&mut self, from: &str, to: &str) {
        for expense in self.expenses.iter_mut().filter(|e| e.belongs_to(from)) {
            *expense = expense.clone().with_budget(to);
        }
        for event in self.events.iter_mut() {
            if event.budget_name() == Some(from) {
                *event = event.clone().with_budget(to);
            }
        }
    }
}

fn validate_amount(amount: f64) -> Result<(), CoreError> {
    if amount.is_finite() && amount > 0.0 {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "amount must be a positive number, got {amount}"
        )))
    }
}
