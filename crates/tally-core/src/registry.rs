//! The authoritative budget collection.

use tracing::debug;

use tally_domain::{Budget, Expense, NamedEntity, Timestamp, DEFAULT_BUDGET_NAME};

use crate::CoreError;

/// Holds every budget, keyed by case-sensitive name.
///
/// The default budget always occupies the first slot and exactly one budget is
/// primary between any two calls. Budgets are never edited in place: each
/// transition swaps in a fresh copy.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetRegistry {
    budgets: Vec<Budget>,
}

impl Default for BudgetRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl BudgetRegistry {
    pub fn new() -> Self {
        Self {
            budgets: vec![Budget::default_budget().with_primary(true)],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Budget> {
        self.budgets.iter()
    }

    pub fn len(&self) -> usize {
        self.budgets.len()
    }

    /// True when only the default budget exists.
    pub fn is_empty(&self) -> bool {
        self.budgets.len() == 1
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&Budget> {
        self.budgets.iter().find(|budget| budget.name() == name)
    }

    pub fn default_budget(&self) -> &Budget {
        &self.budgets[0]
    }

    pub fn primary(&self) -> &Budget {
        self.budgets
            .iter()
            .find(|budget| budget.is_primary())
            .unwrap_or(&self.budgets[0])
    }

    /// Adds `budget`. It becomes primary when it asks to be or when it is the
    /// first budget besides the default.
    pub fn add(&mut self, budget: Budget) -> Result<(), CoreError> {
        if self.contains(budget.name()) {
            return Err(CoreError::DuplicateBudget(budget.name().to_string()));
        }
        let elect = budget.is_primary() || self.is_empty();
        let name = budget.name().to_string();
        self.budgets.push(budget.with_primary(false));
        debug!(budget = %name, "budget added");
        if elect {
            self.set_primary(&name)?;
        }
        Ok(())
    }

    /// Reinstates a previously persisted budget without elections or window
    /// normalization. The default budget replaces the built-in one.
    pub fn restore(&mut self, budget: Budget) -> Result<(), CoreError> {
        let budget = budget.with_primary(false);
        if budget.is_default() {
            self.budgets[0] = budget;
        } else if self.contains(budget.name()) {
            return Err(CoreError::DuplicateBudget(budget.name().to_string()));
        } else {
            self.budgets.push(budget);
        }
        if !self.budgets.iter().any(Budget::is_primary) {
            self.budgets[0] = self.budgets[0].with_primary(true);
        }
        Ok(())
    }

    /// Moves the primary flag to `name`. A no-op when it already holds it.
    pub fn set_primary(&mut self, name: &str) -> Result<(), CoreError> {
        let target = self
            .position(name)
            .ok_or_else(|| CoreError::BudgetNotFound(name.to_string()))?;
        if self.budgets[target].is_primary() {
            return Ok(());
        }
        let promoted = self.budgets[target].with_primary(true);
        let demoted: Vec<(usize, Budget)> = self
            .budgets
            .iter()
            .enumerate()
            .filter(|(_, budget)| budget.is_primary())
            .map(|(index, budget)| (index, budget.with_primary(false)))
            .collect();
        for (index, budget) in demoted {
            self.budgets[index] = budget;
        }
        self.budgets[target] = promoted;
        debug!(budget = %name, "primary budget switched");
        Ok(())
    }

    /// Swaps the budget called `name` for `replacement`, keeping its primary
    /// flag. The default budget keeps its name.
    pub fn replace(&mut self, name: &str, replacement: Budget) -> Result<(), CoreError> {
        let index = self
            .position(name)
            .ok_or_else(|| CoreError::BudgetNotFound(name.to_string()))?;
        let current = &self.budgets[index];
        if replacement.name() != name {
            if current.is_default() {
                return Err(CoreError::Validation(
                    "the default budget cannot be renamed".into(),
                ));
            }
            if self.contains(replacement.name()) {
                return Err(CoreError::DuplicateBudget(replacement.name().to_string()));
            }
        }
        self.budgets[index] = replacement.with_primary(current.is_primary());
        Ok(())
    }

    /// Replaces the budget called `name` with the result of `edit`.
    pub fn update<F>(&mut self, name: &str, edit: F) -> Result<(), CoreError>
    where
        F: FnOnce(&Budget) -> Budget,
    {
        let current = self
            .get(name)
            .ok_or_else(|| CoreError::BudgetNotFound(name.to_string()))?;
        let replacement = edit(current);
        self.replace(name, replacement)
    }

    /// Removes and returns the budget called `name`. The default budget takes
    /// over as primary when the removed one held the flag.
    pub fn remove(&mut self, name: &str) -> Result<Budget, CoreError> {
        if name == DEFAULT_BUDGET_NAME {
            return Err(CoreError::CannotDeleteDefaultBudget);
        }
        let index = self
            .position(name)
            .ok_or_else(|| CoreError::BudgetNotFound(name.to_string()))?;
        let removed = self.budgets.remove(index);
        if removed.is_primary() {
            self.budgets[0] = self.budgets[0].with_primary(true);
        }
        debug!(budget = %name, "budget removed");
        Ok(removed)
    }

    /// Drops every budget except the default, which becomes primary.
    pub fn clear(&mut self) -> Vec<Budget> {
        let removed = self.budgets.split_off(1);
        self.budgets[0] = self.budgets[0].with_primary(true);
        debug!(count = removed.len(), "budgets cleared");
        removed
    }

    /// Normalizes the primary budget's window to `past_date`.
    ///
    /// Fails when `past_date` lies after the end of the primary window as it
    /// stands `today`.
    pub fn switch_window(
        &mut self,
        past_date: &Timestamp,
        today: &Timestamp,
    ) -> Result<(), CoreError> {
        let primary = self.primary();
        let limit = primary.window().normalize(today).end();
        if past_date.date_is_after(&limit) {
            return Err(CoreError::FutureWindow {
                requested: *past_date,
                limit,
            });
        }
        let name = primary.name().to_string();
        let switched = primary.normalized(past_date);
        debug!(budget = %name, window = %switched.window(), "window switched");
        self.replace(&name, switched)
    }

    /// Expenses of `name` that fall inside its current window.
    pub fn expenses_in_current_window(&self, name: &str) -> Result<Vec<&Expense>, CoreError> {
        let budget = self
            .get(name)
            .ok_or_else(|| CoreError::BudgetNotFound(name.to_string()))?;
        Ok(budget.current_period_expenses().collect())
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.budgets.iter().position(|budget| budget.name() == name)
    }
}
