//! Named spending envelopes bound to a recurring window.
//!
//! A [`Budget`] is a value: every change goes through a `with_*` style
//! builder that returns a fresh copy, leaving the original untouched.

use std::fmt;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    common::*, expense::Expense, percentage::Percentage, period::BudgetPeriod,
    timestamp::Timestamp, window::BudgetWindow,
};

/// Reserved name of the budget that can never be deleted.
pub const DEFAULT_BUDGET_NAME: &str = "Default Budget";

#[derive(Debug, Clone, PartialEq)]
pub struct Budget {
    name: String,
    limit: f64,
    window: BudgetWindow,
    expenses: Vec<Expense>,
    is_primary: bool,
    proportion_used: Percentage,
}

impl Budget {
    pub fn new(
        name: impl Into<String>,
        limit: f64,
        start: Timestamp,
        period: BudgetPeriod,
    ) -> Self {
        Self::from_parts(name, limit, BudgetWindow::new(start, period), false)
    }

    /// The permanent fallback budget: unlimited and effectively unbounded.
    pub fn default_budget() -> Self {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or(NaiveDate::MIN);
        Self::new(
            DEFAULT_BUDGET_NAME,
            f64::MAX,
            Timestamp::from_date(epoch),
            BudgetPeriod::Unbounded,
        )
    }

    pub fn from_parts(
        name: impl Into<String>,
        limit: f64,
        window: BudgetWindow,
        is_primary: bool,
    ) -> Self {
        Self {
            name: name.into(),
            limit,
            window,
            expenses: Vec::new(),
            is_primary,
            proportion_used: Percentage::ZERO,
        }
    }

    pub fn limit(&self) -> f64 {
        self.limit
    }

    pub fn window(&self) -> &BudgetWindow {
        &self.window
    }

    pub fn period(&self) -> BudgetPeriod {
        self.window.period()
    }

    /// Every expense filed under this budget, in filing order.
    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn is_primary(&self) -> bool {
        self.is_primary
    }

    /// Usage as of the last change to this value.
    pub fn proportion_used(&self) -> Percentage {
        self.proportion_used
    }

    pub fn is_default(&self) -> bool {
        self.name == DEFAULT_BUDGET_NAME
    }

    /// Budgets are identified by name; other fields may differ.
    pub fn is_same_budget(&self, other: &Budget) -> bool {
        self.name == other.name
    }

    pub fn contains_expense(&self, id: Uuid) -> bool {
        self.expenses.iter().any(|expense| expense.id == id)
    }

    /// A copy whose window covers `anchor`.
    pub fn normalized(&self, anchor: &Timestamp) -> Self {
        self.with_window(self.window.normalize(anchor))
    }

    pub fn with_primary(&self, is_primary: bool) -> Self {
        Self {
            is_primary,
            ..self.clone()
        }
    }

    /// Files `expense` here, replacing any expense with the same id in place.
    pub fn with_expense(&self, expense: Expense) -> Self {
        let mut copy = self.clone();
        let expense = expense.with_budget(self.name.clone());
        match copy.expenses.iter().position(|e| e.id == expense.id) {
            Some(index) => copy.expenses[index] = expense,
            None => copy.expenses.push(expense),
        }
        copy.refreshed()
    }

    pub fn without_expense(&self, id: Uuid) -> Self {
        let mut copy = self.clone();
        copy.expenses.retain(|expense| expense.id != id);
        copy.refreshed()
    }

    pub fn without_expenses(&self) -> Self {
        Self {
            expenses: Vec::new(),
            ..self.clone()
        }
        .refreshed()
    }

    /// A copy under a new name; member expenses follow the rename.
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        let name = name.into();
        let expenses = self
            .expenses
            .iter()
            .cloned()
            .map(|expense| expense.with_budget(name.clone()))
            .collect();
        Self {
            name,
            expenses,
            ..self.clone()
        }
    }

    pub fn with_limit(&self, limit: f64) -> Self {
        Self {
            limit,
            ..self.clone()
        }
        .refreshed()
    }

    pub fn with_window(&self, window: BudgetWindow) -> Self {
        Self {
            window,
            ..self.clone()
        }
        .refreshed()
    }

    /// Expenses whose timestamp falls inside the current window.
    pub fn current_period_expenses(&self) -> impl Iterator<Item = &Expense> + '_ {
        self.expenses
            .iter()
            .filter(|expense| self.window.contains(&expense.timestamp))
    }

    /// Raw spend in the current window; may exceed the limit.
    pub fn spent(&self) -> f64 {
        self.current_period_expenses().map(Amounted::amount).sum()
    }

    pub fn usage(&self) -> Percentage {
        Percentage::calculate(self.spent(), self.limit)
    }

    pub fn is_near(&self) -> bool {
        self.usage().reaches(Percentage::NEAR)
    }

    pub fn is_half(&self) -> bool {
        self.usage().reaches(Percentage::HALF)
    }

    pub fn is_exceeded(&self) -> bool {
        self.spent() > self.limit
    }

    fn refreshed(mut self) -> Self {
        self.proportion_used = self.usage();
        self
    }
}

impl NamedEntity for Budget {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Amounted for Budget {
    fn amount(&self) -> f64 {
        self.limit
    }
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] ", self.name, self.window)?;
        if self.limit == f64::MAX {
            f.write_str("no limit")?;
        } else {
            write!(f, "{:.2} of {:.2} ({})", self.spent(), self.limit, self.usage())?;
        }
        if self.is_primary {
            f.write_str(" *primary*")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(y: i32, m: u32, d: u32) -> Timestamp {
        Timestamp::from_ymd(y, m, d).unwrap()
    }

    fn food() -> Budget {
        Budget::new("Food", 300.0, ts(2019, 10, 1), BudgetPeriod::Month)
    }

    #[test]
    fn usage_counts_only_current_window() {
        let budget = food()
            .with_expense(Expense::new("Groceries", 120.0, ts(2019, 10, 3)))
            .with_expense(Expense::new("Dinner", 45.0, ts(2019, 10, 31)))
            .with_expense(Expense::new("Old", 500.0, ts(2019, 9, 30)));
        assert_eq!(budget.spent(), 165.0);
        assert_eq!(budget.usage().value(), 55);
        assert_eq!(budget.proportion_used(), budget.usage());
        assert!(budget.is_half());
        assert!(!budget.is_near());
        assert!(!budget.is_exceeded());

        let september = budget.normalized(&ts(2019, 9, 15));
        assert_eq!(september.spent(), 500.0);
        assert_eq!(september.usage(), Percentage::FULL);
        assert!(september.is_near());
        assert!(september.is_exceeded());
    }

    #[test]
    fn exceeded_uses_raw_spend_not_rounded_usage() {
        let budget = food().with_expense(Expense::new("Feast", 300.01, ts(2019, 10, 2)));
        assert_eq!(budget.usage(), Percentage::FULL);
        assert!(budget.is_exceeded());
        let at_limit = food().with_expense(Expense::new("Feast", 300.0, ts(2019, 10, 2)));
        assert!(!at_limit.is_exceeded());
    }

    #[test]
    fn builders_leave_original_untouched() {
        let original = food();
        let expense = Expense::new("Snack", 3.0, ts(2019, 10, 4));
        let updated = original.with_expense(expense.clone()).with_primary(true);
        assert!(original.expenses().is_empty());
        assert!(!original.is_primary());
        assert_eq!(updated.expenses()[0].budget_name(), Some("Food"));
        assert!(updated.is_primary());
    }

    #[test]
    fn with_expense_replaces_by_id_in_place() {
        let first = Expense::new("Snack", 3.0, ts(2019, 10, 4));
        let second = Expense::new("Coffee", 2.0, ts(2019, 10, 5));
        let mut edited = first.clone();
        edited.price = 4.5;
        let budget = food()
            .with_expense(first)
            .with_expense(second)
            .with_expense(edited);
        let prices: Vec<f64> = budget.expenses().iter().map(|e| e.price).collect();
        assert_eq!(prices, vec![4.5, 2.0]);
    }

    #[test]
    fn rename_repoints_member_expenses() {
        let budget = food()
            .with_expense(Expense::new("Snack", 3.0, ts(2019, 10, 4)))
            .renamed("Groceries");
        assert_eq!(budget.name(), "Groceries");
        assert!(budget.expenses().iter().all(|e| e.belongs_to("Groceries")));
    }

    #[test]
    fn default_budget_never_fills_up() {
        let default = Budget::default_budget()
            .with_expense(Expense::new("Car", 25_000.0, ts(2019, 10, 4)));
        assert!(default.is_default());
        assert_eq!(default.period(), BudgetPeriod::Unbounded);
        assert_eq!(default.usage(), Percentage::ZERO);
        assert!(!default.is_exceeded());
        assert!(default.window().contains(&ts(2500, 1, 1)));
    }

    #[test]
    fn display_summarises_spend() {
        let budget = food()
            .with_expense(Expense::new("Groceries", 120.0, ts(2019, 10, 3)))
            .with_primary(true);
        insta::assert_snapshot!(
            budget.to_string(),
            @"Food [Monthly: 2019-10-01 to 2019-10-31] 120.00 of 300.00 (40%) *primary*"
        );
    }
}
