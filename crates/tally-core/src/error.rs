use thiserror::Error;
use uuid::Uuid;

use tally_domain::Timestamp;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Budget already exists: {0}")]
    DuplicateBudget(String),
    #[error("Budget not found: {0}")]
    BudgetNotFound(String),
    #[error("The default budget cannot be deleted")]
    CannotDeleteDefaultBudget,
    #[error("Cannot switch to a future period: {requested} is after {limit}")]
    FutureWindow {
        requested: Timestamp,
        limit: Timestamp,
    },
    #[error("No more commands to undo")]
    NoPastChanges,
    #[error("No more commands to redo")]
    NoFutureChanges,
    #[error("Expense already exists: {0}")]
    DuplicateExpense(Uuid),
    #[error("Expense not found: {0}")]
    ExpenseNotFound(Uuid),
    #[error("Event already exists: {0}")]
    DuplicateEvent(Uuid),
    #[error("Event not found: {0}")]
    EventNotFound(Uuid),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Serialization error: {0}")]
    Serde(String),
    #[error("Unsupported schema version {found} (latest supported {supported})")]
    UnsupportedSchema { found: u32, supported: u32 },
}
