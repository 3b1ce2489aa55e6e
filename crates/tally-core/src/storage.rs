use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use tally_domain::{Budget, BudgetWindow, Event, Expense, NamedEntity};

use crate::CoreError;

/// Latest on-disk layout this build reads and writes.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// A budget as persisted: its expenses live in [`LedgerSnapshot::expenses`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetRecord {
    pub name: String,
    pub limit: f64,
    pub window: BudgetWindow,
    #[serde(default)]
    pub is_primary: bool,
}

impl BudgetRecord {
    pub fn into_budget(self) -> Budget {
        Budget::from_parts(self.name, self.limit, self.window, self.is_primary)
    }
}

impl From<&Budget> for BudgetRecord {
    fn from(budget: &Budget) -> Self {
        Self {
            name: budget.name().to_string(),
            limit: budget.limit(),
            window: *budget.window(),
            is_primary: budget.is_primary(),
        }
    }
}

/// Serializable form of a whole ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub schema_version: u32,
    #[serde(default)]
    pub budgets: Vec<BudgetRecord>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
    #[serde(default)]
    pub events: Vec<Event>,
}

/// Describes a persisted backup artifact for a ledger.
#[derive(Debug, Clone)]
pub struct LedgerBackupInfo {
    pub ledger: String,
    pub id: String,
    pub created_at: String,
    pub path: PathBuf,
}

/// Abstraction over persistence backends capable of storing ledgers and backups.
pub trait LedgerStorage: Send + Sync {
    fn save_ledger(&self, name: &str, snapshot: &LedgerSnapshot) -> Result<(), CoreError>;
    fn load_ledger(&self, name: &str) -> Result<LedgerSnapshot, CoreError>;
    fn list_ledgers(&self) -> Result<Vec<String>, CoreError>;
    fn delete_ledger(&self, name: &str) -> Result<(), CoreError>;
    fn list_backups(&self, name: &str) -> Result<Vec<LedgerBackupInfo>, CoreError>;
}

/// Rejects snapshots written by a newer build.
pub fn ensure_schema_support(snapshot: &LedgerSnapshot) -> Result<(), CoreError> {
    if snapshot.schema_version > CURRENT_SCHEMA_VERSION {
        return Err(CoreError::UnsupportedSchema {
            found: snapshot.schema_version,
            supported: CURRENT_SCHEMA_VERSION,
        });
    }
    Ok(())
}
