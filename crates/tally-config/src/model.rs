use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tally_domain::BudgetPeriod;

use crate::ConfigError;

/// Stores user preferences for where ledgers live and how the model behaves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "Config::default_ledger_name")]
    pub ledger_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Optional custom root for ledgers and backups. Defaults to the platform data dir.
    pub data_dir: Option<PathBuf>,

    /// Maximum number of changes that can be rolled back. `None` keeps them all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_limit: Option<usize>,

    #[serde(default = "Config::default_backup_retention")]
    pub backup_retention: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,

    #[serde(default = "Config::default_budget_period_value")]
    pub default_budget_period: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ledger_name: Self::default_ledger_name(),
            data_dir: None,
            history_limit: None,
            backup_retention: Self::default_backup_retention(),
            log_filter: None,
            default_budget_period: Self::default_budget_period_value(),
        }
    }
}

impl Config {
    pub fn default_ledger_name() -> String {
        "personal".into()
    }

    pub fn default_backup_retention() -> usize {
        5
    }

    pub fn default_budget_period_value() -> String {
        "month".into()
    }

    /// Parses `default_budget_period` as a period keyword.
    pub fn budget_period(&self) -> Result<BudgetPeriod, ConfigError> {
        self.default_budget_period
            .parse()
            .map_err(|err: tally_domain::ParsePeriodError| ConfigError::Invalid {
                key: "default_budget_period",
                reason: err.to_string(),
            })
    }

    /// Rejects settings the ledger could not open with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ledger_name.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "ledger_name",
                reason: "must not be blank".into(),
            });
        }
        if self.backup_retention == 0 {
            return Err(ConfigError::Invalid {
                key: "backup_retention",
                reason: "must keep at least one backup".into(),
            });
        }
        if self.history_limit == Some(0) {
            return Err(ConfigError::Invalid {
                key: "history_limit",
                reason: "use null for unlimited history".into(),
            });
        }
        self.budget_period().map(|_| ())
    }

    pub fn resolve_data_dir(&self) -> PathBuf {
        if let Some(path) = &self.data_dir {
            return path.clone();
        }

        let base = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        base.join("tally")
    }
}
