use std::io::ErrorKind;

use tracing::{info, warn};

use tally_config::Config;
use tally_core::{
    storage::{LedgerBackupInfo, LedgerStorage},
    Clock, CoreError, Ledger, Model,
};
use tally_domain::{Budget, BudgetPeriod};
use tally_storage_json::{JsonLedgerStorage, StoragePaths};

use crate::errors::LedgerError;

/// Facade that binds a [`Model`] to a storage backend.
///
/// Every successful command is followed by a save. A failed save is logged
/// and does not undo the command.
pub struct LedgerManager {
    model: Model,
    storage: Box<dyn LedgerStorage>,
    name: String,
    default_period: BudgetPeriod,
}

impl LedgerManager {
    /// Loads `name` from `storage`, or starts an empty ledger when none is
    /// stored yet, then transpires any events that came due while closed.
    pub fn open(
        name: &str,
        storage: Box<dyn LedgerStorage>,
        clock: Box<dyn Clock>,
        history_limit: Option<usize>,
    ) -> Result<Self, LedgerError> {
        let ledger = match storage.load_ledger(name) {
            Ok(snapshot) => Ledger::restore(snapshot)?,
            Err(CoreError::Io(err)) if err.kind() == ErrorKind::NotFound => {
                info!(ledger = name, "starting a new ledger");
                Ledger::new()
            }
            Err(err) => return Err(err.into()),
        };
        let mut manager = Self {
            model: Model::new(ledger, clock).with_history_limit(history_limit),
            storage,
            name: name.to_string(),
            default_period: BudgetPeriod::Month,
        };
        let transpired = manager.model.transpire_events()?;
        if !transpired.is_empty() {
            info!(count = transpired.len(), "events transpired on open");
            manager.autosave();
        }
        Ok(manager)
    }

    /// Opens the configured ledger under the configured data directory,
    /// installing tracing with the configured log filter if nothing has yet.
    pub fn from_config(config: &Config, clock: Box<dyn Clock>) -> Result<Self, LedgerError> {
        config.validate()?;
        crate::init_with_filter(config.log_filter.as_deref());
        let paths = StoragePaths::under(&config.resolve_data_dir());
        let storage = JsonLedgerStorage::with_retention(paths, config.backup_retention)?;
        let mut manager = Self::open(
            &config.ledger_name,
            Box::new(storage),
            clock,
            config.history_limit,
        )?;
        manager.default_period = config.budget_period()?;
        Ok(manager)
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default_period(&self) -> BudgetPeriod {
        self.default_period
    }

    /// Runs one model command and persists the result when it succeeds.
    pub fn apply<T, F>(&mut self, command: F) -> Result<T, LedgerError>
    where
        F: FnOnce(&mut Model) -> Result<T, CoreError>,
    {
        let outcome = command(&mut self.model)?;
        self.autosave();
        Ok(outcome)
    }

    /// Adds a budget starting today, using the configured period unless one
    /// is given.
    pub fn add_budget(
        &mut self,
        name: &str,
        limit: f64,
        period: Option<BudgetPeriod>,
    ) -> Result<Budget, LedgerError> {
        let budget = Budget::new(
            name,
            limit,
            self.model.now(),
            period.unwrap_or(self.default_period),
        );
        self.apply(|model| model.add_budget(budget))
    }

    pub fn rollback(&mut self) -> Result<String, LedgerError> {
        self.apply(Model::rollback)
    }

    pub fn migrate(&mut self) -> Result<String, LedgerError> {
        self.apply(Model::migrate)
    }

    pub fn save(&self) -> Result<(), LedgerError> {
        self.storage
            .save_ledger(&self.name, &self.model.ledger().snapshot())?;
        Ok(())
    }

    fn autosave(&self) {
        if let Err(err) = self.save() {
            warn!(ledger = %self.name, error = %err, "autosave failed");
        }
    }

    /// Replaces the in-memory ledger with the stored one and clears history.
    pub fn reload(&mut self) -> Result<(), LedgerError> {
        let snapshot = self.storage.load_ledger(&self.name)?;
        self.model.reset(Ledger::restore(snapshot)?);
        Ok(())
    }

    pub fn list_backups(&self) -> Result<Vec<LedgerBackupInfo>, LedgerError> {
        Ok(self.storage.list_backups(&self.name)?)
    }
}
