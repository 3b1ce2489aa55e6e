#![doc(test(attr(deny(warnings))))]

//! Tally tracks expenses against recurring budgets and keeps every change
//! reversible.
//!
//! The value types live in `tally-domain`, the registry, history and model in
//! `tally-core`. This crate wires them to configuration and JSON storage
//! through [`core::ledger_manager::LedgerManager`].

pub mod core;
pub mod errors;
pub mod utils;

pub use errors::LedgerError;
pub use tally_config::{Config, ConfigManager};
pub use tally_core::{BudgetEdit, Clock, CoreError, FixedClock, Model, SystemClock};
pub use tally_domain::{Budget, BudgetPeriod, Event, Expense, Timestamp};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and logs the build being run.
pub fn init() {
    init_with_filter(None);
}

/// Like [`init`], with an extra filter directive such as `tally_core=debug`.
pub fn init_with_filter(directive: Option<&str>) {
    INIT_TRACING.call_once(|| {
        utils::init_tracing(directive);
        let build = utils::build_info::current();
        tracing::info!(
            version = build.version,
            git = build.git_hash,
            status = build.git_status,
            profile = build.profile,
            "Tally tracing initialized."
        );
    });
}
