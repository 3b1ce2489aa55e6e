//! tally-core
//!
//! Budget registry, reversible ledger history, and the `Model` orchestrator.
//! Depends on tally-domain. No terminal I/O and no direct file access; storage
//! backends plug in through [`storage::LedgerStorage`].

pub mod error;
pub mod history;
pub mod ledger;
pub mod model;
pub mod registry;
pub mod storage;
pub mod time;

pub use error::CoreError;
pub use history::*;
pub use ledger::*;
pub use model::*;
pub use registry::*;
pub use storage::*;
pub use time::*;
