use tally_config::ConfigError;
use tally_core::CoreError;
use thiserror::Error;

/// Error type surfaced by the top-level facade.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
