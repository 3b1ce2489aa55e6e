#![allow(dead_code)]

use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};

use once_cell::sync::Lazy;
use tally::{core::ledger_manager::LedgerManager, Config, ConfigManager, FixedClock, Timestamp};
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub fn ts(y: i32, m: u32, d: u32) -> Timestamp {
    Timestamp::from_ymd(y, m, d).expect("valid date")
}

/// A fresh data directory that outlives the calling test.
pub fn temp_base() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// Config pointing at `base`, with a short backup window.
pub fn config_for(base: &Path) -> Config {
    Config {
        ledger_name: "household".into(),
        data_dir: Some(base.to_path_buf()),
        backup_retention: 3,
        ..Config::default()
    }
}

/// Opens the configured ledger with the clock frozen at `today`.
pub fn open_at(config: &Config, today: Timestamp) -> LedgerManager {
    LedgerManager::from_config(config, Box::new(FixedClock(today))).expect("open ledger")
}

/// Creates isolated managers backed by unique directories for each test.
pub fn setup_test_env(today: Timestamp) -> (LedgerManager, ConfigManager) {
    let base = temp_base();
    let config_manager =
        ConfigManager::with_base_dir(base.clone()).expect("create config manager for temp dir");
    let config = config_for(&base);
    config_manager.save(&config).expect("save config");
    (open_at(&config, today), config_manager)
}
