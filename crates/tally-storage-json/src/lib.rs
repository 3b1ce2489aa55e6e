//! tally-storage-json
//!
//! Filesystem JSON persistence for ledger snapshots, with rolling backups of
//! the previous file on every overwrite.

use std::{
    cmp::Reverse,
    fs::{self, OpenOptions},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use chrono::{Local, NaiveDateTime};
use tracing::debug;

use tally_core::{
    storage::{ensure_schema_support, LedgerBackupInfo, LedgerSnapshot, LedgerStorage},
    CoreError,
};

const LEDGER_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S%3f";
const STAGING_EXTENSION: &str = "json.tmp";
const DEFAULT_RETENTION: usize = 5;

/// Where ledgers and their backups live on disk.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    pub ledger_root: PathBuf,
    pub backup_root: PathBuf,
}

impl StoragePaths {
    /// `ledgers/` and `backups/` under `base`.
    pub fn under(base: &Path) -> Self {
        Self {
            ledger_root: base.join("ledgers"),
            backup_root: base.join("backups"),
        }
    }
}

/// Filesystem-backed JSON persistence for ledgers and their backups.
#[derive(Debug, Clone)]
pub struct JsonLedgerStorage {
    paths: StoragePaths,
    retention: usize,
}

impl JsonLedgerStorage {
    pub fn new(paths: StoragePaths) -> Result<Self, CoreError> {
        Self::with_retention(paths, DEFAULT_RETENTION)
    }

    /// Keeps at most `retention` backups per ledger (at least one).
    pub fn with_retention(paths: StoragePaths, retention: usize) -> Result<Self, CoreError> {
        fs::create_dir_all(&paths.ledger_root)?;
        fs::create_dir_all(&paths.backup_root)?;
        Ok(Self {
            paths,
            retention: retention.max(1),
        })
    }

    pub fn paths(&self) -> &StoragePaths {
        &self.paths
    }

    pub fn ledger_path(&self, name: &str) -> PathBuf {
        self.paths
            .ledger_root
            .join(format!("{}.{}", canonical_name(name), LEDGER_EXTENSION))
    }

    /// Copies `backup` over its ledger file and returns the restored snapshot.
    pub fn restore_backup(&self, backup: &LedgerBackupInfo) -> Result<LedgerSnapshot, CoreError> {
        if !backup.path.exists() {
            return Err(CoreError::Storage(format!(
                "backup `{}` not found",
                backup.id
            )));
        }
        let snapshot = load_snapshot_from_path(&backup.path)?;
        let target = self.ledger_path(&backup.ledger);
        fs::copy(&backup.path, &target)?;
        Ok(snapshot)
    }

    fn backup_dir(&self, name: &str) -> PathBuf {
        self.paths.backup_root.join(canonical_name(name))
    }

    fn backup_existing_file(&self, name: &str, path: &Path) -> Result<(), CoreError> {
        if !path.exists() {
            return Ok(());
        }
        let dir = self.backup_dir(name);
        fs::create_dir_all(&dir)?;
        let timestamp = Local::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let file_name = format!(
            "{}_{}.{}",
            canonical_name(name),
            timestamp,
            LEDGER_EXTENSION
        );
        fs::copy(path, dir.join(&file_name))?;
        debug!(ledger = name, backup = %file_name, "previous ledger backed up");
        self.prune_backups(name)
    }

    fn prune_backups(&self, name: &str) -> Result<(), CoreError> {
        let entries = self.list_backups(name)?;
        for entry in entries.into_iter().skip(self.retention) {
            fs::remove_file(&entry.path)?;
        }
        Ok(())
    }
}

impl LedgerStorage for JsonLedgerStorage {
    fn save_ledger(&self, name: &str, snapshot: &LedgerSnapshot) -> Result<(), CoreError> {
        let json = serde_json::to_string_pretty(snapshot)
            .map_err(|err| CoreError::Serde(err.to_string()))?;
        let path = self.ledger_path(name);
        self.backup_existing_file(name, &path)?;
        replace_file(&path, json.as_bytes())?;
        debug!(ledger = name, path = %path.display(), "ledger saved");
        Ok(())
    }

    fn load_ledger(&self, name: &str) -> Result<LedgerSnapshot, CoreError> {
        load_snapshot_from_path(&self.ledger_path(name))
    }

    fn list_ledgers(&self) -> Result<Vec<String>, CoreError> {
        let entries = match fs::read_dir(&self.paths.ledger_root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        let mut names = entries
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| has_ledger_extension(path) && path.is_file())
            .filter_map(|path| path.file_stem()?.to_str().map(str::to_owned))
            .collect::<Vec<_>>();
        names.sort();
        Ok(names)
    }

    fn delete_ledger(&self, name: &str) -> Result<(), CoreError> {
        match fs::remove_file(self.ledger_path(name)) {
            Err(err) if err.kind() != ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }

    /// Newest first.
    fn list_backups(&self, name: &str) -> Result<Vec<LedgerBackupInfo>, CoreError> {
        let dir = self.backup_dir(name);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let ledger_slug = canonical_name(name);
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if !has_ledger_extension(&path) {
                continue;
            }
            let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            let Some(created) = parse_backup_timestamp(file_name) else {
                continue;
            };
            entries.push(LedgerBackupInfo {
                ledger: ledger_slug.clone(),
                id: file_name.to_string(),
                created_at: created.format("%Y-%m-%d %H:%M:%S").to_string(),
                path: path.clone(),
            });
        }
        entries.sort_by_key(|info| Reverse(parse_backup_timestamp(&info.id)));
        Ok(entries)
    }
}

/// Loads and schema-checks a snapshot from `path`.
pub fn load_snapshot_from_path(path: &Path) -> Result<LedgerSnapshot, CoreError> {
    let data = fs::read_to_string(path)?;
    let snapshot: LedgerSnapshot =
        serde_json::from_str(&data).map_err(|err| CoreError::Serde(err.to_string()))?;
    ensure_schema_support(&snapshot)?;
    Ok(snapshot)
}

/// Lowercase slug used for file names; anything outside `[a-z0-9-]` becomes `_`.
fn canonical_name(name: &str) -> String {
    let slug = name
        .trim()
        .chars()
        .map(|c| {
            let lower = c.to_ascii_lowercase();
            if lower.is_ascii_lowercase() || lower.is_ascii_digit() || lower == '-' {
                lower
            } else {
                '_'
            }
        })
        .collect::<String>();
    if slug.chars().all(|c| c == '_') {
        String::from("ledger")
    } else {
        slug
    }
}

fn has_ledger_extension(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == LEDGER_EXTENSION)
}

/// Reads `<slug>_<YYYYMMDD>_<HHMMSSmmm>.json`.
fn parse_backup_timestamp(name: &str) -> Option<NaiveDateTime> {
    let trimmed = name.strip_suffix(&format!(".{}", LEDGER_EXTENSION))?;
    let mut segments = trimmed.rsplitn(3, '_');
    let time = segments.next()?;
    let date = segments.next()?;
    if !is_digits(date, 8) || !is_digits(time, 9) {
        return None;
    }
    NaiveDateTime::parse_from_str(&format!("{date}{time}"), "%Y%m%d%H%M%S%3f").ok()
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}

/// Writes `data` beside `path` and renames it into place.
fn replace_file(path: &Path, data: &[u8]) -> Result<(), CoreError> {
    let staging = path.with_extension(STAGING_EXTENSION);
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&staging)?;
    file.write_all(data)?;
    file.sync_all()?;
    drop(file);
    fs::rename(&staging, path)?;
    Ok(())
}
