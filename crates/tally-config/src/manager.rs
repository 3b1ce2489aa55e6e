use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use crate::{Config, ConfigError};

const CONFIG_FILE: &str = "config.json";

/// Reads and writes the tracker's `config.json`.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    /// `config.json` directly under `base`, creating the directory if needed.
    pub fn with_base_dir(base: PathBuf) -> Result<Self, ConfigError> {
        fs::create_dir_all(&base)?;
        Ok(Self::new(base.join(CONFIG_FILE)))
    }

    pub fn from_default_location() -> Result<Self, ConfigError> {
        Self::with_base_dir(Config::default().resolve_data_dir())
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// The stored config, or defaults when no file exists yet. A stored file
    /// that fails validation is an error rather than silently replaced.
    pub fn load(&self) -> Result<Config, ConfigError> {
        if !self.config_path.is_file() {
            return Ok(Config::default());
        }
        let raw = fs::read_to_string(&self.config_path)?;
        let config: Config =
            serde_json::from_str(&raw).map_err(|err| ConfigError::Serde(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates `config` and replaces the stored file in one rename.
    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        config.validate()?;
        let json = serde_json::to_string_pretty(config)
            .map_err(|err| ConfigError::Serde(err.to_string()))?;

        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let staging = self.config_path.with_extension("json.tmp");
        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&staging)?;
            file.write_all(json.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&staging, &self.config_path)?;
        Ok(())
    }

    /// Loads, applies `edit`, saves, and returns the stored result.
    pub fn update<F>(&self, edit: F) -> Result<Config, ConfigError>
    where
        F: FnOnce(&mut Config),
    {
        let mut config = self.load()?;
        edit(&mut config);
        self.save(&config)?;
        Ok(config)
    }
}
