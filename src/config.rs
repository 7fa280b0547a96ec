/*
 * SPDX-FileCopyrightText: 2026 Wavelens GmbH <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::{fmt, fs, io};
use strum::IntoEnumIterator;
use strum_macros::EnumIter;
use thiserror::Error;

#[derive(
    Clone, Copy, Debug, EnumIter, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ConfigKey {
    Server,
    ApiKey,
    AuthToken,
    DatabaseUrl,
    UserId,
    SelectedProject,
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", format!("{:?}", self).to_lowercase())
    }
}

impl std::str::FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigKey::iter()
            .find(|key| key.to_string() == s.to_lowercase())
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not find configuration directory")]
    NoConfigDir,
    #[error("Failed to access configuration file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to parse configuration file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Invalid key: {0}. Valid keys are: {keys}", keys = valid_keys())]
    UnknownKey(String),
}

fn valid_keys() -> String {
    ConfigKey::iter()
        .map(|key| key.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Config = BTreeMap<ConfigKey, String>;

/// The TOML file holding server settings and the current session.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    path: PathBuf,
}

impl ConfigFile {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn default_location() -> Result<Self, ConfigError> {
        let mut path = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        path.push("taskdeck");
        path.push("config.toml");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> ConfigError {
        ConfigError::Io {
            path: self.path.clone(),
            source,
        }
    }

    pub fn load(&self) -> Result<Config, ConfigError> {
        if !self.path.exists() {
            return Ok(Config::new());
        }

        let contents = fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        Ok(toml::from_str(&contents)?)
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|e| self.io_error(e))?;
        }

        let contents = toml::to_string_pretty(config)?;
        fs::write(&self.path, contents).map_err(|e| self.io_error(e))?;
        tracing::debug!(path = %self.path.display(), "configuration saved");
        Ok(())
    }

    pub fn get(&self, key: ConfigKey) -> Result<Option<String>, ConfigError> {
        Ok(self.load()?.remove(&key))
    }

    /// Stores `value` under `key`. `None` or an empty value unsets the key.
    pub fn set(&self, key: ConfigKey, value: Option<String>) -> Result<(), ConfigError> {
        let mut config = self.load()?;

        match value.filter(|v| !v.is_empty()) {
            Some(value) => config.insert(key, value),
            None => config.remove(&key),
        };

        self.save(&config)
    }

    pub fn unset(&self, keys: &[ConfigKey]) -> Result<(), ConfigError> {
        let mut config = self.load()?;
        for key in keys {
            config.remove(key);
        }
        self.save(&config)
    }
}
