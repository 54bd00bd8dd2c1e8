//! Configuration loading
//!
//! Sources, lowest precedence first:
//! 1. Built-in defaults
//! 2. `~/.config/agenda-import/config.toml` (or `--config <path>`)
//! 3. Environment variables (a `.env` file is loaded by `main`)
//! 4. Command-line flags, applied by the command handlers

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::import::DEFAULT_BATCH_SIZE;
use crate::store::{MemoryStore, RecordStore, RestStore, SqliteStore};

pub const ENV_OWNER: &str = "AGENDA_IMPORT_OWNER";
pub const ENV_STORE_URL: &str = "AGENDA_IMPORT_STORE_URL";
pub const ENV_API_KEY: &str = "AGENDA_IMPORT_API_KEY";
pub const ENV_DATABASE: &str = "AGENDA_IMPORT_DATABASE";

/// Which record store to write to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// PostgREST-style HTTP table endpoint
    Rest,
    /// Local SQLite database
    #[default]
    Sqlite,
    /// Keep records in memory (dry run)
    Memory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSection {
    pub batch_size: usize,
    /// Identity stamped on imported records
    pub owner_id: Option<String>,
}

impl Default for ImportSection {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            owner_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    pub kind: StoreKind,
    /// Base URL of the REST endpoint
    pub url: Option<String>,
    pub table: String,
    pub api_key: Option<String>,
    /// SQLite database URL or path
    pub database: String,
    pub timeout_secs: u64,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            kind: StoreKind::default(),
            url: None,
            table: "events".to_string(),
            api_key: None,
            database: default_database(),
            timeout_secs: 30,
        }
    }
}

/// Full application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub import: ImportSection,
    pub store: StoreSection,
}

/// Get the config directory (~/.config/agenda-import/)
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("agenda-import")
}

pub fn default_config_path() -> PathBuf {
    config_dir().join("config.toml")
}

fn default_database() -> String {
    let path = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("agenda-import")
        .join("events.db");
    format!("sqlite://{}", path.display())
}

impl Config {
    /// Parse a TOML document
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse configuration")
    }

    /// Load from `path`, or from the default location when `None`
    ///
    /// A missing default file yields defaults; a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (default_config_path(), false),
        };

        if !path.exists() {
            if explicit {
                bail!("Config file does not exist: {}", path.display());
            }
            log::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::from_toml(&text)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Apply environment overrides using the given lookup
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(owner) = lookup(ENV_OWNER) {
            self.import.owner_id = Some(owner);
        }
        if let Some(url) = lookup(ENV_STORE_URL) {
            self.store.url = Some(url);
        }
        if let Some(key) = lookup(ENV_API_KEY) {
            self.store.api_key = Some(key);
        }
        if let Some(db) = lookup(ENV_DATABASE) {
            self.store.database = db;
        }
    }

    /// Apply overrides from the process environment
    pub fn apply_process_env(&mut self) {
        self.apply_env(|key| std::env::var(key).ok().filter(|v| !v.is_empty()));
    }

    /// Build the configured record store
    pub async fn build_store(&self) -> Result<Box<dyn RecordStore>> {
        let store: Box<dyn RecordStore> = match self.store.kind {
            StoreKind::Rest => {
                let url = self
                    .store
                    .url
                    .as_deref()
                    .with_context(|| {
                        format!("REST store needs a URL (set store.url or {})", ENV_STORE_URL)
                    })?;
                Box::new(RestStore::new(
                    url,
                    self.store.table.as_str(),
                    self.store.api_key.clone(),
                    Duration::from_secs(self.store.timeout_secs),
                )?)
            }
            StoreKind::Sqlite => {
                if let Some(parent) = sqlite_file_parent(&self.store.database) {
                    std::fs::create_dir_all(&parent).with_context(|| {
                        format!("Failed to create database directory: {}", parent.display())
                    })?;
                }
                Box::new(
                    SqliteStore::connect(&self.store.database)
                        .await
                        .with_context(|| {
                            format!("Failed to open database: {}", self.store.database)
                        })?,
                )
            }
            StoreKind::Memory => Box::new(MemoryStore::new()),
        };

        log::info!("Using {:?} store: {}", self.store.kind, store.describe());
        Ok(store)
    }
}

/// Parent directory of a file-backed SQLite URL
fn sqlite_file_parent(database: &str) -> Option<PathBuf> {
    let path = database
        .strip_prefix("sqlite://")
        .or_else(|| database.strip_prefix("sqlite:"))
        .unwrap_or(database);
    let path = path.split('?').next().unwrap_or(path);

    if path.is_empty() || path.starts_with(":memory:") || path == "memory:" {
        return None;
    }

    Path::new(path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
}
