//! Runtime configuration.
//!
//! Resolution order, later sources win:
//! 1. Built-in defaults
//! 2. `<config_dir>/taskman/config.json`
//! 3. Environment: `MAX_PROCESSES`, `TASKMAN_STORAGE`, `TASKMAN_STARTUP_DELAY_MS`
//! 4. Command-line flags (applied by the binary)

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};

use crate::error::TaskManagerError;
use crate::manager::TaskManager;
use crate::storage::{FifoProcessStorage, HashProcessStorage, PriorityProcessStorage};

const APP_NAME: &str = "taskman";
const CONFIG_FILE: &str = "config.json";

/// Capacity used when nothing else is configured.
pub const DEFAULT_CAPACITY: usize = 5;

pub const ENV_CAPACITY: &str = "MAX_PROCESSES";
pub const ENV_STORAGE: &str = "TASKMAN_STORAGE";
pub const ENV_STARTUP_DELAY: &str = "TASKMAN_STARTUP_DELAY_MS";

/// Which [`ProcessStorage`](crate::storage::ProcessStorage) variant to build.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StorageKind {
    /// Reject new processes when full.
    #[default]
    Hash,
    /// Evict the oldest process when full.
    Fifo,
    /// Evict the oldest lowest-priority process when full.
    Priority,
}

impl StorageKind {
    pub const ALL: [StorageKind; 3] = [Self::Hash, Self::Fifo, Self::Priority];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hash => "hash",
            Self::Fifo => "fifo",
            Self::Priority => "priority",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "hash" => Some(Self::Hash),
            "fifo" => Some(Self::Fifo),
            "priority" => Some(Self::Priority),
            _ => None,
        }
    }

    pub fn parse(s: &str) -> Result<Self, TaskManagerError> {
        Self::from_str(&s.trim().to_ascii_lowercase())
            .ok_or_else(|| TaskManagerError::UnknownStorage(s.to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TaskmanConfig {
    /// Maximum number of live processes. `None` means unbounded.
    pub capacity: Option<usize>,
    pub storage: StorageKind,
    /// Delay before the hosting program starts issuing requests.
    pub startup_delay_ms: u64,
}

impl Default for TaskmanConfig {
    fn default() -> Self {
        Self {
            capacity: Some(DEFAULT_CAPACITY),
            storage: StorageKind::Hash,
            startup_delay_ms: 0,
        }
    }
}

impl TaskmanConfig {
    /// Load from the user's config directory, then apply the environment.
    ///
    /// A missing or unreadable file falls back to defaults. Malformed
    /// environment values are an error.
    pub fn load() -> Result<Self> {
        let mut config = match get_config_path() {
            Ok(path) => Self::load_from(&path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config, using defaults: {:#}", e);
                Self::default()
            }),
            Err(_) => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Read a JSON config file. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config = serde_json::from_str(&content).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Override fields from environment variables looked up through `var`.
    ///
    /// `MAX_PROCESSES=unbounded` removes the capacity limit.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(raw) = var(ENV_CAPACITY) {
            self.capacity = if raw.trim().eq_ignore_ascii_case("unbounded") {
                None
            } else {
                Some(
                    raw.trim()
                        .parse()
                        .with_context(|| format!("Invalid {}: {:?}", ENV_CAPACITY, raw))?,
                )
            };
        }

        if let Some(raw) = var(ENV_STORAGE) {
            self.storage = StorageKind::parse(&raw)?;
        }

        if let Some(raw) = var(ENV_STARTUP_DELAY) {
            self.startup_delay_ms = raw
                .trim()
                .parse()
                .with_context(|| format!("Invalid {}: {:?}", ENV_STARTUP_DELAY, raw))?;
        }

        Ok(())
    }

    /// Build a manager with the configured storage and capacity.
    pub fn build_manager(&self) -> TaskManager {
        match (self.storage, self.capacity) {
            (StorageKind::Hash, Some(cap)) => {
                TaskManager::new(HashProcessStorage::with_capacity_limit(cap))
            }
            (StorageKind::Hash, None) => TaskManager::new(HashProcessStorage::new()),
            (StorageKind::Fifo, Some(cap)) => {
                TaskManager::new(FifoProcessStorage::with_capacity_limit(cap))
            }
            (StorageKind::Fifo, None) => TaskManager::new(FifoProcessStorage::new()),
            (StorageKind::Priority, Some(cap)) => {
                TaskManager::new(PriorityProcessStorage::with_capacity_limit(cap))
            }
            (StorageKind::Priority, None) => TaskManager::new(PriorityProcessStorage::new()),
        }
    }
}

pub fn get_config_path() -> Result<PathBuf> {
    let mut path =
        config_dir().ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    path.push(APP_NAME);
    path.push(CONFIG_FILE);
    Ok(path)
}
