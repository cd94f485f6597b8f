//! # Configuration Persistence
//!
//! Host configuration for `usage-view`, stored in
//! `~/.config/entity-usage-display/config.json`.
//!
//! ## Overview
//!
//! The [`Config`] struct is serialized to / deserialized from a JSON file in
//! the user's XDG config directory. It holds the base path links are built
//! under, the formatter settings bag, and an optional translation catalog.
//!
//! ```json
//! {
//!   "base_path": "https://cms.example.com",
//!   "display": { "max_expanded": 5, "show_fields": ["entity", "status"] },
//!   "translations": "/etc/cms/fr.json"
//! }
//! ```
//!
//! The `display` bag is kept untyped here; the formatter validates it when
//! it is built.
//!
//! The `directories` crate is used to resolve the platform-appropriate config
//! directory.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Persisted host configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Prefix for generated links.
    #[serde(default)]
    pub base_path: String,
    /// Settings bag handed to the formatter.
    #[serde(default)]
    pub display: Value,
    /// Translation catalog file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translations: Option<PathBuf>,
}

impl Config {
    /// Load configuration from disk. Returns `Config::default()` if the file
    /// does not exist or cannot be parsed.
    pub fn load() -> Self {
        match Self::try_load() {
            Ok(config) => config,
            Err(err) => {
                let error = format!("{err:#}");
                tracing::warn!(%error, "using default configuration");
                Self::default()
            }
        }
    }

    fn try_load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Load configuration from a specific path. Returns `Config::default()` if
    /// the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Save the current configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Return the path to the config file.
    pub fn config_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "entity-usage-display")
            .context("Could not determine config directory")?;
        Ok(dirs.config_dir().join("config.json"))
    }
}
