// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Persisted user preferences.
//!
//! Settings live in a JSON file under the platform config directory and are
//! passed explicitly into the components that need them; there is no
//! ambient global state.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default offset for seeking ahead of an annotation, in milliseconds.
pub const DEFAULT_JUMP_BEFORE_MS: u64 = 5000;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Offset subtracted from an annotation's timestamp when seeking to it,
    /// so playback starts slightly before the event.
    pub jump_before_ms: u64,
    /// Directory the last document was opened from; file dialogs start here.
    pub last_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            jump_before_ms: DEFAULT_JUMP_BEFORE_MS,
            last_dir: None,
        }
    }
}

impl Config {
    fn file_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "oslviz")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load saved preferences, falling back to defaults when the file is
    /// missing or unreadable.
    pub fn load() -> Self {
        let Some(path) = Self::file_path() else {
            return Self::default();
        };
        let Ok(json) = std::fs::read_to_string(&path) else {
            return Self::default();
        };
        serde_json::from_str(&json).unwrap_or_else(|e| {
            log::warn!("Ignoring malformed config {}: {e}", path.display());
            Self::default()
        })
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::file_path().context("no config directory available")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.jump_before_ms, DEFAULT_JUMP_BEFORE_MS);
        assert!(config.last_dir.is_none());
    }

    #[test]
    fn test_partial_config_fills_in_defaults() {
        let config: Config = serde_json::from_str(r#"{"jump_before_ms": 2000}"#).unwrap();
        assert_eq!(config.jump_before_ms, 2000);
        assert!(config.last_dir.is_none());
    }

    #[test]
    fn test_config_round_trips() {
        let config = Config {
            jump_before_ms: 1500,
            last_dir: Some(PathBuf::from("/tmp/datasets")),
        };
        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.jump_before_ms, 1500);
        assert_eq!(parsed.last_dir, config.last_dir);
    }
}
