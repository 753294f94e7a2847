// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Survey Cascade Contributors

use crate::cascade::{ResolverConfig, DEFAULT_LABEL_SEPARATOR};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Files written with a lower version are migrated on load and saved back.
pub const CURRENT_SETTINGS_VERSION: u32 = 2;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Settings parse error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub schema_version: u32,
    /// Joins ancestor names when a node carries no precomputed path label.
    #[serde(default = "default_separator")]
    pub label_separator: String,
    /// Entity kind applied when a caller does not ask for one.
    #[serde(default)]
    pub default_entity_type: Option<String>,
    /// Hierarchy file used when none is given on the command line.
    #[serde(default)]
    pub hierarchy_path: Option<PathBuf>,
}

fn default_separator() -> String {
    DEFAULT_LABEL_SEPARATOR.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: CURRENT_SETTINGS_VERSION,
            label_separator: default_separator(),
            default_entity_type: None,
            hierarchy_path: None,
        }
    }
}

impl Settings {
    pub fn config_path() -> PathBuf {
        crate::get_config_root().join("settings.json")
    }

    pub fn load_default() -> Result<Self, SettingsError> {
        Self::load(&Self::config_path())
    }

    /// Reads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            log::debug!(
                "[Settings] No settings file at {:?}, using defaults",
                path
            );
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let mut settings: Settings = serde_json::from_str(&content).map_err(|e| {
            log::error!("[Settings] JSON parse error for {:?}: {}", path, e);
            e
        })?;

        if settings.schema_version < CURRENT_SETTINGS_VERSION {
            settings.migrate();
            if let Err(e) = settings.save(path) {
                log::warn!("[Settings] Could not write migrated settings: {}", e);
            }
        }

        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        log::debug!("[Settings] Saved to {:?}", path);
        Ok(())
    }

    fn migrate(&mut self) {
        log::info!(
            "[Settings] Migrating settings from schema v{} to v{}",
            self.schema_version,
            CURRENT_SETTINGS_VERSION
        );

        // v0→v1: blank separators produced unreadable labels.
        if self.schema_version < 1 && self.label_separator.trim().is_empty() {
            self.label_separator = default_separator();
            log::info!("[Settings] v0→v1: Reset blank label separator");
        }

        // v1→v2: entity types are matched exactly, so stray whitespace must go.
        if self.schema_version < 2 {
            self.default_entity_type = self
                .default_entity_type
                .take()
                .map(|e| e.trim().to_string())
                .filter(|e| !e.is_empty());
            log::info!("[Settings] v1→v2: Normalized default entity type");
        }

        self.schema_version = CURRENT_SETTINGS_VERSION;
    }

    /// Resolver configuration seeded from these settings.
    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            parent_source: None,
            required_entity_type: self.default_entity_type.clone(),
            label_separator: self.label_separator.clone(),
        }
    }
}
