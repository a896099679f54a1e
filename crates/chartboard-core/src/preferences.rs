//! User preferences persistence for chartboard
//!
//! Stores chart widget defaults in `<config_dir>/chartboard-preferences.json`.

use crate::filters::{ChartType, TimeRangeMode};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const PREFERENCES_FILE: &str = "chartboard-preferences.json";

/// Defaults a chart widget mounts with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartPreferences {
    /// Chart type on mount (bar)
    pub default_chart_type: ChartType,
    /// Time range mode on mount (monthly)
    pub default_mode: TimeRangeMode,
}

impl ChartPreferences {
    /// Where preferences live inside `config_dir`
    pub fn path(config_dir: &Path) -> PathBuf {
        config_dir.join(PREFERENCES_FILE)
    }

    /// Copy with the given defaults replaced
    pub fn with_overrides(
        self,
        chart_type: Option<ChartType>,
        mode: Option<TimeRangeMode>,
    ) -> Self {
        Self {
            default_chart_type: chart_type.unwrap_or(self.default_chart_type),
            default_mode: mode.unwrap_or(self.default_mode),
        }
    }

    /// Saved preferences, or the defaults when there are none. An unreadable or
    /// malformed file is logged and treated as absent.
    pub fn load(config_dir: &Path) -> Self {
        let path = Self::path(config_dir);
        let content = match std::fs::read(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                tracing::warn!("Cannot read preferences {}: {}", path.display(), e);
                return Self::default();
            }
        };
        serde_json::from_slice(&content).unwrap_or_else(|e| {
            tracing::warn!("Ignoring malformed preferences {}: {}", path.display(), e);
            Self::default()
        })
    }

    /// Write preferences, creating `config_dir` if needed. The file is replaced in one
    /// rename so readers never see a partial write.
    pub fn save(&self, config_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(config_dir)
            .with_context(|| format!("Failed to create {}", config_dir.display()))?;

        let path = Self::path(config_dir);
        let staging = path.with_extension("json.tmp");
        let content = serde_json::to_vec_pretty(self).context("Failed to encode preferences")?;
        std::fs::write(&staging, content)
            .with_context(|| format!("Failed to write {}", staging.display()))?;
        std::fs::rename(&staging, &path)
            .with_context(|| format!("Failed to replace {}", path.display()))?;

        tracing::info!("Saved chart preferences to {}", path.display());
        Ok(())
    }
}
