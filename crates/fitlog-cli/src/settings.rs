use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use fitlog_core::{IntensityThresholds, StreakPolicy, MAX_WINDOW_DAYS};
use serde::{Deserialize, Serialize};

const DEFAULT_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub intensity_thresholds: IntensityThresholds,
    #[serde(default)]
    pub priority_categories: Vec<String>,
    #[serde(default)]
    pub streak: StreakPolicy,
    #[serde(default = "default_window_days")]
    pub default_window_days: i64,
}

fn default_window_days() -> i64 {
    DEFAULT_WINDOW_DAYS
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            intensity_thresholds: IntensityThresholds::default(),
            priority_categories: Vec::new(),
            streak: StreakPolicy::default(),
            default_window_days: DEFAULT_WINDOW_DAYS,
        }
    }
}

impl Settings {
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join("fitlog");
        Ok(config_dir.join("settings.json"))
    }

    pub fn load() -> Self {
        Self::config_path()
            .ok()
            .and_then(|path| fs::read_to_string(path).ok())
            .and_then(|content| match serde_json::from_str(&content) {
                Ok(settings) => Some(settings),
                Err(err) => {
                    tracing::warn!(error = %err, "ignoring unreadable settings.json");
                    None
                }
            })
            .unwrap_or_default()
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_path()?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(&path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Window length for trailing rollups.
    /// Priority: --days flag > FITLOG_WINDOW_DAYS env var > settings.json > default (7)
    pub fn window_days(&self, flag: Option<i64>) -> i64 {
        let days = flag
            .or_else(|| {
                std::env::var("FITLOG_WINDOW_DAYS")
                    .ok()
                    .and_then(|v| v.trim().parse::<i64>().ok())
            })
            .unwrap_or(self.default_window_days);

        days.min(MAX_WINDOW_DAYS)
    }

    /// Streak policy, with FITLOG_STREAK_CAP overriding the cap of a capped policy.
    pub fn streak_policy(&self) -> StreakPolicy {
        match self.streak {
            StreakPolicy::Capped { cap } => {
                let cap = std::env::var("FITLOG_STREAK_CAP")
                    .ok()
                    .and_then(|v| v.trim().parse::<u32>().ok())
                    .unwrap_or(cap);
                StreakPolicy::Capped { cap }
            }
            StreakPolicy::Contiguous => StreakPolicy::Contiguous,
        }
    }

    pub fn thresholds(&self) -> IntensityThresholds {
        if self.intensity_thresholds.is_valid() {
            self.intensity_thresholds
        } else {
            tracing::warn!(
                thresholds = ?self.intensity_thresholds,
                "intensity thresholds must be finite and non-decreasing, using defaults"
            );
            IntensityThresholds::default()
        }
    }
}
