use anyhow::{Context, Result, anyhow};
use chrono::{FixedOffset, Offset, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::{model::Units, scoring::ScoringConfig};

/// Environment variable that overrides the stored API key.
pub const API_KEY_ENV: &str = "WEATHERLENS_API_KEY";

const DEFAULT_UTC_OFFSET_MINUTES: i32 = 330;
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// units = "metric"
/// utc_offset_minutes = 330
///
/// [scoring]
/// ideal_low = 18.0
/// missing_aqi = "assume-best"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub units: Units,
    /// Display zone as minutes east of UTC.
    pub utc_offset_minutes: i32,
    pub request_timeout_secs: u64,
    pub scoring: ScoringConfig,
    /// Key taken from the environment. Used in place of `api_key`, never written to disk.
    #[serde(skip)]
    pub(crate) env_api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            units: Units::Metric,
            utc_offset_minutes: DEFAULT_UTC_OFFSET_MINUTES,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            scoring: ScoringConfig::default(),
            env_api_key: None,
        }
    }
}

impl Config {
    /// Load config from disk, or defaults if it doesn't exist yet, then apply
    /// the API key environment override.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        let mut cfg = Self::load_from(&path)?;
        cfg.override_api_key(std::env::var(API_KEY_ENV).ok());
        Ok(cfg)
    }

    /// Use `key` for requests without touching the stored `api_key`. Blank keys are ignored.
    pub fn override_api_key(&mut self, key: Option<String>) {
        let key = key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty());
        if key.is_some() {
            self.env_api_key = key;
        }
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        cfg.validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weatherlens", "weatherlens")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn validate(&self) -> Result<()> {
        if offset_from_minutes(self.utc_offset_minutes).is_none() {
            return Err(anyhow!(
                "utc_offset_minutes must be within ±1439, got {}",
                self.utc_offset_minutes
            ));
        }

        let s = &self.scoring;
        if s.ideal_low <= 0.0 {
            return Err(anyhow!("scoring.ideal_low must be above 0 °C, got {}", s.ideal_low));
        }
        if s.ideal_low > s.ideal_high {
            return Err(anyhow!(
                "scoring.ideal_low ({}) must not exceed scoring.ideal_high ({})",
                s.ideal_low,
                s.ideal_high
            ));
        }

        let total = s.weight_temperature + s.weight_rain + s.weight_air_quality;
        if (total - 1.0).abs() > 1e-6 {
            tracing::warn!(total, "Scoring weights do not sum to 1.0, scores may leave [0, 1]");
        }

        Ok(())
    }

    pub fn api_key(&self) -> Option<&str> {
        self.env_api_key
            .as_deref()
            .or(self.api_key.as_deref())
            .filter(|k| !k.is_empty())
    }

    pub fn display_offset(&self) -> FixedOffset {
        offset_from_minutes(self.utc_offset_minutes).unwrap_or_else(|| Utc.fix())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

fn offset_from_minutes(minutes: i32) -> Option<FixedOffset> {
    minutes.checked_mul(60).and_then(FixedOffset::east_opt)
}
