use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::engine::lifecycle::Lifecycle;
use crate::engine::status::TransitionPolicy;

/// Environment variable that overrides the database location.
pub const DB_PATH_ENV: &str = "FORECAST_DB_PATH";

/// Forecast configuration read from `~/.config/forecast/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    pub db_path: Option<PathBuf>,
    /// Stage codes of the sales lifecycle, in execution order.
    pub lifecycle: Vec<String>,
    /// Lead offerings that get a schedule even without attributed value.
    pub schedulable_lead_lines: Vec<String>,
    pub transition_policy: TransitionPolicy,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            lifecycle: ["2", "3", "4A", "4B", "4C", "5A", "5B", "5C"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            schedulable_lead_lines: ["CES", "INS", "BPS"].iter().map(|s| s.to_string()).collect(),
            transition_policy: TransitionPolicy::Permissive,
        }
    }
}

impl ForecastConfig {
    /// Resolve the database path: env var, then config file, then default.
    pub fn resolved_db_path(&self) -> PathBuf {
        std::env::var_os(DB_PATH_ENV)
            .map(PathBuf::from)
            .or_else(|| self.db_path.clone())
            .unwrap_or_else(forecast_data::db::default_db_path)
    }

    pub fn lifecycle(&self) -> Lifecycle {
        Lifecycle::new(self.lifecycle.clone())
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.lifecycle.is_empty() {
            anyhow::bail!("lifecycle must list at least one stage code");
        }
        let mut seen = std::collections::HashSet::new();
        for code in &self.lifecycle {
            if code.trim().is_empty() {
                anyhow::bail!("lifecycle contains an empty stage code");
            }
            if !seen.insert(code) {
                anyhow::bail!("lifecycle lists stage '{}' more than once", code);
            }
        }
        Ok(())
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("forecast")
        .join("config.toml")
}

/// Load configuration from `path` (or the default location).
///
/// A missing file yields the defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<ForecastConfig> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(config_path);
    let config = if path.exists() {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        toml::from_str::<ForecastConfig>(&content)
            .with_context(|| format!("failed to parse config: {}", path.display()))?
    } else {
        ForecastConfig::default()
    };
    config
        .validate()
        .with_context(|| format!("invalid config: {}", path.display()))?;
    Ok(config)
}
