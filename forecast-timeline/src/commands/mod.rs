pub mod bulk_status;
pub mod categorize;
pub mod config;
pub mod generate;
pub mod has_edits;
pub mod import;
pub mod recalc;
pub mod show;

use std::path::{Path, PathBuf};

use anyhow::Context;
use rusqlite::Connection;

use forecast_data::DataError;
use forecast_timeline::config::{load_config, ForecastConfig};
use forecast_timeline::service::EngineContext;
use forecast_timeline::{ErrorKind, TimelineError};

/// Exit code for an unknown opportunity or a missing timeline.
pub const EXIT_NOT_FOUND: u8 = 3;
/// Exit code for a rejected edit or malformed input.
pub const EXIT_INVALID_ARGUMENT: u8 = 4;

/// Resolved configuration shared by every command.
pub struct Runtime {
    pub config: ForecastConfig,
    pub db_path: PathBuf,
}

impl Runtime {
    pub fn load(config_path: Option<&Path>, db_override: Option<PathBuf>) -> anyhow::Result<Self> {
        let config = load_config(config_path)?;
        let db_path = db_override.unwrap_or_else(|| config.resolved_db_path());
        Ok(Self { config, db_path })
    }

    pub fn open_db(&self) -> anyhow::Result<Connection> {
        forecast_data::db::open_or_create(&self.db_path)
            .with_context(|| format!("failed to open database {}", self.db_path.display()))
    }

    pub fn context(&self) -> EngineContext {
        EngineContext::from_config(&self.config)
    }
}

/// Map a failed command onto a process exit code.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    if let Some(err) = err.downcast_ref::<TimelineError>() {
        return match err.kind() {
            ErrorKind::NotFound => EXIT_NOT_FOUND,
            ErrorKind::InvalidArgument => EXIT_INVALID_ARGUMENT,
            ErrorKind::Internal => 1,
        };
    }
    if err.downcast_ref::<DataError>().is_some() {
        return EXIT_INVALID_ARGUMENT;
    }
    1
}
