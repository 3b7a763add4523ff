use std::path::PathBuf;

use sysmon_core::error::CoreError;
use sysmon_core::thresholds::ThresholdConfig;
use sysmon_events::{EmailConfig, EmailError};

use crate::battery::DEFAULT_POWER_SUPPLY_PATH;

/// Default SQLite database file.
const DEFAULT_DATABASE_PATH: &str = "system_metrics.db";

/// Startup configuration failure.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid thresholds: {0}")]
    Thresholds(#[from] CoreError),

    #[error("Invalid email settings: {0}")]
    Email(#[from] EmailError),
}

/// Agent configuration, built once at startup and immutable afterwards.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub database_path: PathBuf,
    pub power_supply_path: PathBuf,
    pub thresholds: ThresholdConfig,
    /// `None` when `SMTP_HOST` is unset; alerts are then only logged.
    pub email: Option<EmailConfig>,
}

impl AgentConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default                    |
    /// |----------------------------|----------------------------|
    /// | `DATABASE_PATH`            | `system_metrics.db`        |
    /// | `SYSMON_POWER_SUPPLY_PATH` | `/sys/class/power_supply`  |
    ///
    /// Thresholds and email settings are documented on
    /// [`ThresholdConfig::from_lookup`] and [`EmailConfig::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            database_path: lookup("DATABASE_PATH")
                .unwrap_or_else(|| DEFAULT_DATABASE_PATH.into())
                .into(),
            power_supply_path: lookup("SYSMON_POWER_SUPPLY_PATH")
                .unwrap_or_else(|| DEFAULT_POWER_SUPPLY_PATH.into())
                .into(),
            thresholds: ThresholdConfig::from_lookup(&lookup)?,
            email: EmailConfig::from_lookup(&lookup)?,
        })
    }
}
