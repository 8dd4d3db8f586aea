//! Application settings loaded from config.toml and the environment.
//!
//! Every field has a sensible default so the service runs with no config file
//! at all; `DATABASE_URL` in the environment always takes precedence.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database connection URL
    #[serde(default = "default_database_url")]
    pub database_url: String,
    /// How long a booking may sit unconfirmed before the expiry sweep cancels it
    #[serde(default = "default_pending_expiry_hours")]
    pub pending_expiry_hours: i64,
    /// Seconds between maintenance sweep runs
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            pending_expiry_hours: default_pending_expiry_hours(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

fn default_database_url() -> String {
    "sqlite://data/dormhub.sqlite".to_string()
}

const fn default_pending_expiry_hours() -> i64 {
    48
}

const fn default_sweep_interval_secs() -> u64 {
    300
}

/// Loads application configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads configuration from ./config.toml when present, falling back to
/// defaults, with `DATABASE_URL` from the environment taking precedence.
pub fn load_app_configuration() -> Result<AppConfig> {
    let mut config = if Path::new("config.toml").exists() {
        load_config("config.toml")?
    } else {
        AppConfig::default()
    };

    if let Ok(url) = std::env::var("DATABASE_URL") {
        config.database_url = url;
    }

    Ok(config)
}
