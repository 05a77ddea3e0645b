//! Configuration loader for the `sensor-dashboard` service.
//!
//! This module centralizes all runtime configuration values and their defaults,
//! loading from environment variables (with optional `.env` file support
//! provided by the caller). Nothing else in the crate reads `env::var` for
//! application settings.
//!
use std::env;

use anyhow::{anyhow, Result};
use chrono_tz::Tz;

/// Parse an optional environment variable into `$ty` with a default value.
macro_rules! parse_env {
    ($var_name:expr, $ty:ty, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.trim().parse::<$ty>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Read an optional string environment variable, treating blank values as unset.
macro_rules! optional_env {
    ($var_name:expr) => {
        env::var($var_name).ok().filter(|v| !v.trim().is_empty())
    };
}

pub const DEFAULT_DISPLAY_TZ: Tz = chrono_tz::US::Central;
pub const DEFAULT_PORT: u16 = 8050;

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// Database host. `None` falls back to the libpq defaults (`PGHOST`).
    pub db_host: Option<String>,

    pub db_port: u16,

    pub db_name: Option<String>,

    pub db_user: Option<String>,

    pub db_password: Option<String>,

    /// Timezone used for every timestamp shown in the UI.
    pub display_tz: Tz,

    /// Choices offered by the sensor dropdown.
    pub sensor_ids: Vec<String>,

    /// `ENV=dev`: verbose logging, detailed error bodies, uncached UI page.
    pub dev_mode: bool,

    /// HTTP listen port (bound on all interfaces).
    pub port: u16,
}

/// Load configuration from environment variables with defaults.
///
/// Optional:
/// - `DB_HOST`, `DB_NAME`, `DB_USER`, `DB_PASSWORD` – connection parameters
/// - `DB_PORT` – database port (default: 5432)
/// - `DISPLAY_TZ` – IANA timezone name (default: `US/Central`)
/// - `SENSOR_IDS` – comma separated dropdown values (default: `1,2`)
/// - `PORT` – HTTP port (default: 8050)
/// - `ENV` – `dev` turns on dev mode
///
/// Missing database credentials are not an error here; the connection
/// attempt made for each request reports them instead.
///
/// Returns an error if any variable is present but invalid.
pub fn load_from_env() -> Result<Config> {
    // ---
    let db_port = parse_env!("DB_PORT", u16, 5432);
    let port = parse_env!("PORT", u16, DEFAULT_PORT);

    let display_tz = match optional_env!("DISPLAY_TZ") {
        Some(name) => parse_timezone(&name)?,
        None => DEFAULT_DISPLAY_TZ,
    };

    let sensor_ids = optional_env!("SENSOR_IDS")
        .map(|v| parse_sensor_ids(&v))
        .unwrap_or_else(|| vec!["1".to_string(), "2".to_string()]);

    Ok(Config {
        db_host: optional_env!("DB_HOST"),
        db_port,
        db_name: optional_env!("DB_NAME"),
        db_user: optional_env!("DB_USER"),
        db_password: optional_env!("DB_PASSWORD"),
        display_tz,
        sensor_ids,
        dev_mode: is_dev_mode(),
        port,
    })
}

/// `true` when `ENV` is exactly `dev`.
pub fn is_dev_mode() -> bool {
    env::var("ENV").as_deref() == Ok("dev")
}

fn parse_timezone(name: &str) -> Result<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|e| anyhow!("Invalid DISPLAY_TZ '{}': {}", name, e))
}

fn parse_sensor_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(String::from)
        .collect()
}

impl Config {
    /// Log the loaded configuration for debugging purposes.
    ///
    /// The database password is never printed, only whether one is set.
    pub fn log_config(&self) {
        // ---
        let unset = "<unset>";
        let password = if self.db_password.is_some() {
            "****"
        } else {
            unset
        };

        tracing::info!("Configuration loaded:");
        tracing::info!("  DB_HOST     : {}", self.db_host.as_deref().unwrap_or(unset));
        tracing::info!("  DB_PORT     : {}", self.db_port);
        tracing::info!("  DB_NAME     : {}", self.db_name.as_deref().unwrap_or(unset));
        tracing::info!("  DB_USER     : {}", self.db_user.as_deref().unwrap_or(unset));
        tracing::info!("  DB_PASSWORD : {}", password);
        tracing::info!("  DISPLAY_TZ  : {}", self.display_tz.name());
        tracing::info!("  SENSOR_IDS  : {}", self.sensor_ids.join(","));
        tracing::info!("  PORT        : {}", self.port);
        tracing::info!("  ENV         : {}", if self.dev_mode { "dev" } else { unset });
    }
}
