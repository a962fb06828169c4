//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `SERVER_EVENTS` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use server_events::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server events at {}", config.connection.base_url);
//! ```

mod connection;
mod error;
mod telemetry;

pub use connection::ConnectionSettings;
pub use error::{ConfigError, ValidationError};
pub use telemetry::{LogFormat, TelemetryConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server events endpoint and connection timings
    pub connection: ConnectionSettings,

    /// Log filter and format
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `SERVER_EVENTS` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `SERVER_EVENTS__CONNECTION__BASE_URL=https://cms.example.com/admin`
    /// - `SERVER_EVENTS__CONNECTION__PROTOCOLS=text,json`
    /// - `SERVER_EVENTS__TELEMETRY__FORMAT=json`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Required environment variables are missing
    /// - Values cannot be parsed into expected types
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("SERVER_EVENTS")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("connection.protocols"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.connection.validate()?;
        self.telemetry.validate()?;
        Ok(())
    }
}
