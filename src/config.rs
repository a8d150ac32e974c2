//! Configuration management for the `TripMate` backend
//!
//! Handles loading configuration from a TOML file and environment
//! variables, with per-field defaults.

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the `TripMate` backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripMateConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Weather API configuration
    #[serde(default)]
    pub weather: WeatherConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port to bind the API server to
    #[serde(default = "default_server_port")]
    pub port: u16,
}

/// Database settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite connection URL
    #[serde(default = "default_database_url")]
    pub url: String,
}

/// Weather API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Visual Crossing API key
    pub api_key: Option<String>,
    /// Base URL for the timeline weather API
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_weather_timeout")]
    pub timeout_seconds: u32,
    /// Unit group passed to the provider (us or metric)
    #[serde(default = "default_weather_unit_group")]
    pub unit_group: String,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default value functions
fn default_server_port() -> u16 {
    3001
}

fn default_database_url() -> String {
    "sqlite://tripmate.db?mode=rwc".to_string()
}

fn default_weather_base_url() -> String {
    "https://weather.visualcrossing.com/VisualCrossingWebServices/rest/services/timeline".to_string()
}

fn default_weather_timeout() -> u32 {
    5
}

fn default_weather_unit_group() -> String {
    "metric".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_server_port(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_weather_base_url(),
            timeout_seconds: default_weather_timeout(),
            unit_group: default_weather_unit_group(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for TripMateConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            weather: WeatherConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl TripMateConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from a specified path
    ///
    /// Environment variables with a `TRIPMATE_` prefix override file
    /// values, e.g. `TRIPMATE_WEATHER__API_KEY` sets `weather.api_key`.
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| PathBuf::from("tripmate.toml"));
        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file)
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        builder = builder.add_source(
            Environment::with_prefix("TRIPMATE")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        config
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TripMateConfig::default();
        assert_eq!(config.server.port, 3001);
        assert_eq!(config.weather.unit_group, "metric");
        assert_eq!(config.weather.timeout_seconds, 5);
        assert!(config.weather.api_key.is_none());
        assert!(config.weather.base_url.contains("visualcrossing"));
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let config = TripMateConfig::load_from_path(Some(PathBuf::from("does-not-exist.toml")))
            .expect("load should fall back to defaults");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.database.url, default_database_url());
    }
}
