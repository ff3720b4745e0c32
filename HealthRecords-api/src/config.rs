//! Application configuration loaded from the environment

use std::env;
use std::path::PathBuf;

use axum::http::HeaderValue;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable is set but cannot be parsed
    #[error("Invalid value for {name}: '{value}'")]
    InvalidValue { name: &'static str, value: String },
}

/// Settings the API server reads at startup
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Port to listen on
    pub port: u16,
    /// Deployment environment reported by the health check
    pub environment: String,
    /// Directory holding the SQLite database
    pub data_dir: PathBuf,
    /// Path of the SQLite database file
    pub sqlite_path: PathBuf,
    /// Allowed CORS origin; any origin when unset
    pub cors_allow_origin: Option<HeaderValue>,
}

impl AppConfig {
    /// Read the configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Read the configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidValue { name: "PORT", value: raw })?,
            None => 3000,
        };

        let environment = lookup("APP_ENV").unwrap_or_else(|| "development".to_string());
        let data_dir = PathBuf::from(lookup("DATA_DIR").unwrap_or_else(|| "data".to_string()));
        let sqlite_path = lookup("DB_SQLITE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("health_records.db"));
        let cors_allow_origin = match lookup("CORS_ALLOW_ORIGIN").filter(|origin| !origin.trim().is_empty()) {
            Some(raw) => Some(HeaderValue::from_str(raw.trim()).map_err(|_| ConfigError::InvalidValue {
                name: "CORS_ALLOW_ORIGIN",
                value: raw,
            })?),
            None => None,
        };

        Ok(Self {
            port,
            environment,
            data_dir,
            sqlite_path,
            cors_allow_origin,
        })
    }
}
