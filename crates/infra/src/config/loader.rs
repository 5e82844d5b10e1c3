//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. Reads a `.env` file into the environment if one is present
//! 2. Attempts to load from environment variables
//! 3. If incomplete, falls back to loading from file
//! 4. Probes multiple paths for config files
//! 5. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `PUBLIC_ORIGIN`: Browser-facing origin of the application
//! - `BACKEND_ORIGIN`: Origin of the backend API
//! - `APP_REG_CLIENT_ID`: Identity provider client id
//! - `AZURE_AUTHORITY`: Identity provider authority URL
//! - `APP_REG_CLIENT_SECRET`: Client secret (optional, confidential clients)
//! - `API_SCOPE`: Backend API scope prefix
//! - `REDIS_HOST` / `REDIS_PORT`: Session store address
//! - `REDIS_USERNAME`: Session store user (optional, defaults to `default`)
//! - `REDIS_PASSWORD`: Session store password
//! - `REDIS_SESSION_DB`: Logical database index for sessions
//! - `SESSION_TIMEOUT_SECONDS`: Sliding session lifetime (optional, defaults
//!   to three weeks)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./sessiongate.json` or `./sessiongate.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use sessiongate_common::redact;
use sessiongate_domain::constants::{DEFAULT_SESSION_TIMEOUT_SECONDS, DEFAULT_STORE_USERNAME};
use sessiongate_domain::{AppConfig, IdentityConfig, Result, SessionGateError, StoreConfig};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables (after reading any
/// `.env` file). If any required variables are missing, falls back to
/// loading from a config file.
///
/// # Errors
/// Returns `SessionGateError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing
pub fn load() -> Result<AppConfig> {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "Loaded .env file");
    }

    match load_from_env() {
        Ok(config) => {
            tracing::info!(
                store_host = %config.store.host,
                store_password = %redact(&config.store.password),
                "Configuration loaded from environment variables"
            );
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `SessionGateError::Config` if required variables are missing
/// or have invalid values.
pub fn load_from_env() -> Result<AppConfig> {
    let identity = IdentityConfig {
        client_id: env_var("APP_REG_CLIENT_ID")?,
        authority: env_var("AZURE_AUTHORITY")?,
        client_secret: optional_env_var("APP_REG_CLIENT_SECRET"),
        api_scope: env_var("API_SCOPE")?,
    };

    let store = StoreConfig {
        host: env_var("REDIS_HOST")?,
        port: env_parse("REDIS_PORT")?,
        username: optional_env_var("REDIS_USERNAME")
            .unwrap_or_else(|| DEFAULT_STORE_USERNAME.to_string()),
        password: env_var("REDIS_PASSWORD")?,
        database: env_parse("REDIS_SESSION_DB")?,
        session_timeout_seconds: match optional_env_var("SESSION_TIMEOUT_SECONDS") {
            Some(raw) => parse_value("SESSION_TIMEOUT_SECONDS", &raw)?,
            None => DEFAULT_SESSION_TIMEOUT_SECONDS,
        },
    };

    Ok(AppConfig {
        public_origin: env_var("PUBLIC_ORIGIN")?,
        backend_origin: env_var("BACKEND_ORIGIN")?,
        identity,
        store,
    })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `SessionGateError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing
pub fn load_from_file(path: Option<PathBuf>) -> Result<AppConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(SessionGateError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            SessionGateError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| SessionGateError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<AppConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| SessionGateError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| SessionGateError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(SessionGateError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    const NAMES: [&str; 6] = [
        "config.json",
        "config.toml",
        "sessiongate.json",
        "sessiongate.toml",
        "../config.json",
        "../config.toml",
    ];

    let mut bases = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        bases.push(cwd);
    }
    if let Some(exe_dir) = std::env::current_exe().ok().and_then(|p| p.parent().map(Path::to_path_buf)) {
        bases.push(exe_dir);
    }

    bases.iter().flat_map(|base| NAMES.iter().map(move |name| base.join(name))).find(|path| path.exists())
}

/// Get required environment variable
///
/// Empty values count as missing.
fn env_var(key: &str) -> Result<String> {
    optional_env_var(key).ok_or_else(|| {
        SessionGateError::Config(format!("Missing required environment variable: {key}"))
    })
}

fn optional_env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Get and parse a required environment variable
fn env_parse<T>(key: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    parse_value(key, &env_var(key)?)
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| SessionGateError::Config(format!("Invalid value for {key}: {e}")))
}
