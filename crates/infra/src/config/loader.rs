//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `ADVISORLY_STORAGE_URL`: Hosted backend base URL
//! - `ADVISORLY_STORAGE_SERVICE_KEY`: Service-role key
//! - `ADVISORLY_GOOGLE_CLIENT_ID`: OAuth client id
//! - `ADVISORLY_GOOGLE_CLIENT_SECRET`: OAuth client secret
//! - `ADVISORLY_GOOGLE_REDIRECT_URI`: OAuth redirect URI
//! - `ADVISORLY_TIME_ZONE`: Working time zone (optional, default UTC)
//! - `ADVISORLY_DAY_START_HOUR` / `ADVISORLY_DAY_END_HOUR` /
//!   `ADVISORLY_SLOT_MINUTES`: Slot grid (optional)
//! - `ADVISORLY_BIND_ADDR`: Server bind address (optional)

use std::path::{Path, PathBuf};

use advisorly_domain::{
    AdvisorlyError, BookingConfig, Config, GoogleConfig, Result, ServerConfig, StorageConfig,
};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `AdvisorlyError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `AdvisorlyError::Config` if required variables are missing
/// or have invalid values.
pub fn load_from_env() -> Result<Config> {
    let storage = StorageConfig {
        base_url: env_var("ADVISORLY_STORAGE_URL")?,
        service_key: env_var("ADVISORLY_STORAGE_SERVICE_KEY")?,
    };

    let google = GoogleConfig {
        client_id: env_var("ADVISORLY_GOOGLE_CLIENT_ID")?,
        client_secret: env_var("ADVISORLY_GOOGLE_CLIENT_SECRET")?,
        redirect_uri: env_var("ADVISORLY_GOOGLE_REDIRECT_URI")?,
        time_zone: std::env::var("ADVISORLY_TIME_ZONE").unwrap_or_else(|_| "UTC".to_string()),
    };

    let defaults = BookingConfig::default();
    let booking = BookingConfig {
        day_start_hour: env_u32("ADVISORLY_DAY_START_HOUR", defaults.day_start_hour)?,
        day_end_hour: env_u32("ADVISORLY_DAY_END_HOUR", defaults.day_end_hour)?,
        slot_minutes: env_u32("ADVISORLY_SLOT_MINUTES", defaults.slot_minutes)?,
    };

    let server = ServerConfig {
        bind_addr: std::env::var("ADVISORLY_BIND_ADDR")
            .unwrap_or_else(|_| ServerConfig::default().bind_addr),
    };

    Ok(Config { storage, google, booking, server })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `AdvisorlyError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(AdvisorlyError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            AdvisorlyError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| AdvisorlyError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content; format detected by extension.
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| AdvisorlyError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| AdvisorlyError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(AdvisorlyError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// Searches the current working directory, two parent levels, and the
/// executable's directory for `config.{json,toml}` / `advisorly.{json,toml}`.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(vec![
            cwd.join("config.json"),
            cwd.join("config.toml"),
            cwd.join("advisorly.json"),
            cwd.join("advisorly.toml"),
            cwd.join("../config.json"),
            cwd.join("../config.toml"),
            cwd.join("../../config.json"),
            cwd.join("../../config.toml"),
        ]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(vec![
                exe_dir.join("config.json"),
                exe_dir.join("config.toml"),
                exe_dir.join("advisorly.json"),
                exe_dir.join("advisorly.toml"),
            ]);
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        AdvisorlyError::Config(format!("Missing required environment variable: {key}"))
    })
}

/// Parse an optional numeric environment variable
fn env_u32(key: &str, default: u32) -> Result<u32> {
    match std::env::var(key) {
        Ok(value) => value
            .parse::<u32>()
            .map_err(|e| AdvisorlyError::Config(format!("Invalid value for {key}: {e}"))),
        Err(_) => Ok(default),
    }
}
