//! Configuration structures
//!
//! Typed configuration for the whole application. Loading (environment
//! variables, config files) lives in the infrastructure crate; these structs
//! only define the shape and the defaults.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_DAY_END_HOUR, DEFAULT_DAY_START_HOUR, DEFAULT_EVENT_TIME_ZONE, DEFAULT_SLOT_MINUTES,
};

/// Top-level application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub storage: StorageConfig,
    pub google: GoogleConfig,
    #[serde(default)]
    pub booking: BookingConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Hosted-backend (REST/RPC) connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Base URL of the hosted backend, e.g. `https://xyz.supabase.co`
    pub base_url: String,
    /// Service-role key used for server-side access
    pub service_key: String,
}

/// Google Calendar OAuth application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    /// IANA time zone used for slot computation and remote event bodies
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
}

/// Working-day slot grid settings
///
/// Every availability computation uses the same partition; these are
/// deployment constants, not per-request parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingConfig {
    #[serde(default = "default_day_start_hour")]
    pub day_start_hour: u32,
    #[serde(default = "default_day_end_hour")]
    pub day_end_hour: u32,
    #[serde(default = "default_slot_minutes")]
    pub slot_minutes: u32,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            day_start_hour: DEFAULT_DAY_START_HOUR,
            day_end_hour: DEFAULT_DAY_END_HOUR,
            slot_minutes: DEFAULT_SLOT_MINUTES,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind_addr: default_bind_addr() }
    }
}

fn default_time_zone() -> String {
    DEFAULT_EVENT_TIME_ZONE.to_string()
}

fn default_day_start_hour() -> u32 {
    DEFAULT_DAY_START_HOUR
}

fn default_day_end_hour() -> u32 {
    DEFAULT_DAY_END_HOUR
}

fn default_slot_minutes() -> u32 {
    DEFAULT_SLOT_MINUTES
}

fn default_bind_addr() -> String {
    "127.0.0.1:8787".to_string()
}
