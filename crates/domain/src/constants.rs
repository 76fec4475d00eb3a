//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Working-day slot grid
pub const DEFAULT_DAY_START_HOUR: u32 = 9;
pub const DEFAULT_DAY_END_HOUR: u32 = 17;
pub const DEFAULT_SLOT_MINUTES: u32 = 60;

// Credential lifecycle
pub const TOKEN_REFRESH_MARGIN_SECS: i64 = 300;
pub const CREDENTIAL_SCHEMA_VERSION: u32 = 1;

// Calendar event rendering
pub const DEFAULT_EVENT_TIME_ZONE: &str = "UTC";
pub const BOOKING_EVENT_COLOR_ID: &str = "9";
