//! External calendar types (normalized)
//!
//! Wire-level provider structs live in the infrastructure crate; these are
//! the normalized shapes the core works with.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A remote calendar event normalized to UTC instants
///
/// All-day events carry their bare-date midnight bounds and
/// `is_all_day = true`; the availability calculator widens them to the full
/// working window.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCalendarEvent {
    pub id: String,
    pub summary: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub is_all_day: bool,
}

/// Connection state of an advisor's external calendar account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarConnectionStatus {
    pub connected: bool,
    pub email: Option<String>,
    pub last_synced: Option<DateTime<Utc>>,
    /// Human-readable reason when the last connectivity check failed
    pub error: Option<String>,
}
