//! Google Calendar wire types
//!
//! Shapes exactly as they travel to and from the Google APIs; normalization
//! into domain types happens in the events client.

use serde::{Deserialize, Serialize};

/// Token endpoint success response (RFC 6749)
///
/// Also serializable: the OAuth proxy endpoint echoes it back to browser
/// clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleTokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub expires_in: i64,
    pub token_type: String,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
}

/// Token endpoint error body (RFC 6749 §5.2)
#[derive(Debug, Deserialize)]
pub struct OAuthErrorBody {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
}

impl OAuthErrorBody {
    /// `error: description` when a description is present, bare code
    /// otherwise.
    pub fn message(&self) -> String {
        match &self.error_description {
            Some(description) => format!("{}: {}", self.error, description),
            None => self.error.clone(),
        }
    }
}

/// One page of an events list response
#[derive(Debug, Deserialize)]
pub struct GoogleEventsPage {
    #[serde(default)]
    pub items: Vec<GoogleEvent>,
    #[serde(rename = "nextPageToken")]
    pub next_page_token: Option<String>,
}

/// A single event as returned by the events API
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleEvent {
    pub id: String,
    #[serde(default)]
    pub summary: Option<String>,
    pub start: GoogleEventTime,
    pub end: GoogleEventTime,
}

/// Event boundary: `dateTime` for timed events, bare `date` for all-day
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoogleEventTime {
    #[serde(rename = "dateTime", skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(rename = "timeZone", skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

/// Insert/patch body; unset fields are omitted so PATCH keeps partial
/// semantics
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleEventWrite {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<GoogleEventTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<GoogleEventTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendees: Option<Vec<GoogleAttendee>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminders: Option<GoogleReminders>,
}

/// Attendee entry on a written event
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleAttendee {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// Reminder settings; this system always defers to the user's defaults
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleReminders {
    pub use_default: bool,
}
