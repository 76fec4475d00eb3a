//! Google Calendar events client
//!
//! CRUD against the primary calendar. Timed event boundaries are sent as
//! `{dateTime, timeZone}` pairs in the configured working time zone;
//! responses are normalized into domain events with UTC instants.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use reqwest::{Method, StatusCode};
use tracing::debug;

use advisorly_core::{EventDraft, EventPatch, GatewayError, GatewayResult};
use advisorly_domain::RemoteCalendarEvent;

use super::types::{
    GoogleAttendee, GoogleEvent, GoogleEventTime, GoogleEventWrite, GoogleEventsPage,
    GoogleReminders,
};
use crate::http::HttpClient;

const GOOGLE_CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";
const PRIMARY_CALENDAR: &str = "primary";

/// Events API client for one deployment-wide calendar zone
#[derive(Clone)]
pub struct GoogleEventsClient {
    http: HttpClient,
    base_url: String,
    time_zone: Tz,
}

impl GoogleEventsClient {
    /// Create a client against the production events API.
    pub fn new(http: HttpClient, time_zone: Tz) -> Self {
        Self { http, base_url: GOOGLE_CALENDAR_API_BASE.to_string(), time_zone }
    }

    /// Override the API base URL (tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn events_url(&self, event_id: Option<&str>) -> String {
        match event_id {
            Some(id) => format!(
                "{}/calendars/{}/events/{}",
                self.base_url,
                PRIMARY_CALENDAR,
                urlencoding::encode(id)
            ),
            None => format!("{}/calendars/{}/events", self.base_url, PRIMARY_CALENDAR),
        }
    }

    /// Insert an event; returns the remote event id.
    pub async fn insert(&self, access_token: &str, draft: &EventDraft) -> GatewayResult<String> {
        let body = GoogleEventWrite {
            summary: Some(draft.summary.clone()),
            description: draft.description.clone(),
            start: Some(self.timed_boundary(draft.start)),
            end: Some(self.timed_boundary(draft.end)),
            attendees: Some(
                draft
                    .attendees
                    .iter()
                    .map(|attendee| GoogleAttendee {
                        email: attendee.email.clone(),
                        display_name: attendee.display_name.clone(),
                    })
                    .collect(),
            ),
            color_id: draft.color_id.clone(),
            reminders: Some(GoogleReminders { use_default: true }),
        };

        let send_updates = if draft.notify_attendees { "all" } else { "none" };
        let request = self
            .http
            .request(Method::POST, self.events_url(None))
            .bearer_auth(access_token)
            .query(&[("sendUpdates", send_updates)])
            .json(&body);

        let response = self.send_checked(request, "insert").await?;
        let event: GoogleEvent = response
            .json()
            .await
            .map_err(|err| GatewayError::Rejected(format!("unparseable event response: {err}")))?;

        debug!(event_id = %event.id, "calendar event created");
        Ok(event.id)
    }

    /// Patch an event; only fields set on the patch are sent.
    pub async fn patch(
        &self,
        access_token: &str,
        event_id: &str,
        patch: &EventPatch,
    ) -> GatewayResult<()> {
        let body = GoogleEventWrite {
            summary: patch.summary.clone(),
            description: patch.description.clone(),
            start: patch.start.map(|instant| self.timed_boundary(instant)),
            end: patch.end.map(|instant| self.timed_boundary(instant)),
            attendees: None,
            color_id: None,
            reminders: None,
        };

        let request = self
            .http
            .request(Method::PATCH, self.events_url(Some(event_id)))
            .bearer_auth(access_token)
            .json(&body);

        self.send_checked(request, "patch").await?;
        Ok(())
    }

    /// Delete an event. An event that is already gone (404/410) counts as
    /// deleted.
    pub async fn delete(&self, access_token: &str, event_id: &str) -> GatewayResult<()> {
        let request = self
            .http
            .request(Method::DELETE, self.events_url(Some(event_id)))
            .bearer_auth(access_token);

        let response =
            self.http.send(request).await.map_err(|err| GatewayError::Transient(err.to_string()))?;

        let status = response.status();
        if status.is_success() || status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(GatewayError::Rejected(format!("delete failed ({status}): {body}")))
    }

    /// Events intersecting `[time_min, time_max)`, recurring events
    /// pre-expanded, ordered by start time. Follows pagination to the end.
    pub async fn list(
        &self,
        access_token: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> GatewayResult<Vec<RemoteCalendarEvent>> {
        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut params: Vec<(&str, String)> = vec![
                ("singleEvents", "true".to_string()),
                ("orderBy", "startTime".to_string()),
                ("timeMin", time_min.to_rfc3339()),
                ("timeMax", time_max.to_rfc3339()),
                ("timeZone", self.time_zone.name().to_string()),
            ];
            if let Some(ref token) = page_token {
                params.push(("pageToken", token.clone()));
            }

            let request = self
                .http
                .request(Method::GET, self.events_url(None))
                .bearer_auth(access_token)
                .query(&params);

            let response = self.send_checked(request, "list").await?;
            let page: GoogleEventsPage = response.json().await.map_err(|err| {
                GatewayError::Rejected(format!("unparseable events page: {err}"))
            })?;

            for event in page.items {
                events.push(normalize_event(event)?);
            }

            page_token = page.next_page_token;
            if page_token.is_none() {
                break;
            }
        }

        events.sort_by_key(|event| event.start);
        Ok(events)
    }

    fn timed_boundary(&self, instant: DateTime<Utc>) -> GoogleEventTime {
        GoogleEventTime {
            date_time: Some(instant.with_timezone(&self.time_zone).to_rfc3339()),
            date: None,
            time_zone: Some(self.time_zone.name().to_string()),
        }
    }

    async fn send_checked(
        &self,
        request: reqwest::RequestBuilder,
        operation: &str,
    ) -> GatewayResult<reqwest::Response> {
        let response =
            self.http.send(request).await.map_err(|err| GatewayError::Transient(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Rejected(format!("{operation} failed ({status}): {body}")));
        }
        Ok(response)
    }
}

/// Normalize a wire event into a domain event with UTC instants.
///
/// All-day events (a bare `date` instead of a `dateTime`) get midnight
/// bounds and the `is_all_day` flag; availability widens them to the full
/// working window.
fn normalize_event(event: GoogleEvent) -> GatewayResult<RemoteCalendarEvent> {
    let is_all_day = event.start.date.is_some();

    let (start, end) = if is_all_day {
        (
            parse_all_day_boundary(event.start.date.as_deref(), &event.id)?,
            parse_all_day_boundary(event.end.date.as_deref(), &event.id)?,
        )
    } else {
        (
            parse_timed_boundary(event.start.date_time.as_deref(), &event.id)?,
            parse_timed_boundary(event.end.date_time.as_deref(), &event.id)?,
        )
    };

    Ok(RemoteCalendarEvent {
        id: event.id,
        summary: event.summary.filter(|summary| !summary.trim().is_empty()),
        start,
        end,
        is_all_day,
    })
}

fn parse_all_day_boundary(value: Option<&str>, event_id: &str) -> GatewayResult<DateTime<Utc>> {
    let value = value.ok_or_else(|| {
        GatewayError::Rejected(format!("event {event_id} missing all-day boundary"))
    })?;

    let date = chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|err| {
        GatewayError::Rejected(format!("event {event_id} has invalid date '{value}': {err}"))
    })?;
    let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(|| {
        GatewayError::Rejected(format!("event {event_id}: no midnight for '{value}'"))
    })?;
    Ok(midnight.and_utc())
}

fn parse_timed_boundary(value: Option<&str>, event_id: &str) -> GatewayResult<DateTime<Utc>> {
    let value = value.ok_or_else(|| {
        GatewayError::Rejected(format!("event {event_id} missing timed boundary"))
    })?;

    let trimmed = value.trim();
    // Some calendars omit the offset on zone-qualified payloads
    let has_explicit_offset = trimmed.ends_with('Z')
        || trimmed
            .rfind('T')
            .is_some_and(|idx| trimmed[idx + 1..].chars().any(|c| matches!(c, '+' | '-')));
    let candidate =
        if has_explicit_offset { trimmed.to_string() } else { format!("{trimmed}Z") };

    chrono::DateTime::parse_from_rfc3339(&candidate)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| {
            GatewayError::Rejected(format!(
                "event {event_id} has invalid timestamp '{value}': {err}"
            ))
        })
}
