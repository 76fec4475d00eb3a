//! Booking types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Booking lifecycle state
///
/// `Completed` is set out of band by the session workflow; this core only
/// creates `Scheduled` bookings and transitions them to `Cancelled`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Scheduled,
    Completed,
    Cancelled,
}

/// A scheduled advisory session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub company_id: Uuid,
    pub advisor_id: Uuid,
    pub session_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Identifier of the mirrored external calendar event, when mirroring
    /// succeeded at creation time
    pub calendar_event_id: Option<String>,
    pub status: BookingStatus,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Active bookings block availability; cancelled ones do not.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status != BookingStatus::Cancelled
    }
}

/// Parameters for the booking-creation RPC
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    pub company_id: Uuid,
    pub advisor_id: Uuid,
    pub session_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub calendar_event_id: Option<String>,
    pub created_by: Uuid,
}
