//! Port interfaces for scheduling and calendar synchronization
//!
//! These traits define the boundaries between core business logic
//! and infrastructure implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use advisorly_domain::{
    Advisor, Booking, CalendarConnectionStatus, CompanyRef, CredentialBundle, NewBooking,
    RemoteCalendarEvent, Result, SessionTemplateRef,
};

/// Error type for calendar gateway operations
///
/// Replaces a flat "falsy on failure" contract: callers can distinguish an
/// advisor who never connected from a transient provider outage and from a
/// revoked grant. The availability and booking flows treat every variant as
/// a degraded-but-continuing state; only the interactive authorization flow
/// surfaces gateway failures to the user.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// No stored credentials, or no refresh token to recover with
    #[error("advisor has no usable calendar credentials")]
    NotConnected,

    /// The provider rejected the grant (e.g. the user revoked access)
    #[error("calendar access revoked: {0}")]
    Revoked(String),

    /// Transport-level failure talking to the provider
    #[error("calendar provider unreachable: {0}")]
    Transient(String),

    /// The provider answered with a non-success status
    #[error("calendar provider rejected the request: {0}")]
    Rejected(String),

    /// Reading or writing the credential bundle failed
    #[error("credential storage failed: {0}")]
    Storage(String),
}

/// Result alias for gateway operations
pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

/// A new event to mirror into the advisor's external calendar
#[derive(Debug, Clone)]
pub struct EventDraft {
    pub summary: String,
    pub description: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub attendees: Vec<EventAttendee>,
    pub color_id: Option<String>,
    /// Whether the provider should email attendees about the event
    pub notify_attendees: bool,
}

/// An attendee on a mirrored event
#[derive(Debug, Clone)]
pub struct EventAttendee {
    pub email: String,
    pub display_name: Option<String>,
}

/// Partial update of a mirrored event; only set fields are sent
#[derive(Debug, Clone, Default)]
pub struct EventPatch {
    pub summary: Option<String>,
    pub description: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

/// Trait for advisor record access
#[async_trait]
pub trait AdvisorRepository: Send + Sync {
    /// Load an advisor by id
    async fn get_advisor(&self, advisor_id: Uuid) -> Result<Option<Advisor>>;

    /// Read the stored credential bundle, if any
    async fn get_credentials(&self, advisor_id: Uuid) -> Result<Option<CredentialBundle>>;

    /// Replace the stored credential bundle wholesale
    async fn save_credentials(&self, advisor_id: Uuid, bundle: &CredentialBundle) -> Result<()>;

    /// Clear stored credentials (disconnect)
    async fn clear_credentials(&self, advisor_id: Uuid) -> Result<()>;
}

/// Trait for booking persistence
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Create a booking through the storage-side check-and-insert.
    ///
    /// The storage layer serializes creation per (advisor, interval) and
    /// returns `AdvisorlyError::SlotConflict` when the interval is already
    /// taken by an active booking.
    async fn create_booking(&self, params: NewBooking) -> Result<Uuid>;

    /// Load a booking by id
    async fn get_booking(&self, booking_id: Uuid) -> Result<Option<Booking>>;

    /// Active (non-cancelled) bookings for an advisor whose interval
    /// intersects `[from, to)`
    async fn active_bookings_in_range(
        &self,
        advisor_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Booking>>;

    /// Transition a booking to cancelled
    async fn mark_cancelled(&self, booking_id: Uuid) -> Result<()>;
}

/// Trait for company / session-template lookups
#[async_trait]
pub trait DirectoryRepository: Send + Sync {
    async fn get_company(&self, company_id: Uuid) -> Result<Option<CompanyRef>>;

    async fn get_session_template(&self, session_id: Uuid)
        -> Result<Option<SessionTemplateRef>>;
}

/// Trait for the calendar synchronization gateway
///
/// Implementations own credential refresh; every operation here resolves a
/// valid access token internally and maps provider failures into
/// [`GatewayError`].
#[async_trait]
pub trait CalendarGateway: Send + Sync {
    /// Remote events intersecting `[time_min, time_max)`, ordered by start,
    /// with recurring events pre-expanded by the provider
    async fn list_events(
        &self,
        advisor_id: Uuid,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> GatewayResult<Vec<RemoteCalendarEvent>>;

    /// Create a mirrored event; returns the remote event id
    async fn create_event(&self, advisor_id: Uuid, draft: EventDraft) -> GatewayResult<String>;

    /// Patch a mirrored event; only fields set on the patch are sent
    async fn update_event(
        &self,
        advisor_id: Uuid,
        event_id: &str,
        patch: EventPatch,
    ) -> GatewayResult<()>;

    /// Delete a mirrored event. An event already gone on the remote side
    /// counts as success (idempotent cancellation).
    async fn delete_event(&self, advisor_id: Uuid, event_id: &str) -> GatewayResult<()>;

    /// Connection status layered over credential validity
    async fn connection_status(&self, advisor_id: Uuid) -> CalendarConnectionStatus;
}
