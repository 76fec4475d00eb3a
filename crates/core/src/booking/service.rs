//! Booking lifecycle orchestration - core business logic
//!
//! Owns the call order around booking creation and cancellation: slot
//! re-validation, best-effort calendar mirroring, then persistence. The
//! booking flow is never blocked by calendar-mirroring failures.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use advisorly_domain::constants::BOOKING_EVENT_COLOR_ID;
use advisorly_domain::{AdvisorlyError, Advisor, BookingStatus, NewBooking, Result};

use crate::scheduling::ports::{
    AdvisorRepository, BookingRepository, CalendarGateway, DirectoryRepository, EventAttendee,
    EventDraft,
};
use crate::scheduling::AvailabilityService;

/// Parameters for creating a booking
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub company_id: Uuid,
    pub advisor_id: Uuid,
    pub session_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub created_by: Uuid,
    pub notify_attendees: bool,
}

/// Booking creation/cancellation service
pub struct BookingService {
    advisors: Arc<dyn AdvisorRepository>,
    bookings: Arc<dyn BookingRepository>,
    directory: Arc<dyn DirectoryRepository>,
    calendar: Arc<dyn CalendarGateway>,
    availability: Arc<AvailabilityService>,
}

impl BookingService {
    /// Create a new booking service
    pub fn new(
        advisors: Arc<dyn AdvisorRepository>,
        bookings: Arc<dyn BookingRepository>,
        directory: Arc<dyn DirectoryRepository>,
        calendar: Arc<dyn CalendarGateway>,
        availability: Arc<AvailabilityService>,
    ) -> Self {
        Self { advisors, bookings, directory, calendar, availability }
    }

    /// Create a booking for a grid slot.
    ///
    /// Call order: re-validate the slot against freshly computed
    /// availability, mirror the event into the advisor's calendar (best
    /// effort), persist the booking with whatever event id resulted. A
    /// storage-side `SlotConflict` gets one retry against recomputed
    /// availability before propagating.
    pub async fn create_booking(&self, request: BookingRequest) -> Result<Uuid> {
        let advisor = self
            .advisors
            .get_advisor(request.advisor_id)
            .await?
            .ok_or_else(|| AdvisorlyError::NotFound(format!("advisor {}", request.advisor_id)))?;

        self.ensure_slot_free(&request).await?;

        let event_id = self.mirror_event(&advisor, &request).await;

        let params = NewBooking {
            company_id: request.company_id,
            advisor_id: request.advisor_id,
            session_id: request.session_id,
            start_time: request.start_time,
            end_time: request.end_time,
            calendar_event_id: event_id.clone(),
            created_by: request.created_by,
        };

        match self.bookings.create_booking(params.clone()).await {
            Ok(booking_id) => {
                info!(%booking_id, advisor_id = %request.advisor_id, "booking created");
                Ok(booking_id)
            }
            Err(AdvisorlyError::SlotConflict(reason)) => {
                debug!(advisor_id = %request.advisor_id, %reason, "slot conflict; revalidating");
                self.retry_after_conflict(&request, params, event_id).await
            }
            Err(err) => {
                self.discard_orphan_event(request.advisor_id, event_id.as_deref()).await;
                Err(err)
            }
        }
    }

    /// Cancel a booking.
    ///
    /// The mirrored calendar event is removed best-effort; the booking is
    /// marked cancelled regardless of the calendar outcome.
    pub async fn cancel_booking(&self, booking_id: Uuid) -> Result<()> {
        let booking = self
            .bookings
            .get_booking(booking_id)
            .await?
            .ok_or_else(|| AdvisorlyError::NotFound(format!("booking {booking_id}")))?;

        if booking.status == BookingStatus::Cancelled {
            debug!(%booking_id, "booking already cancelled");
            return Ok(());
        }

        if let Some(event_id) = booking.calendar_event_id.as_deref() {
            if let Err(err) = self.calendar.delete_event(booking.advisor_id, event_id).await {
                warn!(
                    %booking_id,
                    advisor_id = %booking.advisor_id,
                    error = %err,
                    "failed to remove mirrored calendar event; cancelling booking anyway"
                );
            }
        }

        self.bookings.mark_cancelled(booking_id).await?;
        info!(%booking_id, "booking cancelled");
        Ok(())
    }

    /// Reject the request unless it matches a currently-available grid slot.
    async fn ensure_slot_free(&self, request: &BookingRequest) -> Result<()> {
        let date = self.availability.grid().local_date(request.start_time);
        let day = self.availability.compute_availability(request.advisor_id, date).await?;

        let slot = day
            .slots
            .iter()
            .find(|slot| slot.start == request.start_time && slot.end == request.end_time)
            .ok_or_else(|| {
                AdvisorlyError::InvalidInput(format!(
                    "requested interval {}..{} is not on the slot grid",
                    request.start_time, request.end_time
                ))
            })?;

        if !slot.available {
            return Err(AdvisorlyError::SlotConflict(format!(
                "slot {} is no longer available",
                request.start_time
            )));
        }
        Ok(())
    }

    /// One retry after a storage-side conflict, against freshly recomputed
    /// availability.
    async fn retry_after_conflict(
        &self,
        request: &BookingRequest,
        params: NewBooking,
        event_id: Option<String>,
    ) -> Result<Uuid> {
        let revalidation = self.ensure_slot_free(request).await;
        let outcome = match revalidation {
            Ok(()) => self.bookings.create_booking(params).await,
            Err(err) => Err(err),
        };

        if outcome.is_err() {
            self.discard_orphan_event(request.advisor_id, event_id.as_deref()).await;
        }
        outcome
    }

    /// Mirror the booking into the advisor's calendar; any gateway failure
    /// degrades to "no event" and the booking proceeds.
    async fn mirror_event(&self, advisor: &Advisor, request: &BookingRequest) -> Option<String> {
        let draft = match self.compose_event(advisor, request).await {
            Ok(draft) => draft,
            Err(err) => {
                warn!(
                    advisor_id = %request.advisor_id,
                    error = %err,
                    "could not compose calendar event; booking proceeds without mirroring"
                );
                return None;
            }
        };

        match self.calendar.create_event(request.advisor_id, draft).await {
            Ok(event_id) => Some(event_id),
            Err(err) => {
                warn!(
                    advisor_id = %request.advisor_id,
                    error = %err,
                    "calendar mirroring degraded; booking proceeds without remote event"
                );
                None
            }
        }
    }

    /// Compose the mirrored event from company + session lookups, fetched
    /// concurrently.
    async fn compose_event(
        &self,
        advisor: &Advisor,
        request: &BookingRequest,
    ) -> Result<EventDraft> {
        let (company, session) = tokio::try_join!(
            self.directory.get_company(request.company_id),
            self.directory.get_session_template(request.session_id),
        )?;

        let company_name =
            company.map_or_else(|| "client".to_string(), |company_ref| company_ref.name);
        let session_title =
            session.map_or_else(|| "Advisory session".to_string(), |template| template.title);

        Ok(EventDraft {
            summary: format!("{session_title} - {company_name}"),
            description: Some(format!(
                "Advisory session with {company_name}, led by {}.",
                advisor.name
            )),
            start: request.start_time,
            end: request.end_time,
            attendees: vec![EventAttendee {
                email: advisor.email.clone(),
                display_name: Some(advisor.name.clone()),
            }],
            color_id: Some(BOOKING_EVENT_COLOR_ID.to_string()),
            notify_attendees: request.notify_attendees,
        })
    }

    /// Remove an event that was created for a booking that never persisted.
    async fn discard_orphan_event(&self, advisor_id: Uuid, event_id: Option<&str>) {
        let Some(event_id) = event_id else { return };
        if let Err(err) = self.calendar.delete_event(advisor_id, event_id).await {
            warn!(
                %advisor_id,
                event_id,
                error = %err,
                "failed to discard orphaned calendar event"
            );
        }
    }
}
