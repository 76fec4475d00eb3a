use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use advisorly_core::{AdvisorRepository, BookingRepository, DirectoryRepository};
use advisorly_domain::{
    Advisor, AdvisorlyError, Booking, BookingStatus, CompanyRef, CredentialBundle, NewBooking,
    Result, SessionTemplateRef,
};

/// In-memory mock for `AdvisorRepository`.
#[derive(Default, Clone)]
pub struct MockAdvisorRepository {
    advisors: Arc<Mutex<HashMap<Uuid, Advisor>>>,
}

impl MockAdvisorRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_advisor(self, advisor: Advisor) -> Self {
        self.advisors.lock().unwrap().insert(advisor.id, advisor);
        self
    }
}

#[async_trait]
impl AdvisorRepository for MockAdvisorRepository {
    async fn get_advisor(&self, advisor_id: Uuid) -> Result<Option<Advisor>> {
        Ok(self.advisors.lock().unwrap().get(&advisor_id).cloned())
    }

    async fn get_credentials(&self, advisor_id: Uuid) -> Result<Option<CredentialBundle>> {
        Ok(self
            .advisors
            .lock()
            .unwrap()
            .get(&advisor_id)
            .and_then(|advisor| advisor.credentials.clone()))
    }

    async fn save_credentials(&self, advisor_id: Uuid, bundle: &CredentialBundle) -> Result<()> {
        let mut advisors = self.advisors.lock().unwrap();
        let advisor = advisors
            .get_mut(&advisor_id)
            .ok_or_else(|| AdvisorlyError::NotFound(format!("advisor {advisor_id}")))?;
        advisor.credentials = Some(bundle.clone());
        Ok(())
    }

    async fn clear_credentials(&self, advisor_id: Uuid) -> Result<()> {
        let mut advisors = self.advisors.lock().unwrap();
        if let Some(advisor) = advisors.get_mut(&advisor_id) {
            advisor.credentials = None;
            advisor.calendar_email = None;
        }
        Ok(())
    }
}

/// In-memory mock for `BookingRepository`.
///
/// Mirrors the storage-side check-and-insert: creation fails with
/// `SlotConflict` when the interval overlaps an active booking for the same
/// advisor. `with_forced_conflicts` makes the next N create calls conflict
/// unconditionally, for exercising the retry path.
#[derive(Default, Clone)]
pub struct MockBookingRepository {
    bookings: Arc<Mutex<Vec<Booking>>>,
    forced_conflicts: Arc<AtomicUsize>,
}

impl MockBookingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_booking(self, booking: Booking) -> Self {
        self.bookings.lock().unwrap().push(booking);
        self
    }

    pub fn with_forced_conflicts(self, count: usize) -> Self {
        self.forced_conflicts.store(count, Ordering::SeqCst);
        self
    }

    pub fn bookings(&self) -> Vec<Booking> {
        self.bookings.lock().unwrap().clone()
    }
}

/// Booking row builder for seeding mocks.
pub fn booking(
    advisor_id: Uuid,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    status: BookingStatus,
) -> Booking {
    Booking {
        id: Uuid::new_v4(),
        company_id: Uuid::new_v4(),
        advisor_id,
        session_id: Uuid::new_v4(),
        start_time,
        end_time,
        calendar_event_id: None,
        status,
        created_by: Uuid::new_v4(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[async_trait]
impl BookingRepository for MockBookingRepository {
    async fn create_booking(&self, params: NewBooking) -> Result<Uuid> {
        if self
            .forced_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(AdvisorlyError::SlotConflict("forced conflict".to_string()));
        }

        let mut bookings = self.bookings.lock().unwrap();
        let taken = bookings.iter().any(|existing| {
            existing.advisor_id == params.advisor_id
                && existing.is_active()
                && existing.start_time < params.end_time
                && params.start_time < existing.end_time
        });
        if taken {
            return Err(AdvisorlyError::SlotConflict(format!(
                "interval {}..{} already booked",
                params.start_time, params.end_time
            )));
        }

        let id = Uuid::new_v4();
        bookings.push(Booking {
            id,
            company_id: params.company_id,
            advisor_id: params.advisor_id,
            session_id: params.session_id,
            start_time: params.start_time,
            end_time: params.end_time,
            calendar_event_id: params.calendar_event_id,
            status: BookingStatus::Scheduled,
            created_by: params.created_by,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        });
        Ok(id)
    }

    async fn get_booking(&self, booking_id: Uuid) -> Result<Option<Booking>> {
        Ok(self.bookings.lock().unwrap().iter().find(|b| b.id == booking_id).cloned())
    }

    async fn active_bookings_in_range(
        &self,
        advisor_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Booking>> {
        Ok(self
            .bookings
            .lock()
            .unwrap()
            .iter()
            .filter(|b| {
                b.advisor_id == advisor_id
                    && b.is_active()
                    && b.start_time < to
                    && from < b.end_time
            })
            .cloned()
            .collect())
    }

    async fn mark_cancelled(&self, booking_id: Uuid) -> Result<()> {
        let mut bookings = self.bookings.lock().unwrap();
        let booking = bookings
            .iter_mut()
            .find(|b| b.id == booking_id)
            .ok_or_else(|| AdvisorlyError::NotFound(format!("booking {booking_id}")))?;
        booking.status = BookingStatus::Cancelled;
        booking.updated_at = Utc::now();
        Ok(())
    }
}

/// In-memory mock for `DirectoryRepository`.
#[derive(Default, Clone)]
pub struct MockDirectoryRepository {
    companies: Arc<Mutex<HashMap<Uuid, CompanyRef>>>,
    sessions: Arc<Mutex<HashMap<Uuid, SessionTemplateRef>>>,
}

impl MockDirectoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_company(self, company: CompanyRef) -> Self {
        self.companies.lock().unwrap().insert(company.id, company);
        self
    }

    pub fn with_session(self, session: SessionTemplateRef) -> Self {
        self.sessions.lock().unwrap().insert(session.id, session);
        self
    }
}

#[async_trait]
impl DirectoryRepository for MockDirectoryRepository {
    async fn get_company(&self, company_id: Uuid) -> Result<Option<CompanyRef>> {
        Ok(self.companies.lock().unwrap().get(&company_id).cloned())
    }

    async fn get_session_template(
        &self,
        session_id: Uuid,
    ) -> Result<Option<SessionTemplateRef>> {
        Ok(self.sessions.lock().unwrap().get(&session_id).cloned())
    }
}
