//! Booking repository over the hosted backend
//!
//! Creation goes through the `create_advisory_booking` procedure, which
//! performs a transactional check-and-insert keyed on (advisor, interval).
//! Conflict responses map to `AdvisorlyError::SlotConflict` so the
//! orchestration layer can retry against recomputed availability.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use advisorly_core::BookingRepository;
use advisorly_domain::{AdvisorlyError, Booking, BookingStatus, NewBooking, Result};

use super::supabase::{is_conflict_error, parse_postgrest_error, scalar_from_rpc, SupabaseClient};

const BOOKINGS_TABLE: &str = "bookings";
const CREATE_BOOKING_RPC: &str = "create_advisory_booking";

#[derive(Debug, Deserialize)]
struct BookingRow {
    id: Uuid,
    company_id: Uuid,
    advisor_id: Uuid,
    session_id: Uuid,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    calendar_event_id: Option<String>,
    status: BookingStatus,
    created_by: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct StatusPatch {
    status: BookingStatus,
}

impl From<BookingRow> for Booking {
    fn from(row: BookingRow) -> Self {
        Booking {
            id: row.id,
            company_id: row.company_id,
            advisor_id: row.advisor_id,
            session_id: row.session_id,
            start_time: row.start_time,
            end_time: row.end_time,
            calendar_event_id: row.calendar_event_id,
            status: row.status,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Booking repository backed by the hosted backend
#[derive(Clone)]
pub struct SupabaseBookingRepository {
    client: SupabaseClient,
}

impl SupabaseBookingRepository {
    /// Create a new repository
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BookingRepository for SupabaseBookingRepository {
    async fn create_booking(&self, params: NewBooking) -> Result<Uuid> {
        let body = json!({
            "p_company_id": params.company_id,
            "p_advisor_id": params.advisor_id,
            "p_session_id": params.session_id,
            "p_start_time": params.start_time.to_rfc3339(),
            "p_end_time": params.end_time.to_rfc3339(),
            "p_calendar_event_id": params.calendar_event_id,
            "p_created_by": params.created_by,
        });

        let response = self.client.rpc(CREATE_BOOKING_RPC, &body).await?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let error = parse_postgrest_error(&text);

            if status == reqwest::StatusCode::CONFLICT || is_conflict_error(&error) {
                return Err(AdvisorlyError::SlotConflict(
                    error.message.unwrap_or_else(|| "booking interval already taken".to_string()),
                ));
            }
            return Err(AdvisorlyError::Storage(format!(
                "booking creation failed ({status}): {text}"
            )));
        }

        let value: serde_json::Value = response.json().await.map_err(|err| {
            AdvisorlyError::Storage(format!("unparseable booking RPC response: {err}"))
        })?;

        scalar_from_rpc(value)
            .and_then(|scalar| scalar.as_str().map(str::to_string))
            .and_then(|id| id.parse::<Uuid>().ok())
            .ok_or_else(|| {
                AdvisorlyError::Storage("booking RPC did not return a booking id".to_string())
            })
    }

    async fn get_booking(&self, booking_id: Uuid) -> Result<Option<Booking>> {
        let rows: Vec<BookingRow> = self
            .client
            .select(
                BOOKINGS_TABLE,
                &[("id", format!("eq.{booking_id}")), ("limit", "1".to_string())],
            )
            .await?;
        Ok(rows.into_iter().next().map(Booking::from))
    }

    async fn active_bookings_in_range(
        &self,
        advisor_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Booking>> {
        // Interval overlap: starts before the window ends, ends after it
        // starts
        let rows: Vec<BookingRow> = self
            .client
            .select(
                BOOKINGS_TABLE,
                &[
                    ("advisor_id", format!("eq.{advisor_id}")),
                    ("status", "neq.cancelled".to_string()),
                    ("start_time", format!("lt.{}", to.to_rfc3339())),
                    ("end_time", format!("gt.{}", from.to_rfc3339())),
                    ("order", "start_time.asc".to_string()),
                ],
            )
            .await?;
        Ok(rows.into_iter().map(Booking::from).collect())
    }

    async fn mark_cancelled(&self, booking_id: Uuid) -> Result<()> {
        self.client
            .patch(
                BOOKINGS_TABLE,
                &[("id", format!("eq.{booking_id}"))],
                &StatusPatch { status: BookingStatus::Cancelled },
            )
            .await
    }
}
