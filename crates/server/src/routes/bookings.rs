//! Booking endpoints

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use advisorly_core::BookingRequest;

use crate::context::AppContext;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingBody {
    pub company_id: Uuid,
    pub advisor_id: Uuid,
    pub session_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub created_by: Uuid,
    #[serde(default)]
    pub notify_attendees: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingResponse {
    pub booking_id: Uuid,
}

/// Create a booking for a free slot.
pub async fn create_booking(
    State(context): State<Arc<AppContext>>,
    Json(body): Json<CreateBookingBody>,
) -> Result<(StatusCode, Json<CreateBookingResponse>), ApiError> {
    let booking_id = context
        .bookings
        .create_booking(BookingRequest {
            company_id: body.company_id,
            advisor_id: body.advisor_id,
            session_id: body.session_id,
            start_time: body.start_time,
            end_time: body.end_time,
            created_by: body.created_by,
            notify_attendees: body.notify_attendees,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(CreateBookingResponse { booking_id })))
}

/// Cancel a booking. Succeeds regardless of calendar-mirroring state.
pub async fn cancel_booking(
    State(context): State<Arc<AppContext>>,
    Path(booking_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    context.bookings.cancel_booking(booking_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
