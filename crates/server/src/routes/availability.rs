//! Availability endpoint

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use advisorly_domain::AvailabilityDay;

use crate::context::AppContext;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    /// Calendar date, `YYYY-MM-DD`; the time-of-day component is not accepted
    pub date: NaiveDate,
}

/// Slot sequence for an advisor and date. Unavailable slots are included;
/// presentation-side filtering (past slots, weekends) is the caller's
/// concern.
pub async fn get_availability(
    State(context): State<Arc<AppContext>>,
    Path(advisor_id): Path<Uuid>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityDay>, ApiError> {
    let day = context.availability.compute_availability(advisor_id, query.date).await?;
    Ok(Json(day))
}
