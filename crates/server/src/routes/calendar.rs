//! Calendar connection endpoints

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};
use uuid::Uuid;

use advisorly_core::CalendarGateway;
use advisorly_domain::{AdvisorlyError, CalendarConnectionStatus};

use crate::context::AppContext;
use crate::error::ApiError;

/// Connection status for an advisor's external calendar.
pub async fn connection_status(
    State(context): State<Arc<AppContext>>,
    Path(advisor_id): Path<Uuid>,
) -> Json<CalendarConnectionStatus> {
    Json(context.gateway.connection_status(advisor_id).await)
}

/// Disconnect an advisor's calendar: best-effort remote revocation, then
/// local credential clearing.
pub async fn disconnect(
    State(context): State<Arc<AppContext>>,
    Path(advisor_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    context
        .gateway
        .revoke_access(advisor_id)
        .await
        .map_err(|err| ApiError(AdvisorlyError::Storage(err.to_string())))?;
    Ok(Json(json!({ "disconnected": true })))
}

/// Authorization URL for the connect flow.
pub async fn authorize_url(
    State(context): State<Arc<AppContext>>,
) -> Result<Json<Value>, ApiError> {
    let url = context.gateway.authorization_url()?;
    Ok(Json(json!({ "url": url.as_str() })))
}
