//! API error mapping

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use advisorly_domain::AdvisorlyError;

/// Wrapper mapping domain errors onto HTTP responses
#[derive(Debug)]
pub struct ApiError(pub AdvisorlyError);

impl From<AdvisorlyError> for ApiError {
    fn from(err: AdvisorlyError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            AdvisorlyError::NotFound(_) => StatusCode::NOT_FOUND,
            AdvisorlyError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AdvisorlyError::SlotConflict(_) => StatusCode::CONFLICT,
            AdvisorlyError::Auth(_) => StatusCode::UNAUTHORIZED,
            AdvisorlyError::AuthExchange(_) | AdvisorlyError::Network(_) => {
                StatusCode::BAD_GATEWAY
            }
            AdvisorlyError::Config(_)
            | AdvisorlyError::Storage(_)
            | AdvisorlyError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(self.0)).into_response()
    }
}
