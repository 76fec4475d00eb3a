//! HTTP routes

pub mod availability;
pub mod bookings;
pub mod calendar;
pub mod health;
pub mod oauth;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::context::AppContext;

/// Build the application router.
pub fn router(context: Arc<AppContext>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/advisors/{id}/availability", get(availability::get_availability))
        .route("/bookings", post(bookings::create_booking))
        .route("/bookings/{id}/cancel", post(bookings::cancel_booking))
        .route("/advisors/{id}/calendar/status", get(calendar::connection_status))
        .route("/advisors/{id}/calendar/disconnect", post(calendar::disconnect))
        .route("/calendar/authorize-url", get(calendar::authorize_url))
        .route("/oauth/exchange", post(oauth::exchange))
        .with_state(context)
}
