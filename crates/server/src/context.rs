//! Application context wiring
//!
//! Builds the repositories, gateway, and services once at startup and shares
//! them behind an `Arc` with every request handler.

use std::sync::Arc;

use chrono_tz::Tz;

use advisorly_core::{
    AdvisorRepository, AvailabilityService, BookingRepository, BookingService, CalendarGateway,
    DirectoryRepository, WorkdayGrid,
};
use advisorly_domain::{AdvisorlyError, Config, Result};
use advisorly_infra::storage::{
    SupabaseAdvisorRepository, SupabaseBookingRepository, SupabaseClient, SupabaseClientConfig,
    SupabaseDirectoryRepository,
};
use advisorly_infra::{CalendarSyncGateway, GoogleEventsClient, GoogleOAuthClient, HttpClient};

/// Shared application state
pub struct AppContext {
    pub config: Config,
    pub gateway: Arc<CalendarSyncGateway>,
    pub availability: Arc<AvailabilityService>,
    pub bookings: Arc<BookingService>,
}

/// Wire repositories, gateway, and services from configuration.
pub fn build_context(config: Config) -> Result<Arc<AppContext>> {
    let time_zone: Tz = config.google.time_zone.parse().map_err(|_| {
        AdvisorlyError::Config(format!("unknown time zone: {}", config.google.time_zone))
    })?;

    let supabase = SupabaseClient::new(SupabaseClientConfig::from_storage(&config.storage))?;
    let advisors: Arc<dyn AdvisorRepository> =
        Arc::new(SupabaseAdvisorRepository::new(supabase.clone()));
    let bookings_repo: Arc<dyn BookingRepository> =
        Arc::new(SupabaseBookingRepository::new(supabase.clone()));
    let directory: Arc<dyn DirectoryRepository> =
        Arc::new(SupabaseDirectoryRepository::new(supabase));

    let http = HttpClient::new()?;
    let oauth = GoogleOAuthClient::new(&config.google, http.clone());
    let events = GoogleEventsClient::new(http, time_zone);
    let gateway = Arc::new(CalendarSyncGateway::new(advisors.clone(), oauth, events));
    let gateway_port: Arc<dyn CalendarGateway> = gateway.clone();

    let grid = WorkdayGrid::new(&config.booking, &config.google.time_zone)?;
    let availability = Arc::new(AvailabilityService::new(
        advisors.clone(),
        bookings_repo.clone(),
        gateway_port.clone(),
        grid,
    ));

    let bookings = Arc::new(BookingService::new(
        advisors,
        bookings_repo,
        directory,
        gateway_port,
        availability.clone(),
    ));

    Ok(Arc::new(AppContext { config, gateway, availability, bookings }))
}
