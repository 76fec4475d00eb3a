//! # Advisorly Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - Hosted-backend (REST/RPC) repositories for advisors, bookings, and
//!   directory lookups
//! - Google Calendar OAuth and events clients
//! - The calendar synchronization gateway (token refresh + event CRUD)
//! - Shared HTTP client and configuration loading
//!
//! ## Architecture
//! - Implements traits defined in `advisorly-core`
//! - Depends on `advisorly-domain` and `advisorly-core`
//! - Contains all "impure" code (I/O, provider APIs)

pub mod config;
pub mod errors;
pub mod http;
pub mod integrations;
pub mod storage;

// Re-export commonly used items
pub use errors::InfraError;
pub use http::HttpClient;
pub use integrations::calendar::CalendarSyncGateway;
pub use integrations::google::{GoogleEventsClient, GoogleOAuthClient};
pub use storage::{
    SupabaseAdvisorRepository, SupabaseBookingRepository, SupabaseClient,
    SupabaseDirectoryRepository,
};
