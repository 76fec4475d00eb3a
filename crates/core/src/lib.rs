//! # Advisorly Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - The availability calculator (working-day slot grid + busy-interval
//!   merging)
//! - Booking lifecycle orchestration (create/cancel with best-effort
//!   calendar mirroring)
//! - Port/adapter interfaces (traits) implemented by `advisorly-infra`
//!
//! ## Architecture Principles
//! - Only depends on `advisorly-domain`
//! - No database, HTTP, or provider code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod booking;
pub mod scheduling;

// Re-export specific items to avoid ambiguity
pub use booking::{BookingRequest, BookingService};
pub use scheduling::ports::{
    AdvisorRepository, BookingRepository, CalendarGateway, DirectoryRepository, EventAttendee,
    EventDraft, EventPatch, GatewayError, GatewayResult,
};
pub use scheduling::{AvailabilityService, WorkdayGrid};
