//! Availability calculation

pub mod ports;
pub mod service;

pub use service::{AvailabilityService, WorkdayGrid};
