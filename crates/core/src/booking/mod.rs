//! Booking lifecycle orchestration

pub mod service;

pub use service::{BookingRequest, BookingService};
