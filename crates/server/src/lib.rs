//! # Advisorly Server
//!
//! Thin HTTP surface over the booking and calendar services: availability
//! queries, booking creation/cancellation, calendar connection management,
//! and the OAuth code-exchange proxy.

pub mod context;
pub mod error;
pub mod routes;

pub use context::{build_context, AppContext};
pub use routes::router;
