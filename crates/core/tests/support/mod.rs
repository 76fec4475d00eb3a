//! Shared in-memory mocks for core integration tests.

pub mod gateway;
pub mod repositories;

pub use gateway::{ListBehavior, MockCalendarGateway};
pub use repositories::{MockAdvisorRepository, MockBookingRepository, MockDirectoryRepository};

use advisorly_domain::Advisor;
use uuid::Uuid;

/// Test advisor without a calendar connection.
pub fn advisor(id: Uuid) -> Advisor {
    Advisor {
        id,
        name: "Dana Reyes".to_string(),
        email: "dana.reyes@example.com".to_string(),
        specialty: Some("go-to-market".to_string()),
        is_available: true,
        calendar_email: None,
        credentials: None,
    }
}
