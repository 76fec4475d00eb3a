//! Google Calendar API clients
//!
//! Low-level OAuth and events clients. Credential lifecycle and failure
//! mapping live one level up in the calendar gateway.

pub mod events;
pub mod oauth;
pub mod types;

pub use events::GoogleEventsClient;
pub use oauth::{GoogleOAuthClient, TokenRefreshError};
