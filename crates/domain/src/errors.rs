//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Advisorly
#[derive(Error, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum AdvisorlyError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Authorization exchange failed: {0}")]
    AuthExchange(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Slot conflict: {0}")]
    SlotConflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for Advisorly operations
pub type Result<T> = std::result::Result<T, AdvisorlyError>;
