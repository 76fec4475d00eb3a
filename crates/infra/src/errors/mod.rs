//! Conversions from external infrastructure errors into domain errors.

use advisorly_domain::AdvisorlyError;
use reqwest::Error as HttpError;
use serde_json::Error as JsonError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub AdvisorlyError);

impl From<InfraError> for AdvisorlyError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<AdvisorlyError> for InfraError {
    fn from(value: AdvisorlyError) -> Self {
        InfraError(value)
    }
}

impl From<HttpError> for InfraError {
    fn from(err: HttpError) -> Self {
        let message = if err.is_timeout() {
            format!("request timed out: {err}")
        } else if err.is_connect() {
            format!("connection failed: {err}")
        } else if let Some(status) = err.status() {
            format!("request failed with status {status}: {err}")
        } else {
            format!("request failed: {err}")
        };
        InfraError(AdvisorlyError::Network(message))
    }
}

impl From<JsonError> for InfraError {
    fn from(err: JsonError) -> Self {
        InfraError(AdvisorlyError::InvalidInput(format!("invalid JSON payload: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_errors_map_to_invalid_input() {
        let err = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let infra: InfraError = err.into();
        assert!(matches!(infra.0, AdvisorlyError::InvalidInput(_)));
    }

    #[test]
    fn round_trip_preserves_the_domain_error() {
        let original = AdvisorlyError::Storage("row missing".to_string());
        let infra: InfraError = original.into();
        let back: AdvisorlyError = infra.into();
        assert!(matches!(back, AdvisorlyError::Storage(_)));
    }
}
