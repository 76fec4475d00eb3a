//! Calendar credential bundle
//!
//! Strongly-typed, versioned representation of an advisor's external-calendar
//! tokens. Persisted as a JSON column on the advisor row and decoded exactly
//! once at the storage boundary.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::CREDENTIAL_SCHEMA_VERSION;

/// OAuth access and refresh tokens with metadata for one advisor
///
/// Invariants:
/// - `expires_at` is an absolute instant computed at persist time from the
///   provider's `expires_in`.
/// - The bundle is replaced wholesale on reconnection or refresh and cleared
///   entirely on disconnection; fields are never patched individually.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialBundle {
    /// Payload version, bumped on incompatible shape changes
    pub schema_version: u32,

    /// Bearer token for calendar API requests
    pub access_token: String,

    /// Refresh token; absent when the provider did not issue one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Token type (always "Bearer" in practice)
    pub token_type: String,

    /// Granted scopes, space-separated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// Absolute expiration instant (UTC)
    pub expires_at: DateTime<Utc>,

    /// Email of the connected external account, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_email: Option<String>,

    /// Last time the bundle was written (connect or refresh)
    pub updated_at: DateTime<Utc>,
}

impl CredentialBundle {
    /// Build a bundle from a token-endpoint response, anchoring expiry to
    /// `now + expires_in`.
    pub fn from_token_fields(
        access_token: String,
        refresh_token: Option<String>,
        token_type: String,
        scope: Option<String>,
        expires_in: i64,
        account_email: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            schema_version: CREDENTIAL_SCHEMA_VERSION,
            access_token,
            refresh_token,
            token_type,
            scope,
            expires_at: now + Duration::seconds(expires_in),
            account_email,
            updated_at: now,
        }
    }

    /// Replace the access token and expiry after a refresh, carrying the
    /// refresh token, scope, and account email over unchanged.
    pub fn refreshed(&self, access_token: String, expires_in: i64) -> Self {
        let now = Utc::now();
        Self {
            schema_version: CREDENTIAL_SCHEMA_VERSION,
            access_token,
            refresh_token: self.refresh_token.clone(),
            token_type: self.token_type.clone(),
            scope: self.scope.clone(),
            expires_at: now + Duration::seconds(expires_in),
            account_email: self.account_email.clone(),
            updated_at: now,
        }
    }

    /// Whether the access token is expired or expires within `margin_secs`.
    ///
    /// The margin guards against clock skew between this service and the
    /// provider: a token with less than the margin remaining is treated as
    /// already expired.
    #[must_use]
    pub fn is_expired(&self, margin_secs: i64) -> bool {
        Utc::now() + Duration::seconds(margin_secs) >= self.expires_at
    }
}
