//! Google OAuth client
//!
//! Authorization-URL construction, one-time code exchange, token refresh,
//! and revocation. Every authorization request asks for offline access and
//! forces re-consent so a refresh token is issued on every connect.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use reqwest::Method;
use thiserror::Error;
use tracing::debug;
use url::Url;

use advisorly_domain::{AdvisorlyError, GoogleConfig, Result};

use super::types::{GoogleTokenResponse, OAuthErrorBody};
use crate::http::HttpClient;

const GOOGLE_AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_REVOKE_ENDPOINT: &str = "https://oauth2.googleapis.com/revoke";

/// Scopes requested on every authorization: calendar read/write plus the
/// identity claims used to show which account is connected.
const SCOPES: [&str; 4] = [
    "https://www.googleapis.com/auth/calendar",
    "https://www.googleapis.com/auth/calendar.events",
    "openid",
    "email",
];

/// Failure modes of a refresh call, kept separate so the gateway can map
/// a revoked grant differently from a provider outage.
#[derive(Debug, Error)]
pub enum TokenRefreshError {
    /// The provider rejected the refresh token (revoked or expired grant)
    #[error("refresh grant rejected: {0}")]
    InvalidGrant(String),

    /// The token endpoint could not be reached
    #[error("token endpoint unreachable: {0}")]
    Network(String),

    /// Any other non-success answer from the token endpoint
    #[error("token refresh failed: {0}")]
    Other(String),
}

/// Client for Google's OAuth endpoints
#[derive(Clone)]
pub struct GoogleOAuthClient {
    http: HttpClient,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    auth_endpoint: String,
    token_endpoint: String,
    revoke_endpoint: String,
}

impl GoogleOAuthClient {
    /// Create a client against the production Google endpoints.
    pub fn new(config: &GoogleConfig, http: HttpClient) -> Self {
        Self {
            http,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
            auth_endpoint: GOOGLE_AUTH_ENDPOINT.to_string(),
            token_endpoint: GOOGLE_TOKEN_ENDPOINT.to_string(),
            revoke_endpoint: GOOGLE_REVOKE_ENDPOINT.to_string(),
        }
    }

    /// Override the token endpoint (tests).
    pub fn with_token_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.token_endpoint = endpoint.into();
        self
    }

    /// Override the revocation endpoint (tests).
    pub fn with_revoke_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.revoke_endpoint = endpoint.into();
        self
    }

    /// Deterministic authorization URL for the connect flow.
    ///
    /// `access_type=offline` plus `prompt=consent` guarantees a refresh
    /// token on every authorization, not only the first one.
    pub fn authorization_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.auth_endpoint)
            .map_err(|err| AdvisorlyError::Config(format!("invalid auth endpoint: {err}")))?;

        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", &SCOPES.join(" "))
            .append_pair("access_type", "offline")
            .append_pair("prompt", "consent");

        Ok(url)
    }

    /// Exchange a one-time authorization code for tokens.
    ///
    /// # Errors
    /// `AdvisorlyError::AuthExchange` carrying the provider's own error
    /// description (e.g. `invalid_grant` for an expired or reused code).
    pub async fn exchange_code(&self, code: &str) -> Result<GoogleTokenResponse> {
        debug!("exchanging authorization code");

        let request = self.http.request(Method::POST, &self.token_endpoint).form(&[
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", self.redirect_uri.as_str()),
        ]);

        let response = self
            .http
            .send(request)
            .await
            .map_err(|err| AdvisorlyError::AuthExchange(format!("token endpoint unreachable: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AdvisorlyError::AuthExchange(format!(
                "({status}) {}",
                parse_oauth_error(&body)
            )));
        }

        response.json::<GoogleTokenResponse>().await.map_err(|err| {
            AdvisorlyError::AuthExchange(format!("unparseable token response: {err}"))
        })
    }

    /// Obtain a fresh access token from a refresh token.
    pub async fn refresh_token(
        &self,
        refresh_token: &str,
    ) -> std::result::Result<GoogleTokenResponse, TokenRefreshError> {
        debug!("refreshing access token");

        let request = self.http.request(Method::POST, &self.token_endpoint).form(&[
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ]);

        let response = self
            .http
            .send(request)
            .await
            .map_err(|err| TokenRefreshError::Network(err.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let message = parse_oauth_error(&body);
            return if message.starts_with("invalid_grant") {
                Err(TokenRefreshError::InvalidGrant(message))
            } else {
                Err(TokenRefreshError::Other(format!("({status}) {message}")))
            };
        }

        response
            .json::<GoogleTokenResponse>()
            .await
            .map_err(|err| TokenRefreshError::Other(format!("unparseable token response: {err}")))
    }

    /// Best-effort token revocation.
    pub async fn revoke_token(&self, token: &str) -> Result<()> {
        let request = self
            .http
            .request(Method::POST, &self.revoke_endpoint)
            .query(&[("token", token)]);

        let response = self.http.send(request).await?;
        if !response.status().is_success() {
            let status = response.status();
            return Err(AdvisorlyError::Network(format!("revocation failed with {status}")));
        }
        Ok(())
    }
}

/// Render a token-endpoint error body into `error: description` form,
/// falling back to the raw body for non-JSON answers.
fn parse_oauth_error(body: &str) -> String {
    match serde_json::from_str::<OAuthErrorBody>(body) {
        Ok(parsed) => parsed.message(),
        Err(_) if body.trim().is_empty() => "no error details provided".to_string(),
        Err(_) => body.trim().to_string(),
    }
}

/// Extract the email claim from an OpenID Connect ID token.
///
/// The signature is not verified; the token comes straight from the token
/// endpoint over TLS and is only used for display.
pub fn extract_email_from_id_token(id_token: &str) -> Result<String> {
    let parts: Vec<&str> = id_token.split('.').collect();
    if parts.len() != 3 {
        return Err(AdvisorlyError::InvalidInput("invalid ID token format".into()));
    }

    let payload_bytes = URL_SAFE_NO_PAD.decode(parts[1]).map_err(|err| {
        AdvisorlyError::InvalidInput(format!("failed to decode ID token payload: {err}"))
    })?;
    let payload: serde_json::Value = serde_json::from_slice(&payload_bytes).map_err(|err| {
        AdvisorlyError::InvalidInput(format!("failed to parse ID token payload: {err}"))
    })?;

    payload
        .get("email")
        .and_then(|value| value.as_str())
        .map(str::to_string)
        .ok_or_else(|| AdvisorlyError::InvalidInput("email claim missing from ID token".into()))
}
