//! Calendar synchronization gateway
//!
//! Owns advisor calendar credentials end to end: code exchange, persistence,
//! transparent refresh, and event CRUD mirroring booking transitions. All
//! token retrieval funnels through [`CalendarSyncGateway::get_valid_access_token`];
//! callers treat its errors as "advisor not connected", never as fatal.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use advisorly_core::{
    AdvisorRepository, CalendarGateway, EventDraft, EventPatch, GatewayError, GatewayResult,
};
use advisorly_domain::constants::TOKEN_REFRESH_MARGIN_SECS;
use advisorly_domain::{
    CalendarConnectionStatus, CredentialBundle, RemoteCalendarEvent, Result,
};

use super::super::google::oauth::extract_email_from_id_token;
use super::super::google::types::GoogleTokenResponse;
use super::super::google::{GoogleEventsClient, GoogleOAuthClient, TokenRefreshError};

/// Gateway between booking workflows and advisors' Google calendars
pub struct CalendarSyncGateway {
    advisors: Arc<dyn AdvisorRepository>,
    oauth: GoogleOAuthClient,
    events: GoogleEventsClient,
    /// Per-advisor refresh locks: concurrent callers needing a refresh for
    /// the same advisor collapse into one outbound call.
    refresh_locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl CalendarSyncGateway {
    /// Create a new gateway
    pub fn new(
        advisors: Arc<dyn AdvisorRepository>,
        oauth: GoogleOAuthClient,
        events: GoogleEventsClient,
    ) -> Self {
        Self { advisors, oauth, events, refresh_locks: DashMap::new() }
    }

    /// Authorization URL for the connect flow (pure construction).
    pub fn authorization_url(&self) -> Result<url::Url> {
        self.oauth.authorization_url()
    }

    /// Exchange a one-time authorization code for tokens.
    ///
    /// The only gateway operation that propagates an error to the user: the
    /// interactive connect flow has no sensible degraded mode.
    pub async fn exchange_code_for_tokens(&self, code: &str) -> Result<GoogleTokenResponse> {
        self.oauth.exchange_code(code).await
    }

    /// Build a credential bundle from a token response and store it on the
    /// advisor record, replacing any previous bundle wholesale.
    pub async fn persist_credentials(
        &self,
        advisor_id: Uuid,
        response: &GoogleTokenResponse,
    ) -> GatewayResult<CredentialBundle> {
        let account_email = response
            .id_token
            .as_deref()
            .and_then(|token| extract_email_from_id_token(token).ok());

        let bundle = CredentialBundle::from_token_fields(
            response.access_token.clone(),
            response.refresh_token.clone(),
            response.token_type.clone(),
            response.scope.clone(),
            response.expires_in,
            account_email,
        );

        self.advisors
            .save_credentials(advisor_id, &bundle)
            .await
            .map_err(|err| GatewayError::Storage(err.to_string()))?;

        info!(%advisor_id, "calendar credentials stored");
        Ok(bundle)
    }

    /// Return a usable access token for the advisor, refreshing at most once.
    ///
    /// Tokens with more than five minutes of validity left are returned
    /// unchanged; the margin absorbs clock skew against the provider. An
    /// expiring token triggers exactly one refresh under a per-advisor lock,
    /// and the updated bundle is persisted before the token is handed out.
    pub async fn get_valid_access_token(&self, advisor_id: Uuid) -> GatewayResult<String> {
        let bundle = self.load_bundle(advisor_id).await?;
        if !bundle.is_expired(TOKEN_REFRESH_MARGIN_SECS) {
            return Ok(bundle.access_token);
        }

        let lock = self
            .refresh_locks
            .entry(advisor_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        // Another caller may have refreshed while we waited for the lock
        let bundle = self.load_bundle(advisor_id).await?;
        if !bundle.is_expired(TOKEN_REFRESH_MARGIN_SECS) {
            return Ok(bundle.access_token);
        }

        let refresh_token =
            bundle.refresh_token.as_deref().ok_or(GatewayError::NotConnected)?;

        let refreshed = self.oauth.refresh_token(refresh_token).await.map_err(|err| {
            warn!(%advisor_id, error = %err, "token refresh failed");
            match err {
                TokenRefreshError::InvalidGrant(message) => GatewayError::Revoked(message),
                TokenRefreshError::Network(message) => GatewayError::Transient(message),
                TokenRefreshError::Other(message) => GatewayError::Rejected(message),
            }
        })?;

        let updated = bundle.refreshed(refreshed.access_token, refreshed.expires_in);
        self.advisors
            .save_credentials(advisor_id, &updated)
            .await
            .map_err(|err| GatewayError::Storage(err.to_string()))?;

        info!(%advisor_id, "access token refreshed");
        Ok(updated.access_token)
    }

    /// Exchange a refresh token for a fresh access token without touching
    /// stored credentials. Used by the OAuth proxy, which echoes the raw
    /// token response to its caller.
    pub async fn refresh_access_token(&self, refresh_token: &str) -> Result<GoogleTokenResponse> {
        self.oauth.refresh_token(refresh_token).await.map_err(|err| {
            advisorly_domain::AdvisorlyError::AuthExchange(err.to_string())
        })
    }

    /// Best-effort remote revocation followed by unconditional local
    /// clearing: the user's disconnect intent is always honored locally.
    pub async fn revoke_access(&self, advisor_id: Uuid) -> GatewayResult<()> {
        match self.advisors.get_credentials(advisor_id).await {
            Ok(Some(bundle)) => {
                let token =
                    bundle.refresh_token.as_deref().unwrap_or(bundle.access_token.as_str());
                if let Err(err) = self.oauth.revoke_token(token).await {
                    warn!(
                        %advisor_id,
                        error = %err,
                        "remote revocation failed; clearing local credentials anyway"
                    );
                }
            }
            Ok(None) => {}
            Err(err) => {
                warn!(%advisor_id, error = %err, "could not read credentials before revocation");
            }
        }

        self.advisors
            .clear_credentials(advisor_id)
            .await
            .map_err(|err| GatewayError::Storage(err.to_string()))?;

        info!(%advisor_id, "calendar disconnected");
        Ok(())
    }

    async fn load_bundle(&self, advisor_id: Uuid) -> GatewayResult<CredentialBundle> {
        self.advisors
            .get_credentials(advisor_id)
            .await
            .map_err(|err| GatewayError::Storage(err.to_string()))?
            .ok_or(GatewayError::NotConnected)
    }

    fn log_failure(advisor_id: Uuid, operation: &str, err: &GatewayError) {
        match err {
            GatewayError::NotConnected => {
                debug!(%advisor_id, operation, "skipping calendar call: not connected");
            }
            other => {
                warn!(%advisor_id, operation, error = %other, "calendar operation failed");
            }
        }
    }
}

#[async_trait]
impl CalendarGateway for CalendarSyncGateway {
    async fn list_events(
        &self,
        advisor_id: Uuid,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> GatewayResult<Vec<RemoteCalendarEvent>> {
        let token = self.get_valid_access_token(advisor_id).await.map_err(|err| {
            Self::log_failure(advisor_id, "list_events", &err);
            err
        })?;

        self.events.list(&token, time_min, time_max).await.map_err(|err| {
            Self::log_failure(advisor_id, "list_events", &err);
            err
        })
    }

    async fn create_event(&self, advisor_id: Uuid, draft: EventDraft) -> GatewayResult<String> {
        let token = self.get_valid_access_token(advisor_id).await.map_err(|err| {
            Self::log_failure(advisor_id, "create_event", &err);
            err
        })?;

        self.events.insert(&token, &draft).await.map_err(|err| {
            Self::log_failure(advisor_id, "create_event", &err);
            err
        })
    }

    async fn update_event(
        &self,
        advisor_id: Uuid,
        event_id: &str,
        patch: EventPatch,
    ) -> GatewayResult<()> {
        let token = self.get_valid_access_token(advisor_id).await.map_err(|err| {
            Self::log_failure(advisor_id, "update_event", &err);
            err
        })?;

        self.events.patch(&token, event_id, &patch).await.map_err(|err| {
            Self::log_failure(advisor_id, "update_event", &err);
            err
        })
    }

    async fn delete_event(&self, advisor_id: Uuid, event_id: &str) -> GatewayResult<()> {
        let token = self.get_valid_access_token(advisor_id).await.map_err(|err| {
            Self::log_failure(advisor_id, "delete_event", &err);
            err
        })?;

        self.events.delete(&token, event_id).await.map_err(|err| {
            Self::log_failure(advisor_id, "delete_event", &err);
            err
        })
    }

    async fn connection_status(&self, advisor_id: Uuid) -> CalendarConnectionStatus {
        let bundle = self.advisors.get_credentials(advisor_id).await.ok().flatten();
        let (email, last_synced) = bundle
            .map(|b| (b.account_email, Some(b.updated_at)))
            .unwrap_or((None, None));

        match self.get_valid_access_token(advisor_id).await {
            Ok(_) => CalendarConnectionStatus { connected: true, email, last_synced, error: None },
            Err(GatewayError::NotConnected) => CalendarConnectionStatus {
                connected: false,
                email: None,
                last_synced: None,
                error: None,
            },
            Err(err) => CalendarConnectionStatus {
                connected: false,
                email,
                last_synced,
                error: Some(err.to_string()),
            },
        }
    }
}
