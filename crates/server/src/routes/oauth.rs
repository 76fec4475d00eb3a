//! OAuth code-exchange proxy
//!
//! Browser-facing proxy in front of the provider's token endpoint: exchanges
//! a one-time code (or refresh token) and, when an advisor id is supplied,
//! persists the resulting credential bundle. Responds either with JSON or,
//! when `redirectUrl` is given, with a redirect carrying
//! `success`/`tokenSaved`/`saveError` query parameters so the browser flow
//! can finish without exposing tokens.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;
use url::Url;
use uuid::Uuid;

use advisorly_domain::AdvisorlyError;
use advisorly_infra::integrations::google::types::GoogleTokenResponse;

use crate::context::AppContext;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeBody {
    pub code: Option<String>,
    pub refresh_token: Option<String>,
    pub grant_type: Option<String>,
    pub advisor_id: Option<Uuid>,
    pub redirect_url: Option<String>,
}

/// Exchange a code or refresh token at the provider's token endpoint.
pub async fn exchange(
    State(context): State<Arc<AppContext>>,
    Json(body): Json<ExchangeBody>,
) -> Response {
    if context.config.google.client_id.is_empty()
        || context.config.google.client_secret.is_empty()
    {
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Server OAuth configuration is missing",
        );
    }

    let grant_type = body.grant_type.clone().unwrap_or_else(|| {
        if body.code.is_some() { "authorization_code".to_string() } else { "refresh_token".to_string() }
    });

    let outcome = match grant_type.as_str() {
        "authorization_code" => {
            let Some(code) = body.code.as_deref() else {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    "Missing required parameter: code",
                );
            };
            context.gateway.exchange_code_for_tokens(code).await
        }
        "refresh_token" => {
            let Some(refresh_token) = body.refresh_token.as_deref() else {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    "Missing required parameter: refreshToken",
                );
            };
            context.gateway.refresh_access_token(refresh_token).await
        }
        other => {
            return error_response(
                StatusCode::BAD_REQUEST,
                &format!("Unsupported grantType: {other}"),
            );
        }
    };

    let tokens = match outcome {
        Ok(tokens) => tokens,
        Err(err) => return exchange_failure(&body, err),
    };

    // Persist when the flow belongs to a known advisor; a storage hiccup is
    // reported but does not fail an otherwise-successful authorization.
    let (token_saved, save_error) = match body.advisor_id {
        Some(advisor_id) => {
            match context.gateway.persist_credentials(advisor_id, &tokens).await {
                Ok(_) => (true, None),
                Err(err) => {
                    warn!(%advisor_id, error = %err, "credential persistence failed");
                    (false, Some(err.to_string()))
                }
            }
        }
        None => (false, None),
    };

    match body.redirect_url.as_deref() {
        Some(redirect_url) => {
            redirect_with_flags(redirect_url, true, token_saved, save_error.as_deref(), None)
        }
        None => success_json(&tokens, body.advisor_id.is_some() && token_saved),
    }
}

fn success_json(tokens: &GoogleTokenResponse, saved: bool) -> Response {
    let mut value = match serde_json::to_value(tokens) {
        Ok(value) => value,
        Err(err) => {
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("failed to encode token response: {err}"),
            );
        }
    };
    if let Some(map) = value.as_object_mut() {
        map.insert("saved_to_backend".to_string(), json!(saved));
    }
    (StatusCode::OK, Json(value)).into_response()
}

/// Map a failed exchange into the clearest possible answer for the browser.
fn exchange_failure(body: &ExchangeBody, err: AdvisorlyError) -> Response {
    let message = err.to_string();
    let (status, friendly) = if message.contains("invalid_grant") {
        (
            StatusCode::BAD_REQUEST,
            "Authorization code expired or already used. Please authorize again.".to_string(),
        )
    } else if message.contains("redirect_uri_mismatch") {
        (
            StatusCode::BAD_REQUEST,
            "OAuth redirect URI mismatch. Check the configured redirect URI.".to_string(),
        )
    } else {
        (StatusCode::BAD_GATEWAY, message)
    };

    match body.redirect_url.as_deref() {
        Some(redirect_url) => redirect_with_flags(redirect_url, false, false, None, Some(&friendly)),
        None => error_response(status, &friendly),
    }
}

fn redirect_with_flags(
    redirect_url: &str,
    success: bool,
    token_saved: bool,
    save_error: Option<&str>,
    error: Option<&str>,
) -> Response {
    let mut url = match Url::parse(redirect_url) {
        Ok(url) => url,
        Err(err) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                &format!("Invalid redirectUrl: {err}"),
            );
        }
    };

    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("success", if success { "true" } else { "false" });
        if success {
            pairs.append_pair("tokenSaved", if token_saved { "true" } else { "false" });
        }
        if let Some(save_error) = save_error {
            pairs.append_pair("saveError", save_error);
        }
        if let Some(error) = error {
            pairs.append_pair("error", error);
        }
    }

    Redirect::to(url.as_str()).into_response()
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
