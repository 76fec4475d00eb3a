//! Supabase REST/RPC client
//!
//! Thin HTTP client over the hosted backend's PostgREST surface. Uses the
//! shared retrying [`HttpClient`]; authenticates every request with the
//! service-role key.

use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use advisorly_domain::{AdvisorlyError, Result, StorageConfig};

use crate::http::HttpClient;

/// Configuration for the Supabase client
#[derive(Debug, Clone)]
pub struct SupabaseClientConfig {
    /// Base URL of the project, e.g. `https://xyz.supabase.co`
    pub base_url: String,
    /// Service-role key used for server-side access
    pub service_key: String,
    /// Timeout for storage requests
    pub timeout: Duration,
    /// Max attempts for transient failures
    pub max_attempts: usize,
}

impl SupabaseClientConfig {
    /// Build from application storage settings with default timeouts.
    pub fn from_storage(config: &StorageConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            service_key: config.service_key.clone(),
            timeout: Duration::from_secs(30),
            max_attempts: 3,
        }
    }
}

/// PostgREST error body
#[derive(Debug, serde::Deserialize)]
pub struct PostgrestError {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Client for the hosted backend's REST and RPC endpoints
#[derive(Clone)]
pub struct SupabaseClient {
    http: HttpClient,
    base_url: String,
    service_key: String,
}

impl SupabaseClient {
    /// Create a new client.
    ///
    /// # Errors
    /// Returns `AdvisorlyError::Config` if the HTTP client cannot be built.
    pub fn new(config: SupabaseClientConfig) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(config.timeout)
            .max_attempts(config.max_attempts)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            service_key: config.service_key,
        })
    }

    fn rest_url(&self, path: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, path)
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header("apikey", &self.service_key).bearer_auth(&self.service_key)
    }

    /// `GET` rows from a table, decoded into `T`.
    pub async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let request =
            self.authed(self.http.request(Method::GET, self.rest_url(table))).query(query);

        let response = self.http.send(request).await?;
        let response = check_status(response, table).await?;

        response.json::<Vec<T>>().await.map_err(|err| {
            AdvisorlyError::Storage(format!("unparseable rows from {table}: {err}"))
        })
    }

    /// `PATCH` rows matching the query filter.
    pub async fn patch<B: Serialize>(
        &self,
        table: &str,
        query: &[(&str, String)],
        body: &B,
    ) -> Result<()> {
        let request = self
            .authed(self.http.request(Method::PATCH, self.rest_url(table)))
            .header("Prefer", "return=minimal")
            .query(query)
            .json(body);

        let response = self.http.send(request).await?;
        check_status(response, table).await?;
        Ok(())
    }

    /// Call a stored procedure. The raw response is returned so callers can
    /// map procedure-specific failures (e.g. exclusion-constraint conflicts).
    pub async fn rpc<B: Serialize>(&self, function: &str, body: &B) -> Result<Response> {
        let path = format!("rpc/{function}");
        debug!(function, "calling storage RPC");

        let request =
            self.authed(self.http.request(Method::POST, self.rest_url(&path))).json(body);

        self.http.send(request).await
    }
}

/// Map a non-success PostgREST response into a storage error.
async fn check_status(response: Response, context: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(AdvisorlyError::Storage(format!("{context} request failed ({status}): {body}")))
}

/// Decode a PostgREST error body, tolerating non-JSON answers.
pub fn parse_postgrest_error(body: &str) -> PostgrestError {
    serde_json::from_str(body).unwrap_or(PostgrestError { code: None, message: None })
}

/// Whether an error body describes an exclusion/uniqueness conflict.
///
/// `23P01` is Postgres's exclusion-constraint violation; `23505` the unique
/// violation raised by a check-and-insert procedure.
pub fn is_conflict_error(error: &PostgrestError) -> bool {
    matches!(error.code.as_deref(), Some("23P01") | Some("23505"))
        || error
            .message
            .as_deref()
            .is_some_and(|message| message.to_ascii_lowercase().contains("conflict"))
}

/// Extract a scalar value from an RPC response body.
pub fn scalar_from_rpc(value: Value) -> Option<Value> {
    match value {
        Value::Array(mut items) if items.len() == 1 => Some(items.remove(0)),
        Value::Array(_) => None,
        other => Some(other),
    }
}
