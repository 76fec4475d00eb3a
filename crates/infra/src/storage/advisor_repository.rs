//! Advisor repository over the hosted backend
//!
//! The credential column is a JSON string on the advisor row; it is decoded
//! into the typed [`CredentialBundle`] exactly once here. Unknown payload
//! versions and malformed blobs read as "not connected" rather than
//! erroring the whole flow.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use advisorly_core::AdvisorRepository;
use advisorly_domain::constants::CREDENTIAL_SCHEMA_VERSION;
use advisorly_domain::{Advisor, CredentialBundle, Result};

use super::supabase::SupabaseClient;

const ADVISORS_TABLE: &str = "advisors";

#[derive(Debug, Deserialize)]
struct AdvisorRow {
    id: Uuid,
    name: String,
    email: String,
    specialty: Option<String>,
    is_available: bool,
    calendar_email: Option<String>,
    calendar_credentials: Option<String>,
}

#[derive(Debug, Serialize)]
struct CredentialsPatch {
    calendar_credentials: Option<String>,
    calendar_email: Option<String>,
}

/// Advisor repository backed by the hosted backend
#[derive(Clone)]
pub struct SupabaseAdvisorRepository {
    client: SupabaseClient,
}

impl SupabaseAdvisorRepository {
    /// Create a new repository
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    async fn fetch_row(&self, advisor_id: Uuid) -> Result<Option<AdvisorRow>> {
        let rows: Vec<AdvisorRow> = self
            .client
            .select(
                ADVISORS_TABLE,
                &[("id", format!("eq.{advisor_id}")), ("limit", "1".to_string())],
            )
            .await?;
        Ok(rows.into_iter().next())
    }
}

/// Decode the credential column, tolerating legacy or malformed payloads.
fn decode_credentials(advisor_id: Uuid, raw: Option<&str>) -> Option<CredentialBundle> {
    let raw = raw?;
    match serde_json::from_str::<CredentialBundle>(raw) {
        Ok(bundle) if bundle.schema_version == CREDENTIAL_SCHEMA_VERSION => Some(bundle),
        Ok(bundle) => {
            warn!(
                %advisor_id,
                schema_version = bundle.schema_version,
                "unsupported credential payload version; treating as not connected"
            );
            None
        }
        Err(err) => {
            warn!(
                %advisor_id,
                error = %err,
                "malformed credential payload; treating as not connected"
            );
            None
        }
    }
}

fn row_into_advisor(row: AdvisorRow) -> Advisor {
    let credentials = decode_credentials(row.id, row.calendar_credentials.as_deref());
    Advisor {
        id: row.id,
        name: row.name,
        email: row.email,
        specialty: row.specialty,
        is_available: row.is_available,
        calendar_email: row.calendar_email,
        credentials,
    }
}

#[async_trait]
impl AdvisorRepository for SupabaseAdvisorRepository {
    async fn get_advisor(&self, advisor_id: Uuid) -> Result<Option<Advisor>> {
        Ok(self.fetch_row(advisor_id).await?.map(row_into_advisor))
    }

    async fn get_credentials(&self, advisor_id: Uuid) -> Result<Option<CredentialBundle>> {
        Ok(self
            .fetch_row(advisor_id)
            .await?
            .and_then(|row| decode_credentials(row.id, row.calendar_credentials.as_deref())))
    }

    async fn save_credentials(&self, advisor_id: Uuid, bundle: &CredentialBundle) -> Result<()> {
        let serialized = serde_json::to_string(bundle).map_err(|err| {
            advisorly_domain::AdvisorlyError::Internal(format!(
                "failed to serialize credential bundle: {err}"
            ))
        })?;

        self.client
            .patch(
                ADVISORS_TABLE,
                &[("id", format!("eq.{advisor_id}"))],
                &CredentialsPatch {
                    calendar_credentials: Some(serialized),
                    calendar_email: bundle.account_email.clone(),
                },
            )
            .await
    }

    async fn clear_credentials(&self, advisor_id: Uuid) -> Result<()> {
        self.client
            .patch(
                ADVISORS_TABLE,
                &[("id", format!("eq.{advisor_id}"))],
                &CredentialsPatch { calendar_credentials: None, calendar_email: None },
            )
            .await
    }
}
