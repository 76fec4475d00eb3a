//! Company and session-template lookups over the hosted backend

use async_trait::async_trait;
use uuid::Uuid;

use advisorly_core::DirectoryRepository;
use advisorly_domain::{CompanyRef, Result, SessionTemplateRef};

use super::supabase::SupabaseClient;

const COMPANIES_TABLE: &str = "companies";
const SESSION_TEMPLATES_TABLE: &str = "session_templates";

/// Directory repository backed by the hosted backend
#[derive(Clone)]
pub struct SupabaseDirectoryRepository {
    client: SupabaseClient,
}

impl SupabaseDirectoryRepository {
    /// Create a new repository
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DirectoryRepository for SupabaseDirectoryRepository {
    async fn get_company(&self, company_id: Uuid) -> Result<Option<CompanyRef>> {
        let rows: Vec<CompanyRef> = self
            .client
            .select(
                COMPANIES_TABLE,
                &[
                    ("id", format!("eq.{company_id}")),
                    ("select", "id,name".to_string()),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn get_session_template(
        &self,
        session_id: Uuid,
    ) -> Result<Option<SessionTemplateRef>> {
        let rows: Vec<SessionTemplateRef> = self
            .client
            .select(
                SESSION_TEMPLATES_TABLE,
                &[
                    ("id", format!("eq.{session_id}")),
                    ("select", "id,title,description".to_string()),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;
        Ok(rows.into_iter().next())
    }
}
