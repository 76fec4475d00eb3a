//! Shared helpers for infra integration tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use advisorly_core::AdvisorRepository;
use advisorly_domain::{Advisor, AdvisorlyError, CredentialBundle, GoogleConfig, Result};

/// Test OAuth application settings.
pub fn google_config() -> GoogleConfig {
    GoogleConfig {
        client_id: "client-123".to_string(),
        client_secret: "secret-456".to_string(),
        redirect_uri: "https://app.example.com/oauth/callback".to_string(),
        time_zone: "UTC".to_string(),
    }
}

/// In-memory advisor store for gateway tests.
#[derive(Default, Clone)]
pub struct InMemoryAdvisorRepository {
    advisors: Arc<Mutex<HashMap<Uuid, Advisor>>>,
    fail_reads: Arc<Mutex<bool>>,
}

impl InMemoryAdvisorRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_advisor(self, advisor: Advisor) -> Self {
        self.advisors.lock().unwrap().insert(advisor.id, advisor);
        self
    }

    /// Make credential reads fail, simulating a storage outage.
    pub fn set_fail_reads(&self, fail: bool) {
        *self.fail_reads.lock().unwrap() = fail;
    }

    pub fn credentials_of(&self, advisor_id: Uuid) -> Option<CredentialBundle> {
        self.advisors
            .lock()
            .unwrap()
            .get(&advisor_id)
            .and_then(|advisor| advisor.credentials.clone())
    }
}

/// Advisor row without a calendar connection.
pub fn advisor(id: Uuid) -> Advisor {
    Advisor {
        id,
        name: "Dana Reyes".to_string(),
        email: "dana.reyes@example.com".to_string(),
        specialty: None,
        is_available: true,
        calendar_email: None,
        credentials: None,
    }
}

#[async_trait]
impl AdvisorRepository for InMemoryAdvisorRepository {
    async fn get_advisor(&self, advisor_id: Uuid) -> Result<Option<Advisor>> {
        Ok(self.advisors.lock().unwrap().get(&advisor_id).cloned())
    }

    async fn get_credentials(&self, advisor_id: Uuid) -> Result<Option<CredentialBundle>> {
        if *self.fail_reads.lock().unwrap() {
            return Err(AdvisorlyError::Storage("storage unavailable".to_string()));
        }
        Ok(self
            .advisors
            .lock()
            .unwrap()
            .get(&advisor_id)
            .and_then(|advisor| advisor.credentials.clone()))
    }

    async fn save_credentials(&self, advisor_id: Uuid, bundle: &CredentialBundle) -> Result<()> {
        let mut advisors = self.advisors.lock().unwrap();
        let advisor = advisors
            .get_mut(&advisor_id)
            .ok_or_else(|| AdvisorlyError::NotFound(format!("advisor {advisor_id}")))?;
        advisor.credentials = Some(bundle.clone());
        advisor.calendar_email = bundle.account_email.clone();
        Ok(())
    }

    async fn clear_credentials(&self, advisor_id: Uuid) -> Result<()> {
        let mut advisors = self.advisors.lock().unwrap();
        if let Some(advisor) = advisors.get_mut(&advisor_id) {
            advisor.credentials = None;
            advisor.calendar_email = None;
        }
        Ok(())
    }
}
