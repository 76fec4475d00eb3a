//! Advisor and directory lookup types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::credentials::CredentialBundle;

/// A person offering advisory sessions
///
/// Created administratively; the credential bundle is absent until the
/// advisor completes the external authorization flow. This crate only
/// reads and writes the credential field; the rest of the record is owned
/// by the advisor-management surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Advisor {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub specialty: Option<String>,
    pub is_available: bool,
    /// Email of the connected external calendar account, if any
    pub calendar_email: Option<String>,
    /// Calendar credentials; `None` means not connected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials: Option<CredentialBundle>,
}

/// Company name lookup used when composing mirrored-event descriptions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyRef {
    pub id: Uuid,
    pub name: String,
}

/// Session-template lookup used when composing mirrored-event descriptions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionTemplateRef {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
}
