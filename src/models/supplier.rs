use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::suppliers;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSupplierRequest {
    pub owner_id: Uuid,
    pub company_name: String,
    pub contact_email: String,
    pub phone: Option<String>,
    pub city: String,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSupplierRequest {
    pub company_name: Option<String>,
    pub contact_email: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    /// Admin only
    pub verified: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierResponse {
    pub id: i32,
    pub owner_id: Uuid,
    pub company_name: String,
    pub contact_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub city: String,
    pub country: String,
    pub verified: bool,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

impl From<suppliers::Model> for SupplierResponse {
    fn from(m: suppliers::Model) -> Self {
        Self {
            id: m.id,
            owner_id: m.owner_id,
            company_name: m.company_name,
            contact_email: m.contact_email,
            phone: m.phone,
            city: m.city,
            country: m.country,
            verified: m.verified,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Minimal email shape check; delivery is the auth provider's problem
pub fn validate_email(email: &str) -> Result<(), String> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(format!("Invalid contact email: {}", email)),
    }
}
