//! Consolidation request/response models

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::consolidations;
use crate::models::fee::FeeResponse;
use crate::models::lifecycle::{ConsolidationStatus, Lifecycle};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConsolidationRequest {
    pub tier: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateConsolidationRequest {
    pub tier: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachOrdersRequest {
    pub order_ids: Vec<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidationResponse {
    pub id: i32,
    pub admin_id: Uuid,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub tier: String,
    pub status: String,
    pub status_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

impl From<consolidations::Model> for ConsolidationResponse {
    fn from(m: consolidations::Model) -> Self {
        let status_label = m
            .status
            .parse::<ConsolidationStatus>()
            .map(|s| s.label().to_string())
            .unwrap_or_else(|_| m.status.clone());

        Self {
            id: m.id,
            admin_id: m.admin_id,
            amount: m.amount,
            tier: m.tier,
            status: m.status,
            status_label,
            notes: m.notes,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Fee quote for a stored consolidation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidationFeeResponse {
    pub consolidation_id: i32,
    pub consolidation_type: String,
    #[serde(flatten)]
    pub fee: FeeResponse,
}
