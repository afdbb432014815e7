//! Order request/response models

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::orders;
use crate::models::lifecycle::{Lifecycle, OrderStatus};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    /// Only admins may place an order on behalf of another buyer
    pub buyer_id: Option<Uuid>,
    pub supplier_id: i32,
    pub amount: Decimal,
    pub currency: Option<String>,
    pub shipping_address: Option<String>,
    pub tracking_reference: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
    pub amount: Option<Decimal>,
    pub status: Option<String>,
    pub shipping_address: Option<String>,
    pub tracking_reference: Option<String>,
}

impl UpdateOrderRequest {
    pub fn is_empty(&self) -> bool {
        self.amount.is_none()
            && self.status.is_none()
            && self.shipping_address.is_none()
            && self.tracking_reference.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: i32,
    pub buyer_id: Uuid,
    pub supplier_id: i32,
    pub consolidation_id: Option<i32>,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub currency: String,
    pub status: String,
    pub status_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_reference: Option<String>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

impl From<orders::Model> for OrderResponse {
    fn from(m: orders::Model) -> Self {
        let status_label = m
            .status
            .parse::<OrderStatus>()
            .map(|s| s.label().to_string())
            .unwrap_or_else(|_| m.status.clone());

        Self {
            id: m.id,
            buyer_id: m.buyer_id,
            supplier_id: m.supplier_id,
            consolidation_id: m.consolidation_id,
            amount: m.amount,
            currency: m.currency,
            status: m.status,
            status_label,
            shipping_address: m.shipping_address,
            tracking_reference: m.tracking_reference,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
