use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entities::products;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    /// Required for admins and for suppliers with more than one profile
    pub supplier_id: Option<i32>,
    pub name: String,
    pub description: Option<String>,
    pub unit_price: Decimal,
    pub currency: Option<String>,
    pub min_order_quantity: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub unit_price: Option<Decimal>,
    pub currency: Option<String>,
    pub min_order_quantity: Option<i32>,
}

impl UpdateProductRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.unit_price.is_none()
            && self.currency.is_none()
            && self.min_order_quantity.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: i32,
    pub supplier_id: i32,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    pub currency: String,
    pub min_order_quantity: i32,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

impl From<products::Model> for ProductResponse {
    fn from(m: products::Model) -> Self {
        Self {
            id: m.id,
            supplier_id: m.supplier_id,
            name: m.name,
            description: m.description,
            unit_price: m.unit_price,
            currency: m.currency,
            min_order_quantity: m.min_order_quantity,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Extra filters for GET /api/products
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilter {
    pub supplier_id: Option<i32>,
    /// Case-sensitive substring match on the product name
    pub search: Option<String>,
}
