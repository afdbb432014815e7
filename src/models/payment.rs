//! Payment request/response models

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entities::payments;
use crate::models::lifecycle::{Lifecycle, PaymentStatus};

/// How a payment was disbursed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    BankTransfer,
    CreditCard,
    Wire,
    Other,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::BankTransfer => write!(f, "bank_transfer"),
            PaymentMethod::CreditCard => write!(f, "credit_card"),
            PaymentMethod::Wire => write!(f, "wire"),
            PaymentMethod::Other => write!(f, "other"),
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bank_transfer" => Ok(PaymentMethod::BankTransfer),
            "credit_card" => Ok(PaymentMethod::CreditCard),
            "wire" => Ok(PaymentMethod::Wire),
            "other" => Ok(PaymentMethod::Other),
            _ => Err(format!("Unknown payment method: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    pub consolidation_id: i32,
    pub amount: Decimal,
    pub method: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePaymentRequest {
    pub status: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub id: i32,
    pub consolidation_id: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub method: String,
    pub status: String,
    pub status_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

impl From<payments::Model> for PaymentResponse {
    fn from(m: payments::Model) -> Self {
        let status_label = m
            .status
            .parse::<PaymentStatus>()
            .map(|s| s.label().to_string())
            .unwrap_or_else(|_| m.status.clone());

        Self {
            id: m.id,
            consolidation_id: m.consolidation_id,
            amount: m.amount,
            method: m.method,
            status: m.status,
            status_label,
            notes: m.notes,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
