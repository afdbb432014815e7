//! Shared request/response models

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

const DEFAULT_LIMIT: u64 = 20;
const MAX_LIMIT: i64 = 100;

/// Query parameters shared by the list endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    /// Maximum number of results (default: 20, max: 100)
    pub limit: Option<i64>,
    /// Offset for pagination (default: 0)
    pub offset: Option<i64>,
    /// Filter by status, where the entity has one
    pub status: Option<String>,
}

impl ListQuery {
    /// Validate query parameters
    pub fn validate(&self) -> Result<(), String> {
        if let Some(limit) = self.limit {
            if limit < 1 {
                return Err("limit must be at least 1".to_string());
            }
            if limit > MAX_LIMIT {
                return Err(format!("limit cannot exceed {}", MAX_LIMIT));
            }
        }
        if let Some(offset) = self.offset {
            if offset < 0 {
                return Err("offset cannot be negative".to_string());
            }
        }
        Ok(())
    }

    pub fn limit(&self) -> u64 {
        self.limit.map(|l| l as u64).unwrap_or(DEFAULT_LIMIT)
    }

    pub fn offset(&self) -> u64 {
        self.offset.map(|o| o as u64).unwrap_or(0)
    }
}

/// Paginated list response
#[derive(Debug, Clone, Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    /// Total count matching the filters (for pagination)
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

/// Validate an ISO-4217 style currency code, defaulting to USD
pub fn normalize_currency(currency: Option<&str>) -> Result<String, String> {
    match currency.map(str::trim) {
        None | Some("") => Ok("USD".to_string()),
        Some(code) if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) => {
            Ok(code.to_uppercase())
        }
        Some(code) => Err(format!("Invalid currency code: {}", code)),
    }
}

/// Money columns are DECIMAL(16,2)
pub const MONEY_SCALE: u32 = 2;
pub const MONEY_LIMIT: Decimal = dec!(100000000000000);

/// Check that an amount fits a money column without rounding
pub fn check_money(amount: Decimal, field: &str) -> Result<(), String> {
    if amount.normalize().scale() > MONEY_SCALE {
        return Err(format!(
            "{} cannot have more than {} decimal places",
            field, MONEY_SCALE
        ));
    }
    if amount.abs() >= MONEY_LIMIT {
        return Err(format!("{} must be below {}", field, MONEY_LIMIT));
    }
    Ok(())
}

/// Trimmed text field that must not be blank
pub fn non_empty(value: &str, field: &str) -> Result<String, String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(format!("{} cannot be empty", field));
    }
    Ok(value.to_string())
}
