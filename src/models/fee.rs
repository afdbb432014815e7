//! Fee calculator request/response models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::services::fee_calculator::{FeeBreakdown, FeeError};

/// Body of POST /api/fees/calculate
///
/// Fields are kept loosely typed so that a wrong type maps to the matching
/// validation message instead of a body rejection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeRequest {
    #[serde(default)]
    pub amount: Option<serde_json::Value>,
    #[serde(default)]
    pub consolidation_type: Option<serde_json::Value>,
}

impl FeeRequest {
    /// Amount as an exact decimal; non-numbers are treated as absent.
    ///
    /// Positive numbers a `Decimal` cannot hold (beyond ~7.9e28, or more
    /// than 28 decimal places) are `AmountOutOfRange`.
    pub fn amount(&self) -> Result<Option<Decimal>, FeeError> {
        let Some(serde_json::Value::Number(n)) = &self.amount else {
            return Ok(None);
        };

        let raw = n.to_string();
        match Decimal::from_str(&raw).or_else(|_| Decimal::from_scientific(&raw)) {
            Ok(amount) => Ok(Some(amount)),
            Err(_) if n.as_f64().is_some_and(|v| v > 0.0) => Err(FeeError::AmountOutOfRange),
            Err(_) => Ok(None),
        }
    }

    /// Tier name; `null` is absent, non-strings become an unmatchable name
    pub fn consolidation_type(&self) -> Option<String> {
        match &self.consolidation_type {
            None | Some(serde_json::Value::Null) => None,
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        }
    }
}

/// Fee breakdown returned to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeResponse {
    #[serde(with = "rust_decimal::serde::float")]
    pub original_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub fee_percentage: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub fee_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub max_fee: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float")]
    pub applied_fee: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
}

impl From<FeeBreakdown> for FeeResponse {
    fn from(fee: FeeBreakdown) -> Self {
        Self {
            original_amount: fee.original_amount,
            fee_percentage: fee.fee_percentage,
            fee_amount: fee.fee_amount,
            max_fee: fee.max_fee,
            applied_fee: fee.applied_fee,
            total_amount: fee.total_amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn request(value: serde_json::Value) -> FeeRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_amount_parsing() {
        assert_eq!(request(json!({ "amount": 50000 })).amount(), Ok(Some(dec!(50000))));
        assert_eq!(request(json!({ "amount": 123.45 })).amount(), Ok(Some(dec!(123.45))));
        assert_eq!(request(json!({ "amount": "100" })).amount(), Ok(None));
        assert_eq!(request(json!({ "amount": null })).amount(), Ok(None));
        assert_eq!(request(json!({})).amount(), Ok(None));
    }

    #[test]
    fn test_unrepresentable_amounts() {
        assert_eq!(
            request(json!({ "amount": 1e30 })).amount(),
            Err(FeeError::AmountOutOfRange)
        );
        assert_eq!(
            request(json!({ "amount": 1e-30 })).amount(),
            Err(FeeError::AmountOutOfRange)
        );
        // Negative stays an ordinary invalid amount
        assert_eq!(request(json!({ "amount": -1e30 })).amount(), Ok(None));
        assert_eq!(
            request(json!({ "amount": 5e28 })).amount(),
            Ok(Some(dec!(50000000000000000000000000000)))
        );
    }

    #[test]
    fn test_consolidation_type_parsing() {
        let req = request(json!({ "consolidationType": "volume" }));
        assert_eq!(req.consolidation_type().as_deref(), Some("volume"));

        assert_eq!(request(json!({ "consolidationType": null })).consolidation_type(), None);
        assert_eq!(
            request(json!({ "consolidationType": 7 })).consolidation_type().as_deref(),
            Some("7")
        );
    }

    #[test]
    fn test_response_serializes_numbers() {
        let response = FeeResponse {
            original_amount: dec!(1000),
            fee_percentage: dec!(0),
            fee_amount: dec!(299),
            max_fee: None,
            applied_fee: dec!(299),
            total_amount: dec!(1299),
        };
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["totalAmount"].as_f64(), Some(1299.0));
        assert!(value["maxFee"].is_null());
    }
}
