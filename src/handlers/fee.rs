use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::error::ApiError;
use crate::models::fee::{FeeRequest, FeeResponse};
use crate::AppState;

/// Calculate a consolidation fee
///
/// POST /api/fees/calculate
///
/// ```json
/// { "amount": 50000, "consolidationType": "regular" }
/// ```
///
/// returns
///
/// ```json
/// {
///   "originalAmount": 50000.0,
///   "feePercentage": 2.0,
///   "feeAmount": 1000.0,
///   "maxFee": 999.0,
///   "appliedFee": 999.0,
///   "totalAmount": 50999.0
/// }
/// ```
pub async fn calculate_fee(
    State(state): State<AppState>,
    payload: Result<Json<FeeRequest>, JsonRejection>,
) -> Result<Json<FeeResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| {
        tracing::warn!(error = %e, "Rejected fee request body");
        ApiError::Validation("Invalid request body".to_string())
    })?;

    let tier = request.consolidation_type();
    let fee = request
        .amount()
        .and_then(|amount| state.fees.calculate_raw(amount, tier.as_deref()))
        .map_err(|e| {
            tracing::debug!(error = %e, tier = ?tier, "Fee request failed validation");
            e
        })?;

    tracing::info!(
        tier = %fee.tier,
        amount = %fee.original_amount,
        applied_fee = %fee.applied_fee,
        "Calculated consolidation fee"
    );

    Ok(Json(fee.into()))
}
