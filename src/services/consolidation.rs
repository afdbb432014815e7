//! Consolidation aggregate maintenance
//!
//! A consolidation's `amount` is always the sum of its attached orders. Every
//! write that changes membership or an attached order's amount calls
//! `recompute_amount` in the same transaction.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter, Set,
};

use crate::entities::{consolidations, orders, prelude::*};
use crate::error::ApiError;
use crate::models::common::check_money;
use crate::services::repository::find_by_id_or_404;

/// Sum of order amounts
pub fn sum_order_amounts<'a>(orders: impl IntoIterator<Item = &'a orders::Model>) -> Decimal {
    orders.into_iter().map(|o| o.amount).sum()
}

/// Recompute and store the aggregate amount of a consolidation
pub async fn recompute_amount<C>(db: &C, consolidation_id: i32) -> Result<consolidations::Model, ApiError>
where
    C: ConnectionTrait,
{
    let consolidation = find_by_id_or_404::<Consolidations, _>(db, consolidation_id).await?;

    let attached = Orders::find()
        .filter(orders::Column::ConsolidationId.eq(consolidation_id))
        .all(db)
        .await?;

    let amount = sum_order_amounts(&attached);
    check_money(amount, "Consolidation total").map_err(ApiError::Conflict)?;

    if amount == consolidation.amount {
        return Ok(consolidation);
    }

    tracing::debug!(
        consolidation_id,
        orders = attached.len(),
        previous = %consolidation.amount,
        amount = %amount,
        "Updating consolidation aggregate"
    );

    let mut active = consolidation.into_active_model();
    active.amount = Set(amount);
    active.updated_at = Set(Utc::now().into());

    Ok(active.update(db).await?)
}
