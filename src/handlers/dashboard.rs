//! Admin dashboard summary
//!
//! GET /api/dashboard/summary

use axum::{extract::State, Json};
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect,
};

use crate::auth::Caller;
use crate::entities::{consolidations, orders, payments, prelude::*};
use crate::error::ApiError;
use crate::models::dashboard::{DashboardSummary, PaymentSummary, StatusBreakdown, StatusCount};
use crate::models::lifecycle::{ConsolidationStatus, Lifecycle, OrderStatus, PaymentStatus};
use crate::services::access_policy::{resources, Action};
use crate::AppState;

pub async fn get_dashboard_summary(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<DashboardSummary>, ApiError> {
    caller.authorize(&state.permissions, resources::DASHBOARD, Action::Read)?;

    let db = state.db();

    let mut order_counts = Vec::new();
    for status in OrderStatus::all() {
        let count = Orders::find()
            .filter(orders::Column::Status.eq(status.to_string()))
            .count(db)
            .await?;
        order_counts.push(status_count(*status, count));
    }

    let mut consolidation_counts = Vec::new();
    for status in ConsolidationStatus::all() {
        let count = Consolidations::find()
            .filter(consolidations::Column::Status.eq(status.to_string()))
            .count(db)
            .await?;
        consolidation_counts.push(status_count(*status, count));
    }

    let mut payment_counts = Vec::new();
    for status in PaymentStatus::all() {
        let count = Payments::find()
            .filter(payments::Column::Status.eq(status.to_string()))
            .count(db)
            .await?;
        payment_counts.push(status_count(*status, count));
    }

    let processed_amount = processed_payment_total(db).await?;
    let suppliers = Suppliers::find().count(db).await?;
    let products = Products::find().count(db).await?;

    tracing::debug!(user_id = %caller.user_id, "Built dashboard summary");

    Ok(Json(DashboardSummary {
        orders: breakdown(order_counts),
        consolidations: breakdown(consolidation_counts),
        payments: PaymentSummary {
            breakdown: breakdown(payment_counts),
            processed_amount,
        },
        suppliers,
        products,
    }))
}

async fn processed_payment_total(db: &DatabaseConnection) -> Result<Decimal, ApiError> {
    let total = Payments::find()
        .select_only()
        .column_as(payments::Column::Amount.sum(), "total")
        .filter(payments::Column::Status.eq(PaymentStatus::Processed.to_string()))
        .into_tuple::<Option<Decimal>>()
        .one(db)
        .await?;

    Ok(total.flatten().unwrap_or(Decimal::ZERO))
}

fn status_count<S: Lifecycle>(status: S, count: u64) -> StatusCount {
    StatusCount {
        status: status.to_string(),
        label: status.label().to_string(),
        count,
    }
}

fn breakdown(by_status: Vec<StatusCount>) -> StatusBreakdown {
    StatusBreakdown {
        total: by_status.iter().map(|s| s.count).sum(),
        by_status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breakdown_totals() {
        let summary = breakdown(vec![
            status_count(PaymentStatus::Pending, 3),
            status_count(PaymentStatus::Processed, 5),
            status_count(PaymentStatus::Failed, 1),
        ]);

        assert_eq!(summary.total, 9);
        assert_eq!(summary.by_status[1].status, "processed");
        assert_eq!(summary.by_status[1].label, "Processed");
    }
}
