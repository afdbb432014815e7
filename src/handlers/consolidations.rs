//! Consolidation handlers
//!
//! CRUD plus order membership and fee quotes. The aggregate `amount` is
//! derived from attached orders and cannot be written directly.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, Condition, EntityTrait, IntoActiveModel,
    ModelTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use std::collections::HashSet;

use crate::auth::Caller;
use crate::entities::{consolidations, orders, prelude::*};
use crate::error::ApiError;
use crate::models::common::{ListQuery, ListResponse};
use crate::models::consolidation::{
    AttachOrdersRequest, ConsolidationFeeResponse, ConsolidationResponse,
    CreateConsolidationRequest, UpdateConsolidationRequest,
};
use crate::models::lifecycle::{transition_from_str, ConsolidationStatus, Lifecycle};
use crate::services::access_policy::{resources, Action};
use crate::services::consolidation::recompute_amount;
use crate::services::fee_calculator::ConsolidationTier;
use crate::services::repository::{fetch_page, find_by_id_or_404};
use crate::services::scope;
use crate::AppState;

const MAX_ATTACH_BATCH: usize = 500;

pub async fn list_consolidations(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse<ConsolidationResponse>>, ApiError> {
    caller.authorize(&state.permissions, resources::CONSOLIDATIONS, Action::Read)?;
    query.validate().map_err(ApiError::Validation)?;

    let mut select = Consolidations::find();

    if let Some(ids) = scope::visible_consolidation_ids(state.db(), &caller).await? {
        select = select.filter(consolidations::Column::Id.is_in(ids));
    }

    if let Some(status) = query.status.as_deref() {
        let status: ConsolidationStatus = status.parse()?;
        select = select.filter(consolidations::Column::Status.eq(status.to_string()));
    }

    let select = select
        .order_by_desc(consolidations::Column::CreatedAt)
        .order_by_desc(consolidations::Column::Id);

    let (items, total) = fetch_page(state.db(), select, &query).await?;

    Ok(Json(ListResponse {
        items: items.into_iter().map(ConsolidationResponse::from).collect(),
        total,
        limit: query.limit(),
        offset: query.offset(),
    }))
}

pub async fn get_consolidation(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<i32>,
) -> Result<Json<ConsolidationResponse>, ApiError> {
    caller.authorize(&state.permissions, resources::CONSOLIDATIONS, Action::Read)?;

    let consolidation = load_visible_consolidation(&state, &caller, id).await?;

    Ok(Json(consolidation.into()))
}

pub async fn create_consolidation(
    State(state): State<AppState>,
    caller: Caller,
    Json(payload): Json<CreateConsolidationRequest>,
) -> Result<(StatusCode, Json<ConsolidationResponse>), ApiError> {
    caller.authorize(&state.permissions, resources::CONSOLIDATIONS, Action::Create)?;

    let tier: ConsolidationTier = payload.tier.parse()?;

    let now = Utc::now();
    let consolidation = consolidations::ActiveModel {
        admin_id: Set(caller.user_id),
        amount: Set(Decimal::ZERO),
        tier: Set(tier.to_string()),
        status: Set(ConsolidationStatus::initial().to_string()),
        notes: Set(payload.notes),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    }
    .insert(state.db())
    .await?;

    tracing::info!(
        consolidation_id = consolidation.id,
        admin_id = %consolidation.admin_id,
        tier = %tier,
        "Consolidation created"
    );

    Ok((StatusCode::CREATED, Json(consolidation.into())))
}

pub async fn update_consolidation(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateConsolidationRequest>,
) -> Result<Json<ConsolidationResponse>, ApiError> {
    caller.authorize(&state.permissions, resources::CONSOLIDATIONS, Action::Update)?;

    if payload.tier.is_none() && payload.status.is_none() && payload.notes.is_none() {
        return Err(ApiError::Validation("No fields to update".to_string()));
    }

    let consolidation = load_visible_consolidation(&state, &caller, id).await?;

    let next_status = payload
        .status
        .as_deref()
        .map(|requested| {
            transition_from_str::<ConsolidationStatus>(&consolidation.status, requested)
        })
        .transpose()?;

    let tier = payload
        .tier
        .as_deref()
        .map(str::parse::<ConsolidationTier>)
        .transpose()?;

    if tier.is_some() && is_completed(&consolidation) {
        return Err(ApiError::Conflict(
            "Cannot change the tier of a completed consolidation".to_string(),
        ));
    }

    let previous_status = consolidation.status.clone();
    let mut active = consolidation.into_active_model();
    if let Some(status) = next_status {
        active.status = Set(status.to_string());
    }
    if let Some(tier) = tier {
        active.tier = Set(tier.to_string());
    }
    if let Some(notes) = payload.notes {
        active.notes = Set(Some(notes));
    }
    active.updated_at = Set(Utc::now().into());

    let updated = active.update(state.db()).await?;

    tracing::info!(
        consolidation_id = updated.id,
        from = %previous_status,
        to = %updated.status,
        tier = %updated.tier,
        "Consolidation updated"
    );

    Ok(Json(updated.into()))
}

pub async fn delete_consolidation(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    caller.authorize(&state.permissions, resources::CONSOLIDATIONS, Action::Delete)?;

    let consolidation = load_visible_consolidation(&state, &caller, id).await?;

    let txn = state.db().begin().await?;
    // Orders survive; they just leave the consolidation
    Orders::update_many()
        .col_expr(orders::Column::ConsolidationId, Expr::value(Option::<i32>::None))
        .filter(orders::Column::ConsolidationId.eq(id))
        .exec(&txn)
        .await?;
    consolidation.delete(&txn).await?;
    txn.commit().await?;

    tracing::info!(consolidation_id = id, "Consolidation deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/consolidations/{id}/orders
pub async fn attach_orders(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<i32>,
    Json(payload): Json<AttachOrdersRequest>,
) -> Result<Json<ConsolidationResponse>, ApiError> {
    caller.authorize(&state.permissions, resources::CONSOLIDATIONS, Action::Update)?;

    let order_ids: Vec<i32> = payload
        .order_ids
        .iter()
        .copied()
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();

    if order_ids.is_empty() {
        return Err(ApiError::Validation("orderIds cannot be empty".to_string()));
    }
    if order_ids.len() > MAX_ATTACH_BATCH {
        return Err(ApiError::Validation(format!(
            "Cannot attach more than {} orders at once",
            MAX_ATTACH_BATCH
        )));
    }

    let consolidation = load_visible_consolidation(&state, &caller, id).await?;
    if is_completed(&consolidation) {
        return Err(ApiError::Conflict(
            "Cannot attach orders to a completed consolidation".to_string(),
        ));
    }

    let found = Orders::find()
        .filter(orders::Column::Id.is_in(order_ids.clone()))
        .all(state.db())
        .await?;

    check_attachable(id, &order_ids, &found)?;

    let txn = state.db().begin().await?;
    // Only claim orders that are still free (or already ours); a concurrent
    // attach elsewhere shows up as a short row count.
    let claimed = Orders::update_many()
        .col_expr(orders::Column::ConsolidationId, Expr::value(Some(id)))
        .col_expr(orders::Column::UpdatedAt, Expr::current_timestamp().into())
        .filter(orders::Column::Id.is_in(order_ids.clone()))
        .filter(
            Condition::any()
                .add(orders::Column::ConsolidationId.is_null())
                .add(orders::Column::ConsolidationId.eq(id)),
        )
        .exec(&txn)
        .await?;
    if claimed.rows_affected != order_ids.len() as u64 {
        txn.rollback().await?;
        tracing::warn!(
            consolidation_id = id,
            requested = order_ids.len(),
            claimed = claimed.rows_affected,
            "Orders were attached elsewhere concurrently"
        );
        return Err(ApiError::Conflict(
            "Orders already belong to another consolidation".to_string(),
        ));
    }
    let updated = recompute_amount(&txn, id).await?;
    txn.commit().await?;

    tracing::info!(
        consolidation_id = id,
        attached = order_ids.len(),
        amount = %updated.amount,
        "Orders attached to consolidation"
    );

    Ok(Json(updated.into()))
}

/// DELETE /api/consolidations/{id}/orders/{order_id}
pub async fn detach_order(
    State(state): State<AppState>,
    caller: Caller,
    Path((id, order_id)): Path<(i32, i32)>,
) -> Result<Json<ConsolidationResponse>, ApiError> {
    caller.authorize(&state.permissions, resources::CONSOLIDATIONS, Action::Update)?;

    let consolidation = load_visible_consolidation(&state, &caller, id).await?;
    if is_completed(&consolidation) {
        return Err(ApiError::Conflict(
            "Cannot detach orders from a completed consolidation".to_string(),
        ));
    }

    let order = find_by_id_or_404::<Orders, _>(state.db(), order_id).await?;
    if order.consolidation_id != Some(id) {
        return Err(ApiError::NotFound(format!(
            "Order {} is not part of consolidation {}",
            order_id, id
        )));
    }

    let txn = state.db().begin().await?;
    let mut active = order.into_active_model();
    active.consolidation_id = Set(None);
    active.updated_at = Set(Utc::now().into());
    active.update(&txn).await?;
    let updated = recompute_amount(&txn, id).await?;
    txn.commit().await?;

    tracing::info!(consolidation_id = id, order_id, "Order detached from consolidation");

    Ok(Json(updated.into()))
}

/// GET /api/consolidations/{id}/fee
pub async fn get_consolidation_fee(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<i32>,
) -> Result<Json<ConsolidationFeeResponse>, ApiError> {
    caller.authorize(&state.permissions, resources::CONSOLIDATIONS, Action::Read)?;

    let consolidation = load_visible_consolidation(&state, &caller, id).await?;

    let tier: ConsolidationTier = consolidation.tier.parse().map_err(|_| {
        ApiError::Internal(format!(
            "Consolidation {} has unknown tier '{}'",
            id, consolidation.tier
        ))
    })?;

    let fee = state.fees.calculate(consolidation.amount, tier)?;

    Ok(Json(ConsolidationFeeResponse {
        consolidation_id: id,
        consolidation_type: tier.to_string(),
        fee: fee.into(),
    }))
}

async fn load_visible_consolidation(
    state: &AppState,
    caller: &Caller,
    id: i32,
) -> Result<consolidations::Model, ApiError> {
    let consolidation = find_by_id_or_404::<Consolidations, _>(state.db(), id).await?;

    if !scope::can_see_consolidation(state.db(), caller, id).await? {
        return Err(ApiError::NotFound(format!("Consolidation {} not found", id)));
    }

    Ok(consolidation)
}

fn is_completed(consolidation: &consolidations::Model) -> bool {
    consolidation
        .status
        .parse::<ConsolidationStatus>()
        .map(|s| s.is_terminal())
        .unwrap_or(false)
}

/// Every requested order must exist and be free or already ours
fn check_attachable(
    consolidation_id: i32,
    requested: &[i32],
    found: &[orders::Model],
) -> Result<(), ApiError> {
    let found_ids: HashSet<i32> = found.iter().map(|o| o.id).collect();
    let mut missing: Vec<i32> = requested
        .iter()
        .copied()
        .filter(|id| !found_ids.contains(id))
        .collect();
    if !missing.is_empty() {
        missing.sort_unstable();
        return Err(ApiError::Validation(format!(
            "Orders do not exist: {:?}",
            missing
        )));
    }

    let mut taken: Vec<i32> = found
        .iter()
        .filter(|o| o.consolidation_id.is_some_and(|c| c != consolidation_id))
        .map(|o| o.id)
        .collect();
    if !taken.is_empty() {
        taken.sort_unstable();
        return Err(ApiError::Conflict(format!(
            "Orders already belong to another consolidation: {:?}",
            taken
        )));
    }

    Ok(())
}
