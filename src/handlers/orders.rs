//! Order CRUD handlers
//!
//! GET/POST /api/orders, GET/PATCH/DELETE /api/orders/{id}

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, ModelTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

use crate::auth::Caller;
use crate::entities::{orders, prelude::*};
use crate::error::ApiError;
use crate::models::common::{check_money, normalize_currency, ListQuery, ListResponse};
use crate::models::lifecycle::{transition_from_str, Lifecycle, OrderStatus};
use crate::models::order::{CreateOrderRequest, OrderResponse, UpdateOrderRequest};
use crate::services::access_policy::{resources, Action, Role};
use crate::services::consolidation::recompute_amount;
use crate::services::repository::{fetch_page, find_by_id_or_404};
use crate::services::scope;
use crate::AppState;

pub async fn list_orders(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse<OrderResponse>>, ApiError> {
    caller.authorize(&state.permissions, resources::ORDERS, Action::Read)?;
    query.validate().map_err(ApiError::Validation)?;

    let mut select = Orders::find().filter(scope::order_condition(state.db(), &caller).await?);

    if let Some(status) = query.status.as_deref() {
        let status: OrderStatus = status.parse()?;
        select = select.filter(orders::Column::Status.eq(status.to_string()));
    }

    let select = select
        .order_by_desc(orders::Column::CreatedAt)
        .order_by_desc(orders::Column::Id);

    let (items, total) = fetch_page(state.db(), select, &query).await?;

    tracing::debug!(
        user_id = %caller.user_id,
        role = %caller.role,
        count = items.len(),
        total,
        "Listed orders"
    );

    Ok(Json(ListResponse {
        items: items.into_iter().map(OrderResponse::from).collect(),
        total,
        limit: query.limit(),
        offset: query.offset(),
    }))
}

pub async fn get_order(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<i32>,
) -> Result<Json<OrderResponse>, ApiError> {
    caller.authorize(&state.permissions, resources::ORDERS, Action::Read)?;

    let order = load_visible_order(&state, &caller, id).await?;

    Ok(Json(order.into()))
}

pub async fn create_order(
    State(state): State<AppState>,
    caller: Caller,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    caller.authorize(&state.permissions, resources::ORDERS, Action::Create)?;

    let buyer_id = match (caller.role, payload.buyer_id) {
        (Role::Admin, Some(buyer_id)) => buyer_id,
        (Role::Admin, None) => {
            return Err(ApiError::Validation("buyerId is required".to_string()));
        }
        (_, Some(buyer_id)) if buyer_id != caller.user_id => {
            return Err(ApiError::Forbidden(
                "Orders can only be placed for yourself".to_string(),
            ));
        }
        _ => caller.user_id,
    };

    validate_amount(payload.amount)?;
    let currency = normalize_currency(payload.currency.as_deref()).map_err(ApiError::Validation)?;

    if Suppliers::find_by_id(payload.supplier_id)
        .one(state.db())
        .await?
        .is_none()
    {
        return Err(ApiError::Validation(format!(
            "Supplier {} does not exist",
            payload.supplier_id
        )));
    }

    let now = Utc::now();
    let order = orders::ActiveModel {
        buyer_id: Set(buyer_id),
        supplier_id: Set(payload.supplier_id),
        consolidation_id: Set(None),
        amount: Set(payload.amount),
        currency: Set(currency),
        status: Set(OrderStatus::initial().to_string()),
        shipping_address: Set(payload.shipping_address),
        tracking_reference: Set(payload.tracking_reference),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    }
    .insert(state.db())
    .await?;

    tracing::info!(
        order_id = order.id,
        buyer_id = %order.buyer_id,
        supplier_id = order.supplier_id,
        amount = %order.amount,
        "Order created"
    );

    Ok((StatusCode::CREATED, Json(order.into())))
}

pub async fn update_order(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateOrderRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    caller.authorize(&state.permissions, resources::ORDERS, Action::Update)?;

    if payload.is_empty() {
        return Err(ApiError::Validation("No fields to update".to_string()));
    }

    let order = load_visible_order(&state, &caller, id).await?;
    check_editable_fields(caller.role, &payload)?;

    let next_status = payload
        .status
        .as_deref()
        .map(|requested| transition_from_str::<OrderStatus>(&order.status, requested))
        .transpose()?;

    if let Some(amount) = payload.amount {
        validate_amount(amount)?;
        if amount != order.amount && order.status != OrderStatus::Pending.to_string() {
            return Err(ApiError::Conflict(
                "Order amount can only change while the order is pending".to_string(),
            ));
        }
    }

    let previous_status = order.status.clone();
    let amount_changed = payload.amount.is_some_and(|a| a != order.amount);
    let consolidation_id = order.consolidation_id;

    let mut active = order.into_active_model();
    if let Some(status) = next_status {
        active.status = Set(status.to_string());
    }
    if let Some(amount) = payload.amount {
        active.amount = Set(amount);
    }
    if let Some(address) = payload.shipping_address {
        active.shipping_address = Set(Some(address));
    }
    if let Some(tracking) = payload.tracking_reference {
        active.tracking_reference = Set(Some(tracking));
    }
    active.updated_at = Set(Utc::now().into());

    let txn = state.db().begin().await?;
    let updated = active.update(&txn).await?;
    if let (true, Some(consolidation_id)) = (amount_changed, consolidation_id) {
        recompute_amount(&txn, consolidation_id).await?;
    }
    txn.commit().await?;

    tracing::info!(
        order_id = updated.id,
        from = %previous_status,
        to = %updated.status,
        "Order updated"
    );

    Ok(Json(updated.into()))
}

pub async fn delete_order(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    caller.authorize(&state.permissions, resources::ORDERS, Action::Delete)?;

    let order = load_visible_order(&state, &caller, id).await?;
    let consolidation_id = order.consolidation_id;

    let txn = state.db().begin().await?;
    order.delete(&txn).await?;
    if let Some(consolidation_id) = consolidation_id {
        recompute_amount(&txn, consolidation_id).await?;
    }
    txn.commit().await?;

    tracing::info!(order_id = id, "Order deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Orders outside the caller's scope look exactly like missing ones
async fn load_visible_order(
    state: &AppState,
    caller: &Caller,
    id: i32,
) -> Result<orders::Model, ApiError> {
    let order = find_by_id_or_404::<Orders, _>(state.db(), id).await?;

    if !scope::can_see_order(state.db(), caller, &order).await? {
        return Err(ApiError::NotFound(format!("Order {} not found", id)));
    }

    Ok(order)
}

fn validate_amount(amount: Decimal) -> Result<(), ApiError> {
    if amount < Decimal::ZERO {
        return Err(ApiError::Validation(
            "Order amount cannot be negative".to_string(),
        ));
    }
    check_money(amount, "amount").map_err(ApiError::Validation)
}

/// Buyers edit what they ordered, suppliers edit fulfilment
fn check_editable_fields(role: Role, payload: &UpdateOrderRequest) -> Result<(), ApiError> {
    let forbidden: Vec<&str> = match role {
        Role::Admin => vec![],
        Role::Customer => [
            payload.status.as_ref().map(|_| "status"),
            payload.tracking_reference.as_ref().map(|_| "trackingReference"),
        ]
        .into_iter()
        .flatten()
        .collect(),
        Role::Supplier => [
            payload.amount.as_ref().map(|_| "amount"),
            payload.shipping_address.as_ref().map(|_| "shippingAddress"),
        ]
        .into_iter()
        .flatten()
        .collect(),
    };

    if forbidden.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Forbidden(format!(
            "Role {} may not change {}",
            role,
            forbidden.join(", ")
        )))
    }
}
