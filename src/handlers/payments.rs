//! Payment CRUD handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, ModelTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::auth::Caller;
use crate::entities::{payments, prelude::*};
use crate::error::ApiError;
use crate::models::common::{check_money, ListQuery, ListResponse};
use crate::models::lifecycle::{transition_from_str, Lifecycle, PaymentStatus};
use crate::models::payment::{
    CreatePaymentRequest, PaymentMethod, PaymentResponse, UpdatePaymentRequest,
};
use crate::services::access_policy::{resources, Action};
use crate::services::repository::{fetch_page, find_by_id_or_404};
use crate::services::scope;
use crate::AppState;

pub async fn list_payments(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse<PaymentResponse>>, ApiError> {
    caller.authorize(&state.permissions, resources::PAYMENTS, Action::Read)?;
    query.validate().map_err(ApiError::Validation)?;

    let mut select = Payments::find();

    if let Some(ids) = scope::visible_consolidation_ids(state.db(), &caller).await? {
        select = select.filter(payments::Column::ConsolidationId.is_in(ids));
    }

    if let Some(status) = query.status.as_deref() {
        let status: PaymentStatus = status.parse()?;
        select = select.filter(payments::Column::Status.eq(status.to_string()));
    }

    let select = select
        .order_by_desc(payments::Column::CreatedAt)
        .order_by_desc(payments::Column::Id);

    let (items, total) = fetch_page(state.db(), select, &query).await?;

    Ok(Json(ListResponse {
        items: items.into_iter().map(PaymentResponse::from).collect(),
        total,
        limit: query.limit(),
        offset: query.offset(),
    }))
}

pub async fn get_payment(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<i32>,
) -> Result<Json<PaymentResponse>, ApiError> {
    caller.authorize(&state.permissions, resources::PAYMENTS, Action::Read)?;

    let payment = load_visible_payment(&state, &caller, id).await?;

    Ok(Json(payment.into()))
}

pub async fn create_payment(
    State(state): State<AppState>,
    caller: Caller,
    Json(payload): Json<CreatePaymentRequest>,
) -> Result<(StatusCode, Json<PaymentResponse>), ApiError> {
    caller.authorize(&state.permissions, resources::PAYMENTS, Action::Create)?;

    if payload.amount <= Decimal::ZERO {
        return Err(ApiError::Validation(
            "Payment amount must be positive".to_string(),
        ));
    }
    check_money(payload.amount, "amount").map_err(ApiError::Validation)?;
    let method: PaymentMethod = payload.method.parse().map_err(ApiError::Validation)?;

    if Consolidations::find_by_id(payload.consolidation_id)
        .one(state.db())
        .await?
        .is_none()
    {
        return Err(ApiError::Validation(format!(
            "Consolidation {} does not exist",
            payload.consolidation_id
        )));
    }

    let now = Utc::now();
    let payment = payments::ActiveModel {
        consolidation_id: Set(payload.consolidation_id),
        amount: Set(payload.amount),
        method: Set(method.to_string()),
        status: Set(PaymentStatus::initial().to_string()),
        notes: Set(payload.notes),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    }
    .insert(state.db())
    .await?;

    tracing::info!(
        payment_id = payment.id,
        consolidation_id = payment.consolidation_id,
        amount = %payment.amount,
        method = %method,
        "Payment recorded"
    );

    Ok((StatusCode::CREATED, Json(payment.into())))
}

pub async fn update_payment(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<i32>,
    Json(payload): Json<UpdatePaymentRequest>,
) -> Result<Json<PaymentResponse>, ApiError> {
    caller.authorize(&state.permissions, resources::PAYMENTS, Action::Update)?;

    if payload.status.is_none() && payload.notes.is_none() {
        return Err(ApiError::Validation("No fields to update".to_string()));
    }

    let payment = load_visible_payment(&state, &caller, id).await?;

    let next_status = payload
        .status
        .as_deref()
        .map(|requested| transition_from_str::<PaymentStatus>(&payment.status, requested))
        .transpose()?;

    let previous_status = payment.status.clone();
    let mut active = payment.into_active_model();
    if let Some(status) = next_status {
        active.status = Set(status.to_string());
    }
    if let Some(notes) = payload.notes {
        active.notes = Set(Some(notes));
    }
    active.updated_at = Set(Utc::now().into());

    let updated = active.update(state.db()).await?;

    tracing::info!(
        payment_id = updated.id,
        from = %previous_status,
        to = %updated.status,
        "Payment updated"
    );

    Ok(Json(updated.into()))
}

pub async fn delete_payment(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    caller.authorize(&state.permissions, resources::PAYMENTS, Action::Delete)?;

    let payment = load_visible_payment(&state, &caller, id).await?;
    payment.delete(state.db()).await?;

    tracing::info!(payment_id = id, "Payment deleted");

    Ok(StatusCode::NO_CONTENT)
}

async fn load_visible_payment(
    state: &AppState,
    caller: &Caller,
    id: i32,
) -> Result<payments::Model, ApiError> {
    let payment = find_by_id_or_404::<Payments, _>(state.db(), id).await?;

    if !scope::can_see_consolidation(state.db(), caller, payment.consolidation_id).await? {
        return Err(ApiError::NotFound(format!("Payment {} not found", id)));
    }

    Ok(payment)
}
