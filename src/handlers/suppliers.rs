//! Supplier CRUD handlers
//!
//! Every role may browse suppliers; suppliers may edit only the profiles they
//! own, and only admins flip `verified`.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, EntityTrait, IntoActiveModel, ModelTrait, QueryOrder, Set,
};

use crate::auth::Caller;
use crate::entities::{prelude::*, suppliers};
use crate::error::ApiError;
use crate::models::common::{non_empty, ListQuery, ListResponse};
use crate::models::supplier::{
    validate_email, CreateSupplierRequest, SupplierResponse, UpdateSupplierRequest,
};
use crate::services::access_policy::{resources, Action, Role};
use crate::services::repository::{fetch_page, find_by_id_or_404};
use crate::AppState;

const DEFAULT_COUNTRY: &str = "Turkey";

pub async fn list_suppliers(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse<SupplierResponse>>, ApiError> {
    caller.authorize(&state.permissions, resources::SUPPLIERS, Action::Read)?;
    query.validate().map_err(ApiError::Validation)?;

    let select = Suppliers::find().order_by_asc(suppliers::Column::CompanyName);
    let (items, total) = fetch_page(state.db(), select, &query).await?;

    Ok(Json(ListResponse {
        items: items.into_iter().map(SupplierResponse::from).collect(),
        total,
        limit: query.limit(),
        offset: query.offset(),
    }))
}

pub async fn get_supplier(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<i32>,
) -> Result<Json<SupplierResponse>, ApiError> {
    caller.authorize(&state.permissions, resources::SUPPLIERS, Action::Read)?;

    let supplier = find_by_id_or_404::<Suppliers, _>(state.db(), id).await?;

    Ok(Json(supplier.into()))
}

pub async fn create_supplier(
    State(state): State<AppState>,
    caller: Caller,
    Json(payload): Json<CreateSupplierRequest>,
) -> Result<(StatusCode, Json<SupplierResponse>), ApiError> {
    caller.authorize(&state.permissions, resources::SUPPLIERS, Action::Create)?;

    let company_name = non_empty(&payload.company_name, "companyName").map_err(ApiError::Validation)?;
    let city = non_empty(&payload.city, "city").map_err(ApiError::Validation)?;
    validate_email(&payload.contact_email).map_err(ApiError::Validation)?;

    let country = payload
        .country
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_COUNTRY)
        .to_string();

    let now = Utc::now();
    let supplier = suppliers::ActiveModel {
        owner_id: Set(payload.owner_id),
        company_name: Set(company_name),
        contact_email: Set(payload.contact_email.trim().to_string()),
        phone: Set(payload.phone),
        city: Set(city),
        country: Set(country),
        verified: Set(false),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    }
    .insert(state.db())
    .await?;

    tracing::info!(
        supplier_id = supplier.id,
        owner_id = %supplier.owner_id,
        company = %supplier.company_name,
        "Supplier created"
    );

    Ok((StatusCode::CREATED, Json(supplier.into())))
}

pub async fn update_supplier(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateSupplierRequest>,
) -> Result<Json<SupplierResponse>, ApiError> {
    caller.authorize(&state.permissions, resources::SUPPLIERS, Action::Update)?;

    let supplier = find_by_id_or_404::<Suppliers, _>(state.db(), id).await?;

    if caller.role == Role::Supplier && supplier.owner_id != caller.user_id {
        return Err(ApiError::Forbidden(
            "Suppliers can only edit their own profile".to_string(),
        ));
    }
    if payload.verified.is_some() && !caller.is_admin() {
        return Err(ApiError::Forbidden(
            "Only admins can change verification".to_string(),
        ));
    }

    let mut active = supplier.into_active_model();
    if let Some(name) = payload.company_name.as_deref() {
        active.company_name = Set(non_empty(name, "companyName").map_err(ApiError::Validation)?);
    }
    if let Some(email) = payload.contact_email.as_deref() {
        validate_email(email).map_err(ApiError::Validation)?;
        active.contact_email = Set(email.trim().to_string());
    }
    if let Some(phone) = payload.phone {
        active.phone = Set(Some(phone));
    }
    if let Some(city) = payload.city.as_deref() {
        active.city = Set(non_empty(city, "city").map_err(ApiError::Validation)?);
    }
    if let Some(country) = payload.country.as_deref() {
        active.country = Set(non_empty(country, "country").map_err(ApiError::Validation)?);
    }
    if let Some(verified) = payload.verified {
        active.verified = Set(verified);
    }
    active.updated_at = Set(Utc::now().into());

    let updated = active.update(state.db()).await?;

    tracing::info!(supplier_id = updated.id, "Supplier updated");

    Ok(Json(updated.into()))
}

pub async fn delete_supplier(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    caller.authorize(&state.permissions, resources::SUPPLIERS, Action::Delete)?;

    let supplier = find_by_id_or_404::<Suppliers, _>(state.db(), id).await?;

    let has_orders = supplier
        .find_related(Orders)
        .one(state.db())
        .await?
        .is_some();
    if has_orders {
        return Err(ApiError::Conflict(format!(
            "Supplier {} still has orders",
            id
        )));
    }

    supplier.delete(state.db()).await?;

    tracing::info!(supplier_id = id, "Supplier deleted");

    Ok(StatusCode::NO_CONTENT)
}
