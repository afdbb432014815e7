//! Product catalogue handlers

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
use crate::entities::{prelude::*, products};
use crate::error::ApiError;
use crate::models::common::{check_money, non_empty, normalize_currency, ListQuery, ListResponse};
use crate::models::product::{
    CreateProductRequest, ProductFilter, ProductResponse, UpdateProductRequest,
};
use crate::services::access_policy::{resources, Action, Role};
use crate::services::repository::{fetch_page, find_by_id_or_404};
use crate::services::scope;
use crate::AppState;

pub async fn list_products(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<ListQuery>,
    Query(filter): Query<ProductFilter>,
) -> Result<Json<ListResponse<ProductResponse>>, ApiError> {
    caller.authorize(&state.permissions, resources::PRODUCTS, Action::Read)?;
    query.validate().map_err(ApiError::Validation)?;

    let mut select = Products::find();
    if let Some(supplier_id) = filter.supplier_id {
        select = select.filter(products::Column::SupplierId.eq(supplier_id));
    }
    if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        select = select.filter(products::Column::Name.contains(search));
    }

    let select = select.order_by_asc(products::Column::Name);
    let (items, total) = fetch_page(state.db(), select, &query).await?;

    Ok(Json(ListResponse {
        items: items.into_iter().map(ProductResponse::from).collect(),
        total,
        limit: query.limit(),
        offset: query.offset(),
    }))
}

pub async fn get_product(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<i32>,
) -> Result<Json<ProductResponse>, ApiError> {
    caller.authorize(&state.permissions, resources::PRODUCTS, Action::Read)?;

    let product = find_by_id_or_404::<Products, _>(state.db(), id).await?;

    Ok(Json(product.into()))
}

pub async fn create_product(
    State(state): State<AppState>,
    caller: Caller,
    Json(payload): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiError> {
    caller.authorize(&state.permissions, resources::PRODUCTS, Action::Create)?;

    let name = non_empty(&payload.name, "name").map_err(ApiError::Validation)?;
    validate_price(payload.unit_price)?;
    let min_order_quantity = validate_moq(payload.min_order_quantity.unwrap_or(1))?;
    let currency = normalize_currency(payload.currency.as_deref()).map_err(ApiError::Validation)?;

    let supplier_id = match caller.role {
        Role::Supplier => {
            let owned = scope::owned_supplier_ids(state.db(), &caller).await?;
            pick_supplier(payload.supplier_id, &owned)?
        }
        _ => {
            let supplier_id = payload
                .supplier_id
                .ok_or_else(|| ApiError::Validation("supplierId is required".to_string()))?;
            if Suppliers::find_by_id(supplier_id).one(state.db()).await?.is_none() {
                return Err(ApiError::Validation(format!(
                    "Supplier {} does not exist",
                    supplier_id
                )));
            }
            supplier_id
        }
    };

    let now = Utc::now();
    let product = products::ActiveModel {
        supplier_id: Set(supplier_id),
        name: Set(name),
        description: Set(payload.description),
        unit_price: Set(payload.unit_price),
        currency: Set(currency),
        min_order_quantity: Set(min_order_quantity),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    }
    .insert(state.db())
    .await?;

    tracing::info!(
        product_id = product.id,
        supplier_id = product.supplier_id,
        "Product created"
    );

    Ok((StatusCode::CREATED, Json(product.into())))
}

pub async fn update_product(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<Json<ProductResponse>, ApiError> {
    caller.authorize(&state.permissions, resources::PRODUCTS, Action::Update)?;

    if payload.is_empty() {
        return Err(ApiError::Validation("No fields to update".to_string()));
    }

    let product = load_editable_product(&state, &caller, id).await?;

    let mut active = product.into_active_model();
    if let Some(name) = payload.name.as_deref() {
        active.name = Set(non_empty(name, "name").map_err(ApiError::Validation)?);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(price) = payload.unit_price {
        validate_price(price)?;
        active.unit_price = Set(price);
    }
    if let Some(currency) = payload.currency.as_deref() {
        active.currency = Set(normalize_currency(Some(currency)).map_err(ApiError::Validation)?);
    }
    if let Some(moq) = payload.min_order_quantity {
        active.min_order_quantity = Set(validate_moq(moq)?);
    }
    active.updated_at = Set(Utc::now().into());

    let updated = active.update(state.db()).await?;

    tracing::info!(product_id = updated.id, "Product updated");

    Ok(Json(updated.into()))
}

pub async fn delete_product(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    caller.authorize(&state.permissions, resources::PRODUCTS, Action::Delete)?;

    let product = load_editable_product(&state, &caller, id).await?;
    product.delete(state.db()).await?;

    tracing::info!(product_id = id, "Product deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Suppliers may only touch products of profiles they own
async fn load_editable_product(
    state: &AppState,
    caller: &Caller,
    id: i32,
) -> Result<products::Model, ApiError> {
    let product = find_by_id_or_404::<Products, _>(state.db(), id).await?;

    if caller.role == Role::Supplier {
        let owned = scope::owned_supplier_ids(state.db(), caller).await?;
        if !owned.contains(&product.supplier_id) {
            return Err(ApiError::Forbidden(
                "Suppliers can only edit their own products".to_string(),
            ));
        }
    }

    Ok(product)
}

/// Resolve which owned supplier profile a new product belongs to
fn pick_supplier(requested: Option<i32>, owned: &[i32]) -> Result<i32, ApiError> {
    match (requested, owned) {
        (_, []) => Err(ApiError::Forbidden(
            "No supplier profile linked to this account".to_string(),
        )),
        (Some(id), owned) if owned.contains(&id) => Ok(id),
        (Some(id), _) => Err(ApiError::Forbidden(format!(
            "Supplier {} is not linked to this account",
            id
        ))),
        (None, [only]) => Ok(*only),
        (None, _) => Err(ApiError::Validation(
            "supplierId is required when the account has several supplier profiles".to_string(),
        )),
    }
}

fn validate_price(price: Decimal) -> Result<(), ApiError> {
    if price < Decimal::ZERO {
        return Err(ApiError::Validation("unitPrice cannot be negative".to_string()));
    }
    check_money(price, "unitPrice").map_err(ApiError::Validation)
}

fn validate_moq(moq: i32) -> Result<i32, ApiError> {
    if moq < 1 {
        return Err(ApiError::Validation(
            "minOrderQuantity must be at least 1".to_string(),
        ));
    }
    Ok(moq)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_supplier() {
        assert_eq!(pick_supplier(None, &[4]).unwrap(), 4);
        assert_eq!(pick_supplier(Some(5), &[4, 5]).unwrap(), 5);
        assert!(matches!(pick_supplier(None, &[4, 5]), Err(ApiError::Validation(_))));
        assert!(matches!(pick_supplier(Some(9), &[4, 5]), Err(ApiError::Forbidden(_))));
        assert!(matches!(pick_supplier(Some(4), &[]), Err(ApiError::Forbidden(_))));
    }

    #[test]
    fn test_empty_update_detected() {
        assert!(UpdateProductRequest::default().is_empty());
        let rename = UpdateProductRequest {
            name: Some("Hand-woven kilim".to_string()),
            ..Default::default()
        };
        assert!(!rename.is_empty());
    }

    #[test]
    fn test_product_field_validation() {
        assert!(validate_price(Decimal::ZERO).is_ok());
        assert!(validate_price(Decimal::NEGATIVE_ONE).is_err());
        assert!(validate_price(Decimal::new(1999, 3)).is_err());
        assert!(validate_price(Decimal::new(100_000_000_000_000, 0)).is_err());
        assert_eq!(validate_moq(12).unwrap(), 12);
        assert!(validate_moq(0).is_err());
    }
}
