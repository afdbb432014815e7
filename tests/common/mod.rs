#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use chrono::Utc;
use consolidation_backend::{
    app,
    entities::{consolidations, orders},
    services::{access_policy::PermissionTable, fee_calculator::FeeCalculator},
    AppState,
};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, Transaction};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

/// Mock connection with no prepared results.
/// Any handler that reaches the database gets an error back.
pub fn empty_db() -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres).into_connection()
}

/// Router over the default permission table and fee schedule
pub fn build_test_router(db: DatabaseConnection) -> Router {
    app(AppState::new(db, PermissionTable::default(), FeeCalculator::default()))
}

/// Router plus a handle on its connection, for reading the mock's log
/// once the router has been consumed
pub fn build_shared_router(db: DatabaseConnection) -> (Router, Arc<DatabaseConnection>) {
    let state = AppState::new(db, PermissionTable::default(), FeeCalculator::default());
    let db = state.db.clone();
    (app(state), db)
}

pub fn transaction_log(db: Arc<DatabaseConnection>) -> Vec<Transaction> {
    Arc::try_unwrap(db)
        .ok()
        .expect("router still holds the connection")
        .into_transaction_log()
}

/// Amounts written to the consolidations table, in statement order
pub fn stored_consolidation_amounts(log: &[Transaction]) -> Vec<Decimal> {
    log.iter()
        .flat_map(|txn| txn.statements())
        .filter(|stmt| stmt.sql.starts_with(r#"UPDATE "consolidations""#))
        .filter_map(|stmt| stmt.values.as_ref())
        .flat_map(|values| values.0.iter())
        .filter_map(|value| match value {
            sea_orm::Value::Decimal(Some(d)) => Some(**d),
            _ => None,
        })
        .collect()
}

pub fn sample_consolidation(id: i32, status: &str, amount: Decimal) -> consolidations::Model {
    let now = Utc::now().into();
    consolidations::Model {
        id,
        admin_id: Uuid::new_v4(),
        amount,
        tier: "regular".to_string(),
        status: status.to_string(),
        notes: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn sample_order(id: i32, buyer_id: Uuid, status: &str, amount: Decimal) -> orders::Model {
    let now = Utc::now().into();
    orders::Model {
        id,
        buyer_id,
        supplier_id: 1,
        consolidation_id: None,
        amount,
        currency: "USD".to_string(),
        status: status.to_string(),
        shipping_address: Some("Ataturk Cd. 12, Izmir".to_string()),
        tracking_reference: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn attached(mut order: orders::Model, consolidation_id: i32) -> orders::Model {
    order.consolidation_id = Some(consolidation_id);
    order
}

/// Send a request and return status plus parsed JSON body (Null when empty)
pub async fn send(app: Router, request: Request<Body>) -> (axum::http::StatusCode, Value) {
    let response: Response<Body> = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn as_user(
    method: &str,
    uri: &str,
    user_id: Uuid,
    role: &str,
    body: Option<Value>,
) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-user-id", user_id.to_string())
        .header("x-user-role", role);

    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}
