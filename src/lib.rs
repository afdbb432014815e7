// src/lib.rs

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use sea_orm::DatabaseConnection;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use models::common::ErrorResponse;
use services::{access_policy::PermissionTable, fee_calculator::FeeCalculator};

pub mod auth;
pub mod config;
pub mod entities;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;

/// Shared handler state. The connection sits behind an `Arc` since
/// `DatabaseConnection` is not `Clone` when sea-orm's `mock` feature is on.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub permissions: Arc<PermissionTable>,
    pub fees: FeeCalculator,
}

impl AppState {
    pub fn new(db: DatabaseConnection, permissions: PermissionTable, fees: FeeCalculator) -> Self {
        Self {
            db: Arc::new(db),
            permissions: Arc::new(permissions),
            fees,
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

/// Build the HTTP router with CORS, tracing and panic handling
pub fn app(state: AppState) -> Router {
    use handlers::{
        consolidations, dashboard, fee, orders, payments, permission, products, suppliers,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(health))
        .route("/api/fees/calculate", post(fee::calculate_fee))
        .route("/api/permissions/check", post(permission::check_permission))
        .route("/api/permissions/{role}", get(permission::get_role_permissions))
        .route("/api/orders", get(orders::list_orders).post(orders::create_order))
        .route(
            "/api/orders/{id}",
            get(orders::get_order)
                .patch(orders::update_order)
                .delete(orders::delete_order),
        )
        .route(
            "/api/products",
            get(products::list_products).post(products::create_product),
        )
        .route(
            "/api/products/{id}",
            get(products::get_product)
                .patch(products::update_product)
                .delete(products::delete_product),
        )
        .route(
            "/api/suppliers",
            get(suppliers::list_suppliers).post(suppliers::create_supplier),
        )
        .route(
            "/api/suppliers/{id}",
            get(suppliers::get_supplier)
                .patch(suppliers::update_supplier)
                .delete(suppliers::delete_supplier),
        )
        .route(
            "/api/consolidations",
            get(consolidations::list_consolidations).post(consolidations::create_consolidation),
        )
        .route(
            "/api/consolidations/{id}",
            get(consolidations::get_consolidation)
                .patch(consolidations::update_consolidation)
                .delete(consolidations::delete_consolidation),
        )
        .route(
            "/api/consolidations/{id}/orders",
            post(consolidations::attach_orders),
        )
        .route(
            "/api/consolidations/{id}/orders/{order_id}",
            delete(consolidations::detach_order),
        )
        .route(
            "/api/consolidations/{id}/fee",
            get(consolidations::get_consolidation_fee),
        )
        .route(
            "/api/payments",
            get(payments::list_payments).post(payments::create_payment),
        )
        .route(
            "/api/payments/{id}",
            get(payments::get_payment)
                .patch(payments::update_payment)
                .delete(payments::delete_payment),
        )
        .route(
            "/api/dashboard/summary",
            get(dashboard::get_dashboard_summary),
        )
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health() -> &'static str {
    "Consolidation backend is running"
}

fn handle_panic(err: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");

    tracing::error!(panic = detail, "Handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "Internal server error".to_string(),
        }),
    )
        .into_response()
}
