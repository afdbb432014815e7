mod common;

use axum::http::StatusCode;
use rust_decimal_macros::dec;
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
use serde_json::json;
use uuid::Uuid;

use crate::common::{
    as_user, attached, build_shared_router, sample_consolidation, sample_order, send,
    stored_consolidation_amounts, transaction_log,
};

#[tokio::test]
async fn test_attach_stores_sum_of_orders() {
    let buyer = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        // target consolidation
        .append_query_results([vec![sample_consolidation(5, "pending", dec!(0))]])
        // requested orders, both free
        .append_query_results([vec![
            sample_order(1, buyer, "pending", dec!(100.00)),
            sample_order(2, buyer, "in_transit", dec!(250.50)),
        ]])
        // recompute: consolidation, attached orders, updated row
        .append_query_results([vec![sample_consolidation(5, "pending", dec!(0))]])
        .append_query_results([vec![
            attached(sample_order(1, buyer, "pending", dec!(100.00)), 5),
            attached(sample_order(2, buyer, "in_transit", dec!(250.50)), 5),
        ]])
        .append_query_results([vec![sample_consolidation(5, "pending", dec!(350.50))]])
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 2,
        }])
        .into_connection();
    let (app, db) = build_shared_router(db);

    let (status, json) = send(
        app,
        as_user(
            "POST",
            "/api/consolidations/5/orders",
            Uuid::new_v4(),
            "admin",
            Some(json!({ "orderIds": [1, 2, 2] })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["amount"].as_f64(), Some(350.5));
    assert_eq!(
        stored_consolidation_amounts(&transaction_log(db)),
        vec![dec!(350.50)]
    );
}

#[tokio::test]
async fn test_attach_conflicts_when_order_is_claimed_concurrently() {
    let buyer = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![sample_consolidation(5, "pending", dec!(0))]])
        // both orders looked free when checked
        .append_query_results([vec![
            sample_order(1, buyer, "pending", dec!(100.00)),
            sample_order(2, buyer, "pending", dec!(250.50)),
        ]])
        // but another consolidation took one before the guarded update ran
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .into_connection();
    let (app, db) = build_shared_router(db);

    let (status, json) = send(
        app,
        as_user(
            "POST",
            "/api/consolidations/5/orders",
            Uuid::new_v4(),
            "admin",
            Some(json!({ "orderIds": [1, 2] })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], "Orders already belong to another consolidation");
    assert!(stored_consolidation_amounts(&transaction_log(db)).is_empty());
}

#[tokio::test]
async fn test_attach_rejects_order_owned_elsewhere() {
    let buyer = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![sample_consolidation(5, "pending", dec!(0))]])
        .append_query_results([vec![attached(
            sample_order(1, buyer, "pending", dec!(100.00)),
            9,
        )]])
        .into_connection();
    let (app, db) = build_shared_router(db);

    let (status, _) = send(
        app,
        as_user(
            "POST",
            "/api/consolidations/5/orders",
            Uuid::new_v4(),
            "admin",
            Some(json!({ "orderIds": [1] })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert!(stored_consolidation_amounts(&transaction_log(db)).is_empty());
}

#[tokio::test]
async fn test_detach_stores_remaining_sum() {
    let buyer = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![sample_consolidation(5, "active", dec!(350.50))]])
        .append_query_results([vec![attached(
            sample_order(2, buyer, "pending", dec!(250.50)),
            5,
        )]])
        // detached order row
        .append_query_results([vec![sample_order(2, buyer, "pending", dec!(250.50))]])
        // recompute
        .append_query_results([vec![sample_consolidation(5, "active", dec!(350.50))]])
        .append_query_results([vec![attached(
            sample_order(1, buyer, "pending", dec!(100.00)),
            5,
        )]])
        .append_query_results([vec![sample_consolidation(5, "active", dec!(100.00))]])
        .into_connection();
    let (app, db) = build_shared_router(db);

    let (status, json) = send(
        app,
        as_user(
            "DELETE",
            "/api/consolidations/5/orders/2",
            Uuid::new_v4(),
            "admin",
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["amount"].as_f64(), Some(100.0));
    assert_eq!(
        stored_consolidation_amounts(&transaction_log(db)),
        vec![dec!(100.00)]
    );
}

#[tokio::test]
async fn test_order_delete_stores_remaining_sum() {
    let buyer = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![attached(
            sample_order(2, buyer, "pending", dec!(250.50)),
            5,
        )]])
        .append_query_results([vec![sample_consolidation(5, "active", dec!(350.50))]])
        .append_query_results([vec![attached(
            sample_order(1, buyer, "pending", dec!(100.00)),
            5,
        )]])
        .append_query_results([vec![sample_consolidation(5, "active", dec!(100.00))]])
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .into_connection();
    let (app, db) = build_shared_router(db);

    let (status, _) = send(
        app,
        as_user("DELETE", "/api/orders/2", Uuid::new_v4(), "admin", None),
    )
    .await;

    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(
        stored_consolidation_amounts(&transaction_log(db)),
        vec![dec!(100.00)]
    );
}

#[tokio::test]
async fn test_order_amount_change_stores_new_sum() {
    let buyer = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![attached(
            sample_order(1, buyer, "pending", dec!(100.00)),
            5,
        )]])
        // updated order row
        .append_query_results([vec![attached(
            sample_order(1, buyer, "pending", dec!(300.00)),
            5,
        )]])
        // recompute
        .append_query_results([vec![sample_consolidation(5, "active", dec!(350.50))]])
        .append_query_results([vec![
            attached(sample_order(1, buyer, "pending", dec!(300.00)), 5),
            attached(sample_order(2, buyer, "pending", dec!(250.50)), 5),
        ]])
        .append_query_results([vec![sample_consolidation(5, "active", dec!(550.50))]])
        .into_connection();
    let (app, db) = build_shared_router(db);

    let (status, json) = send(
        app,
        as_user(
            "PATCH",
            "/api/orders/1",
            buyer,
            "customer",
            Some(json!({ "amount": 300 })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["amount"].as_f64(), Some(300.0));
    assert_eq!(
        stored_consolidation_amounts(&transaction_log(db)),
        vec![dec!(550.50)]
    );
}
