mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::json;

use crate::common::{build_test_router, empty_db, json_request, send};

const FEE_URI: &str = "/api/fees/calculate";

#[tokio::test]
async fn test_regular_fee_is_capped() {
    let app = build_test_router(empty_db());

    let (status, json) = send(
        app,
        json_request("POST", FEE_URI, json!({ "amount": 50000, "consolidationType": "regular" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["originalAmount"].as_f64(), Some(50000.0));
    assert_eq!(json["feePercentage"].as_f64(), Some(2.0));
    assert_eq!(json["feeAmount"].as_f64(), Some(1000.0));
    assert_eq!(json["maxFee"].as_f64(), Some(999.0));
    assert_eq!(json["appliedFee"].as_f64(), Some(999.0));
    assert_eq!(json["totalAmount"].as_f64(), Some(50999.0));
}

#[tokio::test]
async fn test_volume_fee_under_cap() {
    let app = build_test_router(empty_db());

    let (status, json) = send(
        app,
        json_request("POST", FEE_URI, json!({ "amount": 10000, "consolidationType": "volume" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["feePercentage"].as_f64(), Some(1.5));
    assert_eq!(json["appliedFee"].as_f64(), Some(150.0));
    assert_eq!(json["maxFee"].as_f64(), Some(699.0));
    assert_eq!(json["totalAmount"].as_f64(), Some(10150.0));
}

#[tokio::test]
async fn test_first_trial_fee_is_fixed() {
    let app = build_test_router(empty_db());

    let (status, json) = send(
        app,
        json_request("POST", FEE_URI, json!({ "amount": 1000, "consolidationType": "first-trial" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["feePercentage"].as_f64(), Some(0.0));
    assert_eq!(json["feeAmount"].as_f64(), Some(299.0));
    assert!(json["maxFee"].is_null());
    assert_eq!(json["appliedFee"].as_f64(), Some(299.0));
    assert_eq!(json["totalAmount"].as_f64(), Some(1299.0));
}

#[tokio::test]
async fn test_invalid_amounts() {
    for body in [
        json!({ "amount": 0, "consolidationType": "regular" }),
        json!({ "amount": -5, "consolidationType": "volume" }),
        json!({ "consolidationType": "first-trial" }),
        json!({ "amount": "1000", "consolidationType": "regular" }),
    ] {
        let app = build_test_router(empty_db());
        let (status, json) = send(app, json_request("POST", FEE_URI, body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Invalid amount");
    }
}

#[tokio::test]
async fn test_missing_consolidation_type() {
    for body in [json!({ "amount": 100 }), json!({ "amount": 100, "consolidationType": "" })] {
        let app = build_test_router(empty_db());
        let (status, json) = send(app, json_request("POST", FEE_URI, body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Consolidation type is required");
    }
}

#[tokio::test]
async fn test_unknown_consolidation_type() {
    let app = build_test_router(empty_db());

    let (status, json) = send(
        app,
        json_request("POST", FEE_URI, json!({ "amount": 100, "consolidationType": "unknown-tier" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Invalid consolidation type");
}

#[tokio::test]
async fn test_huge_amount_still_capped() {
    let app = build_test_router(empty_db());

    let (status, json) = send(
        app,
        json_request("POST", FEE_URI, json!({ "amount": 5e28, "consolidationType": "regular" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["appliedFee"].as_f64(), Some(999.0));
}

#[tokio::test]
async fn test_unrepresentable_amounts() {
    for amount in [json!(1e30), json!(1e-30)] {
        let app = build_test_router(empty_db());
        let (status, json) = send(
            app,
            json_request("POST", FEE_URI, json!({ "amount": amount, "consolidationType": "volume" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "amount {}", amount);
        assert_eq!(json["error"], "Amount out of range");
    }
}

#[tokio::test]
async fn test_malformed_body() {
    let app = build_test_router(empty_db());

    let request = Request::builder()
        .method("POST")
        .uri(FEE_URI)
        .header("content-type", "application/json")
        .body(Body::from("{ not json"))
        .unwrap();
    let (status, json) = send(app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Invalid request body");
}

#[tokio::test]
async fn test_cors_preflight() {
    let app = build_test_router(empty_db());

    let request = Request::builder()
        .method("OPTIONS")
        .uri(FEE_URI)
        .header("origin", "https://consolidation.example")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type")
        .body(Body::empty())
        .unwrap();

    let response = tower::ServiceExt::oneshot(app, request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );
}

#[tokio::test]
async fn test_cors_header_on_response() {
    let app = build_test_router(empty_db());

    let mut request = json_request("POST", FEE_URI, json!({ "amount": 10, "consolidationType": "regular" }));
    request
        .headers_mut()
        .insert("origin", "https://consolidation.example".parse().unwrap());

    let response = tower::ServiceExt::oneshot(app, request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );
}
