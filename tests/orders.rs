//! Tests for GET /api/orders and the non-API surface (root, health, uploads).

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::json;
use tower::ServiceExt;

mod common;
use common::*;

use zenstee::models::{CustomerDetails, NewOrder, OrderItem, PaymentInfo};

fn new_order(name: &str, payment_id: &str, total: f64) -> NewOrder {
    NewOrder {
        customer_details: CustomerDetails {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone: "9876543210".into(),
            address: "12 MG Road, Bengaluru".into(),
        },
        order_items: vec![OrderItem {
            name: "Lotus Tee".into(),
            quantity: 2,
            image: None,
            price: total / 2.0,
            size: Some("M".into()),
            product_id: None,
        }],
        payment_info: PaymentInfo {
            id: payment_id.to_string(),
            status: "Captured".into(),
        },
        total_amount: total,
        status: "Paid".into(),
    }
}

#[tokio::test]
async fn test_list_orders_empty() {
    let app = create_test_app();

    let response = send(app.router(), "GET", "/api/orders", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn test_list_orders_newest_first() {
    let app = create_test_app();
    {
        let conn = app.conn();
        queries::create_order(&conn, &new_order("Asha", "pay_1", 1000.0)).unwrap();
        queries::create_order(&conn, &new_order("Ravi", "pay_2", 2000.0)).unwrap();
        queries::create_order(&conn, &new_order("Meera", "pay_3", 3000.0)).unwrap();
    }

    let response = send(app.router(), "GET", "/api/orders", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let payments: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["paymentInfo"]["id"].as_str().unwrap())
        .collect();
    assert_eq!(payments, ["pay_3", "pay_2", "pay_1"]);
}

#[tokio::test]
async fn test_order_wire_format() {
    let app = create_test_app();
    let order = queries::create_order(&app.conn(), &new_order("Asha", "pay_1", 1499.0)).unwrap();

    let response = send(app.router(), "GET", "/api/orders", None).await;
    let body = body_json(response).await;
    let listed = &body[0];

    assert_eq!(listed["_id"], order.id);
    assert_eq!(listed["customerDetails"]["name"], "Asha");
    assert_eq!(listed["orderItems"][0]["quantity"], 2);
    assert_eq!(listed["orderItems"][0]["size"], "M");
    assert!(listed["orderItems"][0].get("productId").is_none());
    assert_eq!(listed["paymentInfo"]["status"], "Captured");
    assert_eq!(listed["totalAmount"], 1499.0);
    assert_eq!(listed["status"], "Paid");
    assert!(listed["createdAt"].is_string());
}

#[tokio::test]
async fn test_list_orders_store_failure_returns_server_error() {
    let app = create_test_app();
    app.conn().execute_batch("DROP TABLE orders").unwrap();

    let response = send(app.router(), "GET", "/api/orders", None).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["message"], "Server Error");
}

#[tokio::test]
async fn test_verified_payment_shows_up_in_order_list() {
    let app = create_test_app();
    let signature = sign("order_A1", "pay_B2");

    let response = send(
        app.router(),
        "POST",
        "/api/payment/verify",
        Some(verify_body("order_A1", "pay_B2", &signature)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(app.router(), "GET", "/api/orders", None).await;
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["paymentInfo"]["id"], "pay_B2");
    assert_eq!(body[0]["totalAmount"], 1499.0);
}

// ============ Non-API surface ============

#[tokio::test]
async fn test_root_reports_running() {
    let app = create_test_app();

    let response = send(app.router(), "GET", "/", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "Zenstee Backend API is running");
}

#[tokio::test]
async fn test_health() {
    let app = create_test_app();

    let response = send(app.router(), "GET", "/api/health", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_uploads_are_served_statically() {
    let app = create_test_app();
    std::fs::write(app.uploads_dir.join("lotus.png"), b"not really a png").unwrap();

    let response = send(app.router(), "GET", "/uploads/lotus.png", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "image/png"
    );
    assert_eq!(body_text(response).await, "not really a png");

    let response = send(app.router(), "GET", "/uploads/missing.png", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let app = create_test_app();

    let response = app
        .router()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/products")
                .header("origin", "http://localhost:5173")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .unwrap(),
        "*"
    );
}
