//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use axum::{
    Json, Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

pub use zenstee::db::{AppState, queries};
use zenstee::config::{EmailConfig, RazorpayConfig, SmtpTls};
use zenstee::email::EmailService;
use zenstee::models::{CreateProduct, Product};
use zenstee::payments::{RazorpayClient, payment_signature};

pub const TEST_KEY_ID: &str = "rzp_test_key123";
pub const TEST_KEY_SECRET: &str = "rzp_test_secret456";

/// An app backed by a throwaway SQLite file. The directory is removed on drop.
pub struct TestApp {
    pub state: AppState,
    pub uploads_dir: std::path::PathBuf,
    _dir: TempDir,
}

impl TestApp {
    pub fn router(&self) -> Router {
        zenstee::app(self.state.clone(), &self.uploads_dir)
    }

    pub fn conn(&self) -> r2d2::PooledConnection<SqliteConnectionManager> {
        self.state.db.get().unwrap()
    }
}

fn build_test_app(payments: Option<RazorpayClient>, email: EmailService) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let manager = SqliteConnectionManager::file(dir.path().join("test.db"));
    let pool = Pool::builder().max_size(4).build(manager).unwrap();
    {
        let conn = pool.get().unwrap();
        zenstee::db::init_db(&conn).unwrap();
    }

    let uploads_dir = dir.path().join("uploads");
    std::fs::create_dir_all(&uploads_dir).unwrap();

    TestApp {
        state: AppState {
            db: pool,
            payments,
            email,
        },
        uploads_dir,
        _dir: dir,
    }
}

/// Gateway pointed at an unroutable address; fine for signature checks.
pub fn test_gateway() -> RazorpayClient {
    gateway_at("http://127.0.0.1:9")
}

pub fn gateway_at(api_base: &str) -> RazorpayClient {
    RazorpayClient::new(&RazorpayConfig {
        key_id: TEST_KEY_ID.to_string(),
        key_secret: TEST_KEY_SECRET.to_string(),
        api_base: api_base.to_string(),
    })
}

pub fn create_test_app() -> TestApp {
    build_test_app(Some(test_gateway()), EmailService::disabled("Zenstee".into()))
}

pub fn create_test_app_with(payments: Option<RazorpayClient>, email: EmailService) -> TestApp {
    build_test_app(payments, email)
}

/// Email service aimed at a port nothing listens on, so every send fails.
pub fn unreachable_email_service() -> EmailService {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let config = EmailConfig {
        host: "127.0.0.1".into(),
        port,
        tls: SmtpTls::None,
        username: None,
        password: None,
        from_address: "orders@zenstee.test".into(),
    };
    EmailService::new(Some(&config), Some("admin@zenstee.test".into()), "Zenstee".into()).unwrap()
}

pub fn sign(order_id: &str, payment_id: &str) -> String {
    payment_signature(TEST_KEY_SECRET, order_id, payment_id).unwrap()
}

pub fn create_test_product(conn: &rusqlite::Connection, name: &str, price: f64) -> Product {
    let input = CreateProduct {
        name: Some(name.to_string()),
        price: Some(price),
        description: Some("Hand-printed organic cotton".into()),
        images: Some(vec![format!("/uploads/{}.png", name.to_lowercase().replace(' ', "-"))]),
        category: None,
        stock: Some(10),
        sizes: Some(vec!["S".into(), "M".into(), "L".into()]),
        in_stock: None,
    }
    .validate()
    .unwrap();
    queries::create_product(conn, &input).unwrap()
}

pub fn count_orders(conn: &rusqlite::Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM orders", [], |row| row.get(0))
        .unwrap()
}

pub fn customer_json() -> Value {
    json!({
        "name": "Asha Rao",
        "email": "asha@example.com",
        "phone": "9876543210",
        "address": "12 MG Road, Bengaluru"
    })
}

pub fn verify_body(order_id: &str, payment_id: &str, signature: &str) -> Value {
    json!({
        "razorpay_order_id": order_id,
        "razorpay_payment_id": payment_id,
        "razorpay_signature": signature,
        "customerDetails": customer_json(),
        "amount": 149900,
        "items": [
            { "_id": "prod-1", "name": "Lotus Tee", "price": 999, "size": "M", "quantity": 1 },
            { "id": "prod-2", "name": "Mandala Tee", "price": "500", "image": "/uploads/mandala.png" }
        ]
    })
}

// ============ Request helpers ============

pub async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).expect("Response should be valid JSON")
}

pub async fn body_text(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

// ============ Mock gateway ============

/// How the mock gateway answers `POST /v1/orders`.
#[derive(Clone, Copy)]
pub enum GatewayBehavior {
    Accept,
    RejectAuth,
}

async fn mock_create_order(
    axum::extract::State(behavior): axum::extract::State<GatewayBehavior>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Basic "));

    match behavior {
        GatewayBehavior::Accept if authorized => Json(json!({
            "id": "order_Mock123",
            "entity": "order",
            "amount": body["amount"],
            "amount_paid": 0,
            "amount_due": body["amount"],
            "currency": body["currency"],
            "receipt": body["receipt"],
            "status": "created",
            "attempts": 0
        }))
        .into_response(),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": {
                    "code": "BAD_REQUEST_ERROR",
                    "description": "Authentication failed"
                }
            })),
        )
            .into_response(),
    }
}

/// Start a local stand-in for the gateway API and return its base URL.
pub async fn spawn_mock_gateway(behavior: GatewayBehavior) -> String {
    let app = Router::new()
        .route("/v1/orders", post(mock_create_order))
        .with_state(behavior);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}
