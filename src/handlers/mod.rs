mod orders;
mod payment;
mod products;

pub use orders::*;
pub use payment::*;
pub use products::*;

use axum::{
    Json, Router,
    routing::{get, post},
};
use serde::Serialize;

use crate::db::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Routes mounted under `/api`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        // Checkout
        .route("/payment/create-order", post(create_order))
        .route("/payment/verify", post(verify_payment))
        // Catalog
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        // Admin
        .route("/orders", get(list_orders))
}
