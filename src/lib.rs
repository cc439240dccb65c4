pub mod checkout;
pub mod config;
pub mod db;
pub mod email;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod payments;

use std::path::Path;

use axum::{Router, routing::get};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::db::AppState;

async fn root() -> &'static str {
    "Zenstee Backend API is running"
}

/// The full HTTP surface: the JSON API under `/api`, uploaded images under
/// `/uploads`.
pub fn app(state: AppState, uploads_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .route("/", get(root))
        .nest("/api", handlers::router())
        .nest_service("/uploads", ServeDir::new(uploads_dir))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
