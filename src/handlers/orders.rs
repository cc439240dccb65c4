use axum::extract::State;

use crate::db::{AppState, queries};
use crate::error::{AppError, Result};
use crate::extractors::Json;
use crate::models::Order;

/// Every order, newest first, for the admin dashboard.
pub async fn list_orders(State(state): State<AppState>) -> Result<Json<Vec<Order>>> {
    let orders = state
        .db
        .get()
        .map_err(AppError::from)
        .and_then(|conn| queries::list_orders(&conn))
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to list orders");
            AppError::Internal("Server Error".into())
        })?;
    Ok(Json(orders))
}
