use axum::{extract::State, http::StatusCode};

use crate::db::{AppState, queries};
use crate::error::{AppError, Result};
use crate::extractors::{Json, Path};
use crate::models::{CreateProduct, Product, UpdateProduct};

fn not_found() -> AppError {
    AppError::NotFound("Product not found".into())
}

pub async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let conn = state.db.get()?;
    let products = queries::list_products(&conn)?;
    Ok(Json(products))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>> {
    let conn = state.db.get()?;
    let product = queries::get_product_by_id(&conn, &id)?.ok_or_else(not_found)?;
    Ok(Json(product))
}

pub async fn create_product(
    State(state): State<AppState>,
    Json(input): Json<CreateProduct>,
) -> Result<(StatusCode, Json<Product>)> {
    let input = input
        .validate()
        .ok_or_else(|| AppError::BadRequest("Please provide required fields".into()))?;

    let conn = state.db.get()?;
    let product = queries::create_product(&conn, &input)?;

    tracing::info!(product_id = %product.id, name = %product.name, "Product created");

    Ok((StatusCode::CREATED, Json(product)))
}

/// Partial update. Empty strings and zeros keep the stored value.
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateProduct>,
) -> Result<Json<Product>> {
    let conn = state.db.get()?;

    let existing = queries::get_product_by_id(&conn, &id)?.ok_or_else(not_found)?;

    let changes = input.without_empty_values();
    if changes.is_empty() {
        return Ok(Json(existing));
    }

    queries::update_product(&conn, &id, &changes)?;

    let product = queries::get_product_by_id(&conn, &id)?.ok_or_else(not_found)?;

    tracing::info!(product_id = %product.id, "Product updated");

    Ok(Json(product))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let conn = state.db.get()?;

    if !queries::delete_product(&conn, &id)? {
        return Err(not_found());
    }

    tracing::info!(product_id = %id, "Product removed");

    Ok(Json(serde_json::json!({ "message": "Product removed" })))
}
