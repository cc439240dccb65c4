use chrono::{DateTime, Utc};
use rusqlite::{Connection, params, types::Value};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::*;

use super::from_row::{ORDER_COLS, PRODUCT_COLS, query_all, query_one};

fn now() -> DateTime<Utc> {
    Utc::now()
}

fn gen_id() -> String {
    Uuid::new_v4().to_string()
}

/// Builder for dynamic UPDATE statements with optional fields.
/// Combines multiple field updates into a single query.
struct UpdateBuilder {
    table: &'static str,
    id: String,
    fields: Vec<(&'static str, Value)>,
}

impl UpdateBuilder {
    fn new(table: &'static str, id: &str) -> Self {
        Self {
            table,
            id: id.to_string(),
            fields: Vec::new(),
        }
    }

    fn set(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.fields.push((column, value.into()));
        self
    }

    fn set_opt<V: Into<Value>>(self, column: &'static str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.set(column, v),
            None => self,
        }
    }

    /// Runs the UPDATE, bumping `updated_at`. Returns whether a row matched.
    fn execute(mut self, conn: &Connection) -> Result<bool> {
        if self.fields.is_empty() {
            return Ok(false);
        }
        self.fields.push(("updated_at", now().timestamp_millis().into()));
        let sets: Vec<String> = self
            .fields
            .iter()
            .map(|(col, _)| format!("{} = ?", col))
            .collect();
        let mut values: Vec<Value> = self.fields.into_iter().map(|(_, v)| v).collect();
        values.push(self.id.into());
        let sql = format!("UPDATE {} SET {} WHERE id = ?", self.table, sets.join(", "));
        let affected = conn.execute(&sql, rusqlite::params_from_iter(values))?;
        Ok(affected > 0)
    }
}

// ============ Products ============

pub fn create_product(conn: &Connection, input: &NewProduct) -> Result<Product> {
    let id = gen_id();
    let now = now();
    let images_json = serde_json::to_string(&input.images)?;
    let sizes_json = serde_json::to_string(&input.sizes)?;

    conn.execute(
        "INSERT INTO products (id, name, price, description, images, category, stock, sizes, in_stock, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            &id,
            &input.name,
            input.price,
            &input.description,
            &images_json,
            &input.category,
            input.stock,
            &sizes_json,
            input.in_stock,
            now.timestamp_millis(),
            now.timestamp_millis()
        ],
    )?;

    get_product_by_id(conn, &id)?
        .ok_or_else(|| AppError::Internal("Product vanished after insert".into()))
}

pub fn get_product_by_id(conn: &Connection, id: &str) -> Result<Option<Product>> {
    query_one(
        conn,
        &format!("SELECT {} FROM products WHERE id = ?1", PRODUCT_COLS),
        params![id],
    )
}

/// All products in the order they were added.
pub fn list_products(conn: &Connection) -> Result<Vec<Product>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM products ORDER BY created_at ASC, rowid ASC",
            PRODUCT_COLS
        ),
        [],
    )
}

/// Apply a partial update. Callers normalize the payload first; every `Some`
/// field here overwrites the stored value.
pub fn update_product(conn: &Connection, id: &str, input: &UpdateProduct) -> Result<bool> {
    let images_json = input.images.as_ref().map(serde_json::to_string).transpose()?;
    let sizes_json = input.sizes.as_ref().map(serde_json::to_string).transpose()?;

    UpdateBuilder::new("products", id)
        .set_opt("name", input.name.clone())
        .set_opt("price", input.price)
        .set_opt("description", input.description.clone())
        .set_opt("images", images_json)
        .set_opt("category", input.category.clone())
        .set_opt("stock", input.stock)
        .set_opt("sizes", sizes_json)
        .set_opt("in_stock", input.in_stock)
        .execute(conn)
}

pub fn delete_product(conn: &Connection, id: &str) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM products WHERE id = ?1", params![id])?;
    Ok(deleted > 0)
}

// ============ Orders ============

pub fn create_order(conn: &Connection, input: &NewOrder) -> Result<Order> {
    let id = gen_id();
    let now = now();
    let items_json = serde_json::to_string(&input.order_items)?;

    conn.execute(
        "INSERT INTO orders (id, customer_name, customer_email, customer_phone, customer_address, items, payment_id, payment_status, total_amount, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            &id,
            &input.customer_details.name,
            &input.customer_details.email,
            &input.customer_details.phone,
            &input.customer_details.address,
            &items_json,
            &input.payment_info.id,
            &input.payment_info.status,
            input.total_amount,
            &input.status,
            now.timestamp_millis(),
            now.timestamp_millis()
        ],
    )?;

    // Round-trip through millis so the returned record matches a later read.
    let stamp = DateTime::<Utc>::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now);

    Ok(Order {
        id,
        customer_details: input.customer_details.clone(),
        order_items: input.order_items.clone(),
        payment_info: input.payment_info.clone(),
        total_amount: input.total_amount,
        status: input.status.clone(),
        created_at: stamp,
        updated_at: stamp,
    })
}

/// All orders, newest first.
pub fn list_orders(conn: &Connection) -> Result<Vec<Order>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM orders ORDER BY created_at DESC, rowid DESC",
            ORDER_COLS
        ),
        [],
    )
}
