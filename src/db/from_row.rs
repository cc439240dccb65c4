//! Row mapping for the catalog and order tables.
//!
//! Column lists are kept next to the `FromRow` impls so SELECTs and
//! index-based reads cannot drift apart.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, Params, Row, types::Type};
use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::models::{CustomerDetails, Order, PaymentInfo, Product};

pub const PRODUCT_COLS: &str =
    "id, name, price, description, images, category, stock, sizes, in_stock, created_at, updated_at";

pub const ORDER_COLS: &str = "id, customer_name, customer_email, customer_phone, customer_address, \
     items, payment_id, payment_status, total_amount, status, created_at, updated_at";

pub trait FromRow: Sized {
    fn from_row(row: &Row) -> rusqlite::Result<Self>;
}

pub fn query_one<T: FromRow>(conn: &Connection, sql: &str, params: impl Params) -> Result<Option<T>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params)?;
    match rows.next()? {
        Some(row) => Ok(Some(T::from_row(row)?)),
        None => Ok(None),
    }
}

pub fn query_all<T: FromRow>(conn: &Connection, sql: &str, params: impl Params) -> Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, |row| T::from_row(row))?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Decode a JSON text column.
fn json_col<T: DeserializeOwned>(row: &Row, idx: usize) -> rusqlite::Result<T> {
    let text: String = row.get(idx)?;
    serde_json::from_str(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Timestamps are stored as Unix milliseconds.
fn timestamp_col(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let millis: i64 = row.get(idx)?;
    DateTime::<Utc>::from_timestamp_millis(millis)
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, millis))
}

impl FromRow for Product {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Product {
            id: row.get(0)?,
            name: row.get(1)?,
            price: row.get(2)?,
            description: row.get(3)?,
            images: json_col(row, 4)?,
            category: row.get(5)?,
            stock: row.get(6)?,
            sizes: json_col(row, 7)?,
            in_stock: row.get(8)?,
            created_at: timestamp_col(row, 9)?,
            updated_at: timestamp_col(row, 10)?,
        })
    }
}

impl FromRow for Order {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Order {
            id: row.get(0)?,
            customer_details: CustomerDetails {
                name: row.get(1)?,
                email: row.get(2)?,
                phone: row.get(3)?,
                address: row.get(4)?,
            },
            order_items: json_col(row, 5)?,
            payment_info: PaymentInfo {
                id: row.get(6)?,
                status: row.get(7)?,
            },
            total_amount: row.get(8)?,
            status: row.get(9)?,
            created_at: timestamp_col(row, 10)?,
            updated_at: timestamp_col(row, 11)?,
        })
    }
}
