use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::lenient;

/// Status given to every order captured from a verified payment.
pub const ORDER_STATUS_PAID: &str = "Paid";
/// The gateway auto-captures, so a verified payment is already captured.
pub const PAYMENT_STATUS_CAPTURED: &str = "Captured";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: String,
    pub customer_details: CustomerDetails,
    pub order_items: Vec<OrderItem>,
    pub payment_info: PaymentInfo,
    /// Major currency units (rupees)
    pub total_amount: f64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerDetails {
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub phone: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub address: String,
}

impl CustomerDetails {
    /// Every field is required on a stored order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("name", &self.name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("address", &self.address),
        ]
        .into_iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(k, _)| k)
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub name: String,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    /// Weak reference; the product may since have been deleted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentInfo {
    pub id: String,
    pub status: String,
}

/// Everything needed to insert an order; id and timestamps come from the store.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_details: CustomerDetails,
    pub order_items: Vec<OrderItem>,
    pub payment_info: PaymentInfo,
    pub total_amount: f64,
    pub status: String,
}

/// A line item as the storefront posts it from the cart.
///
/// The cart keeps whatever the product listing handed it, so the product
/// reference may arrive under any of `_id`, `id` or `productId`. Scalars are
/// coerced: a numeric string price is a price, a numeric size is a size.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub quantity: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub size: Option<String>,
    #[serde(default, rename = "_id", deserialize_with = "lenient::opt_text")]
    pub mongo_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub product_id: Option<String>,
}

impl CartItem {
    /// Resolve the product reference. Precedence: `_id`, then `id`, then
    /// `productId`. Empty strings are skipped.
    pub fn product_ref(&self) -> Option<&str> {
        [&self.mongo_id, &self.id, &self.product_id]
            .into_iter()
            .filter_map(|v| v.as_deref())
            .find(|v| !v.is_empty())
    }

    /// Quantity defaults to 1 and never drops below it. Fractions round to
    /// the nearest whole unit.
    pub fn quantity(&self) -> u32 {
        self.quantity
            .map(|q| q.round().clamp(1.0, u32::MAX as f64) as u32)
            .unwrap_or(1)
    }

    /// Convert to a stored order item. Fails when the line has no name or price.
    pub fn to_order_item(&self) -> std::result::Result<OrderItem, String> {
        let name = self
            .name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| "order item is missing a name".to_string())?;
        let price = self
            .price
            .ok_or_else(|| format!("order item '{}' is missing a price", name))?;

        Ok(OrderItem {
            name,
            quantity: self.quantity(),
            image: self.image.clone(),
            price,
            size: self.size.clone(),
            product_id: self.product_ref().map(String::from),
        })
    }
}
