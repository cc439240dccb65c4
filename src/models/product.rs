use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CATEGORY: &str = "T-Shirt";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub price: f64,
    pub description: String,
    /// Image paths or URLs, in display order
    pub images: Vec<String>,
    pub category: String,
    pub stock: i64,
    pub sizes: Vec<String>,
    pub in_stock: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProduct {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub images: Option<Vec<String>>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub stock: Option<i64>,
    #[serde(default)]
    pub sizes: Option<Vec<String>>,
    #[serde(default)]
    pub in_stock: Option<bool>,
}

/// A product that passed create-time validation.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub price: f64,
    pub description: String,
    pub images: Vec<String>,
    pub category: String,
    pub stock: i64,
    pub sizes: Vec<String>,
    pub in_stock: bool,
}

impl CreateProduct {
    /// Name, a positive price and at least one image are required.
    /// Returns `None` when any of them is missing.
    pub fn validate(self) -> Option<NewProduct> {
        let name = self.name.filter(|n| !n.trim().is_empty())?;
        let price = self.price.filter(|p| *p > 0.0)?;
        let images = self.images.filter(|i| !i.is_empty())?;

        Some(NewProduct {
            name,
            price,
            description: self.description.unwrap_or_default(),
            images,
            category: self
                .category
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            stock: self.stock.unwrap_or(0),
            sizes: dedup_sizes(self.sizes.unwrap_or_default()),
            in_stock: self.in_stock.unwrap_or(true),
        })
    }
}

/// Partial update payload. `None` means the field was not sent.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub description: Option<String>,
    pub images: Option<Vec<String>>,
    pub category: Option<String>,
    pub stock: Option<i64>,
    pub sizes: Option<Vec<String>>,
    pub in_stock: Option<bool>,
}

impl UpdateProduct {
    /// Drop fields whose value counts as "empty" so the stored value is kept.
    ///
    /// Empty strings and zero numbers are treated as not provided. Arrays and
    /// `inStock` always replace when present.
    pub fn without_empty_values(self) -> Self {
        Self {
            name: self.name.filter(|v| !v.is_empty()),
            price: self.price.filter(|v| *v != 0.0),
            description: self.description.filter(|v| !v.is_empty()),
            images: self.images,
            category: self.category.filter(|v| !v.is_empty()),
            stock: self.stock.filter(|v| *v != 0),
            sizes: self.sizes.map(dedup_sizes),
            in_stock: self.in_stock,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.description.is_none()
            && self.images.is_none()
            && self.category.is_none()
            && self.stock.is_none()
            && self.sizes.is_none()
            && self.in_stock.is_none()
    }
}

/// Sizes are a set; keep the first occurrence of each.
pub fn dedup_sizes(sizes: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    sizes
        .into_iter()
        .filter(|s| seen.insert(s.clone()))
        .collect()
}
