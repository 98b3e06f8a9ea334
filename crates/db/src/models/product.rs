//! Product catalog entity and DTOs.

use balcao_core::budget::ProductSnapshot;
use balcao_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `products` table.
///
/// `stock` is the cached running level; it is only changed through the
/// stock ledger, never through [`UpdateProduct`].
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Product {
    pub id: DbId,
    pub name: String,
    pub price: f64,
    pub stock: f64,
    pub unit: String,
    pub category: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Product {
    /// The id/name/price view consumed by budget pricing.
    pub fn snapshot(&self) -> ProductSnapshot {
        ProductSnapshot {
            id: self.id,
            name: self.name.clone(),
            price: self.price,
        }
    }
}

/// DTO for creating a product.
///
/// `opening_stock` is recorded as an AJUSTE movement, not written directly.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProduct {
    pub name: String,
    pub price: f64,
    pub unit: String,
    pub category: String,
    #[serde(default)]
    pub opening_stock: f64,
}

/// DTO for updating a product. Only non-`None` fields are applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub unit: Option<String>,
    pub category: Option<String>,
}
