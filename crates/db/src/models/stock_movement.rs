//! Stock ledger entry model.

use balcao_core::stock::MovementType;
use balcao_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `stock_movements` table. Immutable once committed.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StockMovement {
    pub id: DbId,
    pub product_id: DbId,
    #[sqlx(try_from = "String")]
    #[serde(rename = "type")]
    pub movement_type: MovementType,
    pub quantity: f64,
    pub created_at: Timestamp,
}
