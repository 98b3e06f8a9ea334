//! Repository for the append-only `stock_movements` ledger.
//!
//! There is no update or delete: the table rejects both via
//! triggers.

use balcao_core::stock::MovementType;
use balcao_core::types::DbId;

use crate::models::stock_movement::StockMovement;
use crate::{DbConnection, DbPool};

/// Column list for `stock_movements` queries.
const COLUMNS: &str = "id, product_id, movement_type, quantity, created_at";

/// Provides append and read operations for the stock ledger.
pub struct StockMovementRepo;

impl StockMovementRepo {
    /// Append a movement on the caller's connection.
    ///
    /// Callers pair this with the matching stock level write inside one
    /// transaction.
    pub async fn append(
        conn: &mut DbConnection,
        product_id: DbId,
        movement_type: MovementType,
        quantity: f64,
    ) -> Result<StockMovement, sqlx::Error> {
        let query = format!(
            "INSERT INTO stock_movements (product_id, movement_type, quantity) \
             VALUES (?, ?, ?) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StockMovement>(&query)
            .bind(product_id)
            .bind(movement_type.as_str())
            .bind(quantity)
            .fetch_one(&mut *conn)
            .await
    }

    /// Movement history for a product, newest first.
    pub async fn list_by_product(
        pool: &DbPool,
        product_id: DbId,
    ) -> Result<Vec<StockMovement>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM stock_movements \
             WHERE product_id = ? \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, StockMovement>(&query)
            .bind(product_id)
            .fetch_all(pool)
            .await
    }

    /// Movement history for a product, oldest first (replay order).
    pub async fn list_by_product_chronological(
        conn: &mut DbConnection,
        product_id: DbId,
    ) -> Result<Vec<StockMovement>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM stock_movements \
             WHERE product_id = ? \
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, StockMovement>(&query)
            .bind(product_id)
            .fetch_all(&mut *conn)
            .await
    }
}
