//! Repository for the `products` table.
//!
//! The `stock` column is only touched by [`ProductRepo::stock_level`] and
//! [`ProductRepo::set_stock_level`], which run inside the stock service's
//! movement transaction.

use balcao_core::types::DbId;

use crate::models::product::{CreateProduct, Product, UpdateProduct};
use crate::{DbConnection, DbPool};

/// Column list for `products` queries.
const COLUMNS: &str = "id, name, price, stock, unit, category, created_at, updated_at";

/// Provides CRUD operations for catalog products.
pub struct ProductRepo;

impl ProductRepo {
    /// Insert a new product with a stock level of zero.
    ///
    /// Runs on the caller's connection so an opening-stock movement can be
    /// recorded in the same transaction.
    pub async fn insert(
        conn: &mut DbConnection,
        input: &CreateProduct,
    ) -> Result<Product, sqlx::Error> {
        let query = format!(
            "INSERT INTO products (name, price, stock, unit, category) \
             VALUES (?, ?, 0, ?, ?) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(input.name.trim())
            .bind(input.price)
            .bind(input.unit.trim())
            .bind(input.category.trim())
            .fetch_one(&mut *conn)
            .await
    }

    /// Find a product by its ID.
    pub async fn find_by_id(pool: &DbPool, id: DbId) -> Result<Option<Product>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM products WHERE id = ?");
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all products ordered by name.
    pub async fn list(pool: &DbPool) -> Result<Vec<Product>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM products ORDER BY name, id");
        sqlx::query_as::<_, Product>(&query).fetch_all(pool).await
    }

    /// Update catalog fields. Only non-`None` fields are applied; `stock`
    /// is never written here.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &DbPool,
        id: DbId,
        input: &UpdateProduct,
    ) -> Result<Option<Product>, sqlx::Error> {
        let query = format!(
            "UPDATE products SET \
                name = COALESCE(?, name), \
                price = COALESCE(?, price), \
                unit = COALESCE(?, unit), \
                category = COALESCE(?, category), \
                updated_at = strftime('%Y-%m-%d %H:%M:%f', 'now') \
             WHERE id = ? \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(input.name.as_deref().map(str::trim))
            .bind(input.price)
            .bind(input.unit.as_deref().map(str::trim))
            .bind(input.category.as_deref().map(str::trim))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a product. Budget items and ledger rows that reference it are
    /// kept as-is.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &DbPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Stock level column
    // -----------------------------------------------------------------------

    /// Read the cached stock level, or `None` if the product does not exist.
    pub async fn stock_level(
        conn: &mut DbConnection,
        id: DbId,
    ) -> Result<Option<f64>, sqlx::Error> {
        sqlx::query_scalar::<_, f64>("SELECT stock FROM products WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Overwrite the cached stock level.
    ///
    /// Returns `false` if the product does not exist.
    pub async fn set_stock_level(
        conn: &mut DbConnection,
        id: DbId,
        level: f64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE products SET stock = ?, updated_at = strftime('%Y-%m-%d %H:%M:%f', 'now') \
             WHERE id = ?",
        )
        .bind(level)
        .bind(id)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
