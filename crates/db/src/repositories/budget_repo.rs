//! Repository for the `budgets` and `budget_items` tables.
//!
//! A budget is persisted as one aggregate: every write that touches the
//! header and its items runs in a single transaction, so readers never see
//! a header without its items or items without their header.

use balcao_core::budget::{PricedBudget, PricedItem};
use balcao_core::types::DbId;

use crate::models::budget::{Budget, BudgetItem, BudgetWithItems};
use crate::models::status::BudgetStatus;
use crate::{begin_write, DbConnection, DbPool};

/// Column list for the `budgets` table.
const COLUMNS: &str = "id, customer, total, status_id, created_at, updated_at";

/// Column list for the `budget_items` table.
const ITEM_COLUMNS: &str = "id, budget_id, product_id, product, quantity, unit_price, subtotal";

/// Provides aggregate persistence for budgets.
pub struct BudgetRepo;

impl BudgetRepo {
    /// Insert a budget header and all of its items.
    ///
    /// Any item failure rolls the header back too. Returns the aggregate as
    /// committed.
    pub async fn create(
        pool: &DbPool,
        budget: &PricedBudget,
    ) -> Result<BudgetWithItems, sqlx::Error> {
        let mut tx = begin_write(pool).await?;

        let query = format!(
            "INSERT INTO budgets (customer, total, status_id) VALUES (?, ?, ?) RETURNING {COLUMNS}"
        );
        let header = sqlx::query_as::<_, Budget>(&query)
            .bind(&budget.customer)
            .bind(budget.total)
            .bind(BudgetStatus::Active.id())
            .fetch_one(&mut *tx)
            .await?;

        let items = Self::insert_items_inner(&mut tx, header.id, &budget.items).await?;

        tx.commit().await?;
        Ok(BudgetWithItems::new(header, items))
    }

    /// Find a budget header by its ID, without items.
    pub async fn find_header(pool: &DbPool, id: DbId) -> Result<Option<Budget>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM budgets WHERE id = ?");
        sqlx::query_as::<_, Budget>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a budget together with its items.
    ///
    /// Header and items are read in one transaction so they come from the
    /// same snapshot.
    pub async fn find_by_id(
        pool: &DbPool,
        id: DbId,
    ) -> Result<Option<BudgetWithItems>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!("SELECT {COLUMNS} FROM budgets WHERE id = ?");
        let header = sqlx::query_as::<_, Budget>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        let result = match header {
            Some(budget) => {
                let items = Self::items_inner(&mut tx, budget.id).await?;
                Some(BudgetWithItems::new(budget, items))
            }
            None => None,
        };

        tx.commit().await?;
        Ok(result)
    }

    /// List all budgets with their items, newest first.
    pub async fn list(pool: &DbPool) -> Result<Vec<BudgetWithItems>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!("SELECT {COLUMNS} FROM budgets ORDER BY created_at DESC, id DESC");
        let headers = sqlx::query_as::<_, Budget>(&query)
            .fetch_all(&mut *tx)
            .await?;

        let mut result = Vec::with_capacity(headers.len());
        for budget in headers {
            let items = Self::items_inner(&mut tx, budget.id).await?;
            result.push(BudgetWithItems::new(budget, items));
        }

        tx.commit().await?;
        Ok(result)
    }

    /// Replace the header fields and the full item set of an ACTIVE budget.
    ///
    /// Items are deleted and reinserted (full replacement, not a diff).
    /// Returns `None` if no ACTIVE budget with the given `id` exists.
    pub async fn update(
        pool: &DbPool,
        id: DbId,
        budget: &PricedBudget,
    ) -> Result<Option<BudgetWithItems>, sqlx::Error> {
        let mut tx = begin_write(pool).await?;

        let query = format!(
            "UPDATE budgets SET \
                customer = ?, \
                total = ?, \
                updated_at = strftime('%Y-%m-%d %H:%M:%f', 'now') \
             WHERE id = ? AND status_id = ? \
             RETURNING {COLUMNS}"
        );
        let header = sqlx::query_as::<_, Budget>(&query)
            .bind(&budget.customer)
            .bind(budget.total)
            .bind(id)
            .bind(BudgetStatus::Active.id())
            .fetch_optional(&mut *tx)
            .await?;

        let Some(header) = header else {
            tx.rollback().await?;
            return Ok(None);
        };

        sqlx::query("DELETE FROM budget_items WHERE budget_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let items = Self::insert_items_inner(&mut tx, id, &budget.items).await?;

        tx.commit().await?;
        Ok(Some(BudgetWithItems::new(header, items)))
    }

    /// Delete a budget's items and then its header.
    ///
    /// Returns `false` if the header did not exist; nothing is written in
    /// that case.
    pub async fn delete(pool: &DbPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = begin_write(pool).await?;

        sqlx::query("DELETE FROM budget_items WHERE budget_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM budgets WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        tx.commit().await?;
        Ok(true)
    }

    /// Flip an ACTIVE budget to CANCELLED. Does not touch stock.
    ///
    /// Returns the updated header, or `None` if the budget does not exist
    /// or is not ACTIVE.
    pub async fn mark_cancelled(
        pool: &DbPool,
        id: DbId,
    ) -> Result<Option<Budget>, sqlx::Error> {
        let query = format!(
            "UPDATE budgets SET \
                status_id = ?, \
                updated_at = strftime('%Y-%m-%d %H:%M:%f', 'now') \
             WHERE id = ? AND status_id = ? \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Budget>(&query)
            .bind(BudgetStatus::Cancelled.id())
            .bind(id)
            .bind(BudgetStatus::Active.id())
            .fetch_optional(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    async fn items_inner(
        conn: &mut DbConnection,
        budget_id: DbId,
    ) -> Result<Vec<BudgetItem>, sqlx::Error> {
        let query = format!(
            "SELECT {ITEM_COLUMNS} FROM budget_items \
             WHERE budget_id = ? ORDER BY id"
        );
        sqlx::query_as::<_, BudgetItem>(&query)
            .bind(budget_id)
            .fetch_all(&mut *conn)
            .await
    }

    async fn insert_items_inner(
        conn: &mut DbConnection,
        budget_id: DbId,
        items: &[PricedItem],
    ) -> Result<Vec<BudgetItem>, sqlx::Error> {
        let query = format!(
            "INSERT INTO budget_items \
                (budget_id, product_id, product, quantity, unit_price, subtotal) \
             VALUES (?, ?, ?, ?, ?, ?) \
             RETURNING {ITEM_COLUMNS}"
        );
        let mut inserted = Vec::with_capacity(items.len());
        for item in items {
            let row = sqlx::query_as::<_, BudgetItem>(&query)
                .bind(budget_id)
                .bind(item.product_id)
                .bind(&item.product)
                .bind(item.quantity)
                .bind(item.unit_price)
                .bind(item.subtotal)
                .fetch_one(&mut *conn)
                .await?;
            inserted.push(row);
        }
        Ok(inserted)
    }
}
