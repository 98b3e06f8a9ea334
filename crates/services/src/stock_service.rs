//! Stock movement state machine.
//!
//! The only persisted state is a scalar level per product plus the
//! immutable ledger. A movement validates its input, reads the current
//! level through the injected [`StockLevels`] accessor, computes the new
//! level, then writes the level and appends the ledger row in ONE
//! transaction. Either both commit or neither does; there are no retries.
//!
//! Every movement transaction opens with `BEGIN IMMEDIATE`, so writers
//! queue on SQLite's write lock (bounded by `busy_timeout`) and each one
//! reads the level left by the previous commit. This covers tasks in this
//! process and other processes sharing the database file alike.

use std::sync::Arc;

use async_trait::async_trait;
use balcao_core::stock::{self, MovementType};
use balcao_core::types::DbId;
use balcao_db::models::stock_movement::StockMovement;
use balcao_db::repositories::{ProductRepo, StockMovementRepo};
use balcao_db::{DbConnection, DbPool};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::capability::StockMovements;
use crate::ensure_live;
use crate::error::{ServiceError, ServiceResult};

// ---------------------------------------------------------------------------
// Level accessor
// ---------------------------------------------------------------------------

/// Reads and writes the cached stock level on the caller's connection.
///
/// Keeps the movement logic independent of where the level is stored.
#[async_trait]
pub trait StockLevels: Send + Sync {
    /// Current level, or `None` if the product does not exist.
    async fn current(
        &self,
        conn: &mut DbConnection,
        product_id: DbId,
    ) -> Result<Option<f64>, sqlx::Error>;

    /// Persist a new level. Returns `false` if the product does not exist.
    async fn store(
        &self,
        conn: &mut DbConnection,
        product_id: DbId,
        level: f64,
    ) -> Result<bool, sqlx::Error>;
}

/// [`StockLevels`] backed by the `products.stock` column.
pub struct ProductStockColumn;

#[async_trait]
impl StockLevels for ProductStockColumn {
    async fn current(
        &self,
        conn: &mut DbConnection,
        product_id: DbId,
    ) -> Result<Option<f64>, sqlx::Error> {
        ProductRepo::stock_level(conn, product_id).await
    }

    async fn store(
        &self,
        conn: &mut DbConnection,
        product_id: DbId,
        level: f64,
    ) -> Result<bool, sqlx::Error> {
        ProductRepo::set_stock_level(conn, product_id, level).await
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// The committed effect of one movement.
#[derive(Debug, Clone, Serialize)]
pub struct MovementOutcome {
    pub movement_id: DbId,
    pub new_level: f64,
    pub movement: StockMovement,
}

/// Comparison of the cached level against a full ledger replay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerReconciliation {
    pub product_id: DbId,
    pub cached_level: f64,
    pub replayed_level: f64,
    pub movement_count: usize,
    pub consistent: bool,
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Executes and queries stock movements.
pub struct StockService {
    pool: DbPool,
    levels: Arc<dyn StockLevels>,
}

impl StockService {
    pub fn new(pool: DbPool, levels: Arc<dyn StockLevels>) -> Self {
        Self { pool, levels }
    }

    /// A service reading and writing `products.stock`.
    pub fn with_product_column(pool: DbPool) -> Self {
        Self::new(pool, Arc::new(ProductStockColumn))
    }

    /// Apply one movement atomically and return the new level and ledger row.
    ///
    /// Fails with `Validation` for a non-positive quantity and `NotFound`
    /// for an unknown product, in both cases before anything is written.
    pub async fn apply_movement(
        &self,
        cancel: &CancellationToken,
        product_id: DbId,
        movement_type: MovementType,
        quantity: f64,
    ) -> ServiceResult<MovementOutcome> {
        stock::validate_quantity(quantity)?;
        ensure_live(cancel)?;

        let mut tx = balcao_db::begin_write(&self.pool).await?;
        let outcome = self
            .apply_in(&mut tx, product_id, movement_type, quantity)
            .await?;

        // Dropping `tx` here rolls back both the level and the ledger row.
        ensure_live(cancel)?;
        tx.commit().await?;

        tracing::info!(
            product_id,
            movement_id = outcome.movement_id,
            movement_type = %movement_type,
            quantity,
            new_level = outcome.new_level,
            "Stock movement recorded",
        );

        Ok(outcome)
    }

    /// Apply a movement whose type arrives as text (`"ENTRADA"`, `"saida"`...).
    pub async fn record(
        &self,
        cancel: &CancellationToken,
        product_id: DbId,
        movement_type: &str,
        quantity: f64,
    ) -> ServiceResult<MovementOutcome> {
        let movement_type: MovementType = movement_type.parse()?;
        self.apply_movement(cancel, product_id, movement_type, quantity)
            .await
    }

    pub async fn entrada(
        &self,
        cancel: &CancellationToken,
        product_id: DbId,
        quantity: f64,
    ) -> ServiceResult<MovementOutcome> {
        self.apply_movement(cancel, product_id, MovementType::Entrada, quantity)
            .await
    }

    pub async fn saida(
        &self,
        cancel: &CancellationToken,
        product_id: DbId,
        quantity: f64,
    ) -> ServiceResult<MovementOutcome> {
        self.apply_movement(cancel, product_id, MovementType::Saida, quantity)
            .await
    }

    /// Set the level to exactly `quantity`, regardless of the prior level.
    pub async fn ajuste(
        &self,
        cancel: &CancellationToken,
        product_id: DbId,
        quantity: f64,
    ) -> ServiceResult<MovementOutcome> {
        self.apply_movement(cancel, product_id, MovementType::Ajuste, quantity)
            .await
    }

    /// Movement step on a caller-owned transaction; the caller commits.
    pub(crate) async fn apply_in(
        &self,
        conn: &mut DbConnection,
        product_id: DbId,
        movement_type: MovementType,
        quantity: f64,
    ) -> ServiceResult<MovementOutcome> {
        stock::validate_quantity(quantity)?;

        let current = self
            .levels
            .current(conn, product_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Product", product_id))?;

        let new_level = movement_type.apply(current, quantity);

        if !self.levels.store(conn, product_id, new_level).await? {
            return Err(ServiceError::not_found("Product", product_id));
        }

        let movement = StockMovementRepo::append(conn, product_id, movement_type, quantity).await?;

        Ok(MovementOutcome {
            movement_id: movement.id,
            new_level,
            movement,
        })
    }

    /// Ledger entries for a product, newest first. Pure read.
    pub async fn history(
        &self,
        cancel: &CancellationToken,
        product_id: DbId,
    ) -> ServiceResult<Vec<StockMovement>> {
        ensure_live(cancel)?;
        Ok(StockMovementRepo::list_by_product(&self.pool, product_id).await?)
    }

    /// The cached level of a product.
    pub async fn current_level(
        &self,
        cancel: &CancellationToken,
        product_id: DbId,
    ) -> ServiceResult<f64> {
        ensure_live(cancel)?;
        let mut conn = self.pool.acquire().await?;
        self.levels
            .current(&mut conn, product_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Product", product_id))
    }

    /// Replay the ledger and compare it with the cached level.
    ///
    /// Both are read in one transaction so they describe the same snapshot.
    pub async fn reconcile(
        &self,
        cancel: &CancellationToken,
        product_id: DbId,
    ) -> ServiceResult<LedgerReconciliation> {
        ensure_live(cancel)?;
        let mut tx = self.pool.begin().await?;

        let cached_level = self
            .levels
            .current(&mut tx, product_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Product", product_id))?;
        let movements =
            StockMovementRepo::list_by_product_chronological(&mut tx, product_id).await?;

        tx.commit().await?;

        let replayed_level = stock::replay(
            movements
                .iter()
                .map(|m| (m.movement_type, m.quantity)),
        );
        let consistent = cached_level == replayed_level;
        if !consistent {
            tracing::warn!(
                product_id,
                cached_level,
                replayed_level,
                "Cached stock level diverges from ledger replay",
            );
        }

        Ok(LedgerReconciliation {
            product_id,
            cached_level,
            replayed_level,
            movement_count: movements.len(),
            consistent,
        })
    }
}

/// Budgets call through this impl. Movements started here always run to
/// completion: a saga that already persisted a budget must not be
/// abandoned halfway by a cancelled request.
#[async_trait]
impl StockMovements for StockService {
    async fn saida(&self, product_id: DbId, quantity: f64) -> ServiceResult<DbId> {
        let outcome = self
            .apply_movement(&CancellationToken::new(), product_id, MovementType::Saida, quantity)
            .await?;
        Ok(outcome.movement_id)
    }

    async fn entrada(&self, product_id: DbId, quantity: f64) -> ServiceResult<DbId> {
        let outcome = self
            .apply_movement(
                &CancellationToken::new(),
                product_id,
                MovementType::Entrada,
                quantity,
            )
            .await?;
        Ok(outcome.movement_id)
    }
}
