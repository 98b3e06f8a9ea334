//! Narrow capability traits that budgets depend on.
//!
//! Budgets never see the ledger or the stock column; they see these two
//! traits, which production wires to [`StockService`](crate::StockService)
//! and [`DbProductCatalog`](crate::DbProductCatalog) and tests replace with
//! in-memory doubles.

use async_trait::async_trait;
use balcao_core::budget::ProductSnapshot;
use balcao_core::types::DbId;

use crate::error::ServiceResult;

/// Read-only product lookup.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Resolve a product, or `Ok(None)` when it does not exist.
    async fn get_by_id(&self, product_id: DbId) -> ServiceResult<Option<ProductSnapshot>>;
}

/// The only stock operations budgets may perform.
///
/// Each call is one complete movement: on error nothing was recorded.
#[async_trait]
pub trait StockMovements: Send + Sync {
    /// Record a SAIDA (decrease). Returns the ledger entry ID.
    async fn saida(&self, product_id: DbId, quantity: f64) -> ServiceResult<DbId>;

    /// Record an ENTRADA (increase). Returns the ledger entry ID.
    async fn entrada(&self, product_id: DbId, quantity: f64) -> ServiceResult<DbId>;
}
