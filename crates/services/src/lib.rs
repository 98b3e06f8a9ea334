//! Business orchestration for budgets and stock.
//!
//! - [`StockService`] executes single inventory movements, pairing the cached
//!   level write with the ledger append in one transaction.
//! - [`BudgetService`] prices, persists, and cancels budgets, reaching stock
//!   only through the [`StockMovements`] capability and products only through
//!   [`ProductCatalog`].
//! - [`CatalogService`] owns product creation with opening stock.

pub mod budget_service;
pub mod capability;
pub mod catalog_service;
pub mod error;
pub mod stock_service;

pub use budget_service::BudgetService;
pub use capability::{ProductCatalog, StockMovements};
pub use catalog_service::{CatalogService, DbProductCatalog};
pub use error::{PartialStage, ServiceError, ServiceResult};
pub use stock_service::{
    LedgerReconciliation, MovementOutcome, ProductStockColumn, StockLevels, StockService,
};

use tokio_util::sync::CancellationToken;

/// Fail fast with [`ServiceError::Cancelled`] if the caller has given up.
///
/// Called before any write and before committing single-transaction work.
pub(crate) fn ensure_live(cancel: &CancellationToken) -> ServiceResult<()> {
    if cancel.is_cancelled() {
        Err(ServiceError::Cancelled)
    } else {
        Ok(())
    }
}
