use std::sync::Arc;

use balcao_services::{BudgetService, CatalogService, DbProductCatalog, StockService};
use tokio_util::sync::CancellationToken;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: balcao_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Budget lifecycle orchestration.
    pub budgets: Arc<BudgetService>,
    /// Stock movements and ledger queries.
    pub stock: Arc<StockService>,
    /// Product catalog management.
    pub catalog: Arc<CatalogService>,
    /// Cancelled once the server starts shutting down. Handlers pass it to
    /// every service call.
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Wire the services over one shared pool.
    pub fn new(pool: balcao_db::DbPool, config: ServerConfig, shutdown: CancellationToken) -> Self {
        let stock = Arc::new(StockService::with_product_column(pool.clone()));
        let catalog = Arc::new(CatalogService::new(pool.clone(), Arc::clone(&stock)));
        let budgets = Arc::new(BudgetService::new(
            pool.clone(),
            Arc::new(DbProductCatalog::new(pool.clone())),
            stock.clone(),
        ));

        Self {
            pool,
            config: Arc::new(config),
            budgets,
            stock,
            catalog,
            shutdown,
        }
    }
}
