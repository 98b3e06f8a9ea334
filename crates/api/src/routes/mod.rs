pub mod budget;
pub mod health;
pub mod product;
pub mod stock;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /budgets                          list, create
/// /budgets/{id}                     get, update, delete
/// /budgets/{id}/cancel              cancel (POST or PUT)
///
/// /stock/entrada                    record ENTRADA (POST)
/// /stock/saida                      record SAIDA (POST)
/// /stock/ajuste                     record AJUSTE (POST)
/// /stock/movements                  record any movement type (POST)
/// /stock/{product_id}/history       ledger, newest first
/// /stock/{product_id}/reconcile     cached level vs ledger replay
///
/// /products                         list, create
/// /products/{id}                    get, update, delete
/// /products/{id}/stock              current level
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/budgets", budget::router())
        .nest("/stock", stock::router())
        .nest("/products", product::router())
}
