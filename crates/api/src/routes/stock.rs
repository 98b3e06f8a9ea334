//! Route definitions for the `/stock` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::stock;
use crate::state::AppState;

/// Routes mounted at `/stock`.
///
/// ```text
/// POST   /entrada                   -> entrada
/// POST   /saida                     -> saida
/// POST   /ajuste                    -> ajuste
/// POST   /movements                 -> record
/// GET    /{product_id}/history      -> history
/// GET    /{product_id}/reconcile    -> reconcile
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/entrada", post(stock::entrada))
        .route("/saida", post(stock::saida))
        .route("/ajuste", post(stock::ajuste))
        .route("/movements", post(stock::record))
        .route("/{product_id}/history", get(stock::history))
        .route("/{product_id}/reconcile", get(stock::reconcile))
}
