use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Readiness of the store behind the budget and stock endpoints.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok` when every check below passes, `degraded` otherwise.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// `None` when the migration table itself cannot be read.
    pub pending_migrations: Option<usize>,
    pub ledger_reachable: bool,
    /// Budget create/cancel sagas still moving stock.
    pub sagas_in_flight: usize,
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = balcao_db::health_check(&state.pool).await.is_ok();
    let pending_migrations = balcao_db::pending_migrations(&state.pool).await.ok();
    let ledger_reachable = balcao_db::ledger_health_check(&state.pool).await.is_ok();

    let ready = db_healthy && ledger_reachable && pending_migrations == Some(0);
    if !ready {
        tracing::warn!(
            db_healthy,
            ?pending_migrations,
            ledger_reachable,
            "Health check degraded",
        );
    }

    Json(HealthResponse {
        status: if ready { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        pending_migrations,
        ledger_reachable,
        sagas_in_flight: state.budgets.sagas_in_flight(),
    })
}

/// Mounted at the root, outside `/api/v1`.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
