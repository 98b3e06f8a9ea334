//! Handlers for the `/stock` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use balcao_core::stock::MovementType;
use balcao_core::types::DbId;
use balcao_db::models::stock_movement::StockMovement;
use balcao_services::{LedgerReconciliation, MovementOutcome};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for the typed movement endpoints.
#[derive(Debug, Deserialize)]
pub struct MovementRequest {
    pub product_id: DbId,
    pub quantity: f64,
}

/// Request body for `POST /stock/movements`; `type` is parsed case-insensitively.
#[derive(Debug, Deserialize)]
pub struct RecordMovementRequest {
    pub product_id: DbId,
    #[serde(rename = "type")]
    pub movement_type: String,
    pub quantity: f64,
}

/// Result of a committed movement.
#[derive(Debug, Serialize)]
pub struct MovementResponse {
    pub movement_id: DbId,
    pub new_level: f64,
}

impl From<MovementOutcome> for MovementResponse {
    fn from(outcome: MovementOutcome) -> Self {
        Self {
            movement_id: outcome.movement_id,
            new_level: outcome.new_level,
        }
    }
}

type Created = (StatusCode, Json<DataResponse<MovementResponse>>);

async fn apply(state: &AppState, kind: MovementType, input: MovementRequest) -> AppResult<Created> {
    let outcome = state
        .stock
        .apply_movement(&state.shutdown, input.product_id, kind, input.quantity)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: outcome.into(),
        }),
    ))
}

/// POST /api/v1/stock/entrada
pub async fn entrada(
    State(state): State<AppState>,
    Json(input): Json<MovementRequest>,
) -> AppResult<Created> {
    apply(&state, MovementType::Entrada, input).await
}

/// POST /api/v1/stock/saida
pub async fn saida(
    State(state): State<AppState>,
    Json(input): Json<MovementRequest>,
) -> AppResult<Created> {
    apply(&state, MovementType::Saida, input).await
}

/// POST /api/v1/stock/ajuste
pub async fn ajuste(
    State(state): State<AppState>,
    Json(input): Json<MovementRequest>,
) -> AppResult<Created> {
    apply(&state, MovementType::Ajuste, input).await
}

/// POST /api/v1/stock/movements
pub async fn record(
    State(state): State<AppState>,
    Json(input): Json<RecordMovementRequest>,
) -> AppResult<Created> {
    let outcome = state
        .stock
        .record(
            &state.shutdown,
            input.product_id,
            &input.movement_type,
            input.quantity,
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: outcome.into(),
        }),
    ))
}

/// GET /api/v1/stock/{product_id}/history
pub async fn history(
    State(state): State<AppState>,
    Path(product_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<StockMovement>>>> {
    let movements = state.stock.history(&state.shutdown, product_id).await?;
    Ok(Json(DataResponse { data: movements }))
}

/// GET /api/v1/stock/{product_id}/reconcile
pub async fn reconcile(
    State(state): State<AppState>,
    Path(product_id): Path<DbId>,
) -> AppResult<Json<DataResponse<LedgerReconciliation>>> {
    let report = state.stock.reconcile(&state.shutdown, product_id).await?;
    Ok(Json(DataResponse { data: report }))
}
