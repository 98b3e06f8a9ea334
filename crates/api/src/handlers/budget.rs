//! Handlers for the `/budgets` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use balcao_core::budget::ItemRequest;
use balcao_core::types::DbId;
use balcao_db::models::budget::BudgetWithItems;
use serde::Deserialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for creating or replacing a budget.
#[derive(Debug, Deserialize)]
pub struct BudgetRequest {
    pub customer: String,
    pub items: Vec<ItemRequest>,
}

/// POST /api/v1/budgets
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<BudgetRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<BudgetWithItems>>)> {
    let budget = state
        .budgets
        .create(&state.shutdown, &input.customer, &input.items)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: budget })))
}

/// GET /api/v1/budgets
pub async fn list(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<BudgetWithItems>>>> {
    let budgets = state.budgets.list(&state.shutdown).await?;
    Ok(Json(DataResponse { data: budgets }))
}

/// GET /api/v1/budgets/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<BudgetWithItems>>> {
    let budget = state.budgets.get_by_id(&state.shutdown, id).await?;
    Ok(Json(DataResponse { data: budget }))
}

/// PUT /api/v1/budgets/{id}
///
/// Full replacement. Stock levels are not adjusted.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<BudgetRequest>,
) -> AppResult<Json<DataResponse<BudgetWithItems>>> {
    let budget = state
        .budgets
        .update(&state.shutdown, id, &input.customer, &input.items)
        .await?;
    Ok(Json(DataResponse { data: budget }))
}

/// DELETE /api/v1/budgets/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    state.budgets.delete(&state.shutdown, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST|PUT /api/v1/budgets/{id}/cancel
///
/// Restores stock for every item, then marks the budget CANCELLED.
pub async fn cancel(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<BudgetWithItems>>> {
    let budget = state.budgets.cancel(&state.shutdown, id).await?;
    Ok(Json(DataResponse { data: budget }))
}
