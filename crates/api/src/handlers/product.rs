//! Handlers for the `/products` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use balcao_core::types::DbId;
use balcao_db::models::product::{CreateProduct, Product, UpdateProduct};
use serde::Serialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Current cached level of one product.
#[derive(Debug, Serialize)]
pub struct StockLevelResponse {
    pub product_id: DbId,
    pub stock: f64,
}

/// POST /api/v1/products
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateProduct>,
) -> AppResult<(StatusCode, Json<DataResponse<Product>>)> {
    let product = state.catalog.create(&state.shutdown, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: product })))
}

/// GET /api/v1/products
pub async fn list(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<Product>>>> {
    let products = state.catalog.list(&state.shutdown).await?;
    Ok(Json(DataResponse { data: products }))
}

/// GET /api/v1/products/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Product>>> {
    let product = state.catalog.get(&state.shutdown, id).await?;
    Ok(Json(DataResponse { data: product }))
}

/// PUT /api/v1/products/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProduct>,
) -> AppResult<Json<DataResponse<Product>>> {
    let product = state.catalog.update(&state.shutdown, id, &input).await?;
    Ok(Json(DataResponse { data: product }))
}

/// DELETE /api/v1/products/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    state.catalog.delete(&state.shutdown, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/products/{id}/stock
pub async fn stock_level(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<StockLevelResponse>>> {
    let stock = state.stock.current_level(&state.shutdown, id).await?;
    Ok(Json(DataResponse {
        data: StockLevelResponse {
            product_id: id,
            stock,
        },
    }))
}
