use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use balcao_core::error::CoreError;
use balcao_core::types::DbId;
use balcao_services::{PartialStage, ServiceError};
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds the service-level
/// outcomes that have their own HTTP meaning. Implements [`IntoResponse`]
/// to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `balcao_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The server is shutting down and the operation was not started.
    #[error("Operation cancelled")]
    Cancelled,

    /// A budget saga could not be compensated; stock and budget disagree.
    #[error("Budget {budget_id} partially applied during {stage}: {detail}")]
    PartialApplication {
        budget_id: DbId,
        stage: PartialStage,
        detail: String,
    },
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Core(core) => Self::Core(core),
            ServiceError::Database(db) => Self::Database(db),
            ServiceError::Cancelled => Self::Cancelled,
            ServiceError::PartialApplication {
                budget_id,
                stage,
                source,
            } => Self::PartialApplication {
                budget_id,
                stage,
                detail: source.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- Service outcomes ---
            AppError::Cancelled => (
                StatusCode::SERVICE_UNAVAILABLE,
                "CANCELLED",
                "The server is shutting down; the operation was not applied".to_string(),
            ),
            AppError::PartialApplication {
                budget_id,
                stage,
                detail,
            } => {
                tracing::error!(budget_id, %stage, error = %detail, "Budget left partially applied");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PARTIAL_APPLICATION",
                    format!(
                        "Budget {budget_id} was partially applied during {stage} and needs manual reconciliation"
                    ),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => (
            StatusCode::CONFLICT,
            "CONFLICT",
            "Duplicate value violates a unique constraint".to_string(),
        ),
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}
