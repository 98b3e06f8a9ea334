//! Error type shared by every service.

use std::fmt;

use balcao_core::error::CoreError;
use balcao_core::types::DbId;

/// The saga step at which a multi-transaction operation was left
/// half-applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartialStage {
    /// Budget persisted, stock deduction failed, and the compensation
    /// (restore deducted items, delete the budget) failed as well.
    CreateDeduction,
    /// Stock restoration on cancel failed partway and re-deducting the
    /// restored items failed as well.
    CancelRestoration,
}

impl fmt::Display for PartialStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::CreateDeduction => "create/stock deduction",
            Self::CancelRestoration => "cancel/stock restoration",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// A domain-level error (validation, not found, conflict).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A storage failure: begin/commit/rollback or constraint errors.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The caller's cancellation token fired before any write was applied.
    #[error("Operation cancelled")]
    Cancelled,

    /// Stock and budget state disagree and compensation could not repair it.
    #[error("Budget {budget_id} partially applied during {stage}: {source}")]
    PartialApplication {
        budget_id: DbId,
        stage: PartialStage,
        #[source]
        source: Box<ServiceError>,
    },
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub(crate) fn not_found(entity: &'static str, id: DbId) -> Self {
        Self::Core(CoreError::NotFound { entity, id })
    }

    pub(crate) fn conflict(msg: impl Into<String>) -> Self {
        Self::Core(CoreError::Conflict(msg.into()))
    }

    pub(crate) fn partial(budget_id: DbId, stage: PartialStage, source: ServiceError) -> Self {
        Self::PartialApplication {
            budget_id,
            stage,
            source: Box::new(source),
        }
    }
}
