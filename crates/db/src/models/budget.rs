//! Budget aggregate models: header, line items, and the assembled view.

use balcao_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use crate::models::status::{BudgetStatus, StatusId};

/// A row from the `budgets` table (the aggregate header).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Budget {
    pub id: DbId,
    pub customer: String,
    pub total: f64,
    pub status_id: StatusId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Budget {
    /// Decode `status_id`. `None` only if the lookup table was extended
    /// without updating [`BudgetStatus`].
    pub fn status(&self) -> Option<BudgetStatus> {
        BudgetStatus::from_id(self.status_id)
    }

    pub fn is_active(&self) -> bool {
        self.status() == Some(BudgetStatus::Active)
    }
}

/// A row from the `budget_items` table.
///
/// `product` and `unit_price` are snapshots taken at pricing time.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BudgetItem {
    pub id: DbId,
    pub budget_id: DbId,
    pub product_id: DbId,
    pub product: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub subtotal: f64,
}

/// A budget header together with its ordered items.
#[derive(Debug, Clone, Serialize)]
pub struct BudgetWithItems {
    #[serde(flatten)]
    pub budget: Budget,
    pub status: &'static str,
    pub items: Vec<BudgetItem>,
}

impl BudgetWithItems {
    pub fn new(budget: Budget, items: Vec<BudgetItem>) -> Self {
        let status = budget.status().map_or("UNKNOWN", BudgetStatus::name);
        Self {
            budget,
            status,
            items,
        }
    }
}
