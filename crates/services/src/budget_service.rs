//! Budget lifecycle orchestration.
//!
//! ```text
//! (none) --create--> ACTIVE --cancel--> CANCELLED
//! ```
//!
//! Creating and cancelling each span several transactions (the aggregate
//! write plus one per stock movement). Both run as sagas: when a stock
//! step fails, the steps already applied are reversed. A clean reversal
//! yields the original error; a failed reversal yields
//! [`ServiceError::PartialApplication`].
//!
//! Each saga runs on a task owned by the service's [`TaskTracker`], not on
//! the caller's future. A request that times out or disconnects stops
//! waiting, but the saga still commits or compensates.

use std::future::Future;
use std::sync::Arc;

use balcao_core::budget::{price_budget, price_item, validate_request, ItemRequest, PricedBudget};
use balcao_core::error::CoreError;
use balcao_core::types::DbId;
use balcao_db::models::budget::{BudgetItem, BudgetWithItems};
use balcao_db::repositories::BudgetRepo;
use balcao_db::DbPool;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::capability::{ProductCatalog, StockMovements};
use crate::ensure_live;
use crate::error::{PartialStage, ServiceError, ServiceResult};

/// A stock step that has been applied and may need reversing.
#[derive(Debug, Clone, Copy)]
struct AppliedLine {
    product_id: DbId,
    quantity: f64,
}

pub struct BudgetService {
    saga: Saga,
    catalog: Arc<dyn ProductCatalog>,
    sagas: TaskTracker,
}

impl BudgetService {
    pub fn new(
        pool: DbPool,
        catalog: Arc<dyn ProductCatalog>,
        stock: Arc<dyn StockMovements>,
    ) -> Self {
        Self {
            saga: Saga { pool, stock },
            catalog,
            sagas: TaskTracker::new(),
        }
    }

    /// Wait for every create or cancel saga still in flight.
    ///
    /// Sagas run on their own tasks and outlive the request that started
    /// them; call this before closing the pool.
    pub async fn wait_for_sagas(&self) {
        self.sagas.close();
        self.sagas.wait().await;
        self.sagas.reopen();
    }

    /// Create or cancel sagas currently running.
    pub fn sagas_in_flight(&self) -> usize {
        self.sagas.len()
    }

    /// Price, persist, and deduct stock for a new budget.
    ///
    /// The aggregate is written before any stock moves, so a storage
    /// failure never leaves an unrecorded movement behind. Once validation
    /// has passed, the persist and deduct steps run on a detached task:
    /// dropping the returned future does not stop them halfway.
    pub async fn create(
        &self,
        cancel: &CancellationToken,
        customer: &str,
        items: &[ItemRequest],
    ) -> ServiceResult<BudgetWithItems> {
        let customer = validate_request(customer, items)?;
        let quote = self.quote(customer, items).await?;
        ensure_live(cancel)?;

        let saga = self.saga.clone();
        self.detach(async move { saga.create(quote).await }).await
    }

    /// All budgets with their items, newest first.
    pub async fn list(&self, cancel: &CancellationToken) -> ServiceResult<Vec<BudgetWithItems>> {
        ensure_live(cancel)?;
        Ok(BudgetRepo::list(&self.saga.pool).await?)
    }

    pub async fn get_by_id(
        &self,
        cancel: &CancellationToken,
        id: DbId,
    ) -> ServiceResult<BudgetWithItems> {
        ensure_live(cancel)?;
        self.saga.load(id).await
    }

    /// Replace the customer and the full item set of an ACTIVE budget.
    ///
    /// Prices are re-read from the catalog. Stock is NOT adjusted for the
    /// changed quantities; callers that need that must cancel and recreate.
    pub async fn update(
        &self,
        cancel: &CancellationToken,
        id: DbId,
        customer: &str,
        items: &[ItemRequest],
    ) -> ServiceResult<BudgetWithItems> {
        let customer = validate_request(customer, items)?;
        let pool = &self.saga.pool;

        let header = BudgetRepo::find_header(pool, id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Budget", id))?;
        if !header.is_active() {
            return Err(not_active(id));
        }

        let quote = self.quote(customer, items).await?;
        ensure_live(cancel)?;

        let Some(updated) = BudgetRepo::update(pool, id, &quote).await? else {
            // Cancelled or deleted between the check and the write.
            return Err(match BudgetRepo::find_header(pool, id).await? {
                Some(_) => not_active(id),
                None => ServiceError::not_found("Budget", id),
            });
        };

        tracing::info!(
            budget_id = id,
            total = quote.total,
            item_count = quote.items.len(),
            "Budget updated",
        );

        Ok(updated)
    }

    /// Remove a budget and its items. Stock is not restored.
    pub async fn delete(&self, cancel: &CancellationToken, id: DbId) -> ServiceResult<()> {
        ensure_live(cancel)?;
        if !BudgetRepo::delete(&self.saga.pool, id).await? {
            return Err(ServiceError::not_found("Budget", id));
        }
        tracing::info!(budget_id = id, "Budget deleted");
        Ok(())
    }

    /// Restore every item's stock, then flip the budget to CANCELLED.
    ///
    /// The status only changes once all restorations succeeded. Cancelling
    /// a budget that is already CANCELLED is a `Conflict`. Like
    /// [`create`](Self::create), the stock steps run on a detached task.
    pub async fn cancel(
        &self,
        cancel: &CancellationToken,
        id: DbId,
    ) -> ServiceResult<BudgetWithItems> {
        ensure_live(cancel)?;

        let found = self.saga.load(id).await?;
        if !found.budget.is_active() {
            return Err(ServiceError::conflict(format!(
                "Budget {id} is already cancelled"
            )));
        }
        ensure_live(cancel)?;

        let saga = self.saga.clone();
        self.detach(async move { saga.cancel(id, found.items).await }).await
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// Resolve every line against the catalog and freeze its price.
    async fn quote(&self, customer: &str, items: &[ItemRequest]) -> ServiceResult<PricedBudget> {
        let mut priced = Vec::with_capacity(items.len());
        for request in items {
            let snapshot = self
                .catalog
                .get_by_id(request.product_id)
                .await?
                .ok_or_else(|| ServiceError::not_found("Product", request.product_id))?;
            priced.push(price_item(request, &snapshot));
        }
        Ok(price_budget(customer, priced))
    }

    /// Run `saga` on a tracked task and wait for its result.
    async fn detach<T, F>(&self, saga: F) -> ServiceResult<T>
    where
        T: Send + 'static,
        F: Future<Output = ServiceResult<T>> + Send + 'static,
    {
        match self.sagas.spawn(saga).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(error = %e, "Budget saga task did not finish");
                Err(CoreError::Internal(format!("Budget saga task failed: {e}")).into())
            }
        }
    }
}

/// The multi-transaction steps of a budget, owned so they can run on their
/// own task.
#[derive(Clone)]
struct Saga {
    pool: DbPool,
    stock: Arc<dyn StockMovements>,
}

impl Saga {
    async fn create(self, quote: PricedBudget) -> ServiceResult<BudgetWithItems> {
        let created = BudgetRepo::create(&self.pool, &quote).await?;
        let budget_id = created.budget.id;

        let mut applied = Vec::with_capacity(created.items.len());
        for item in &created.items {
            match self.stock.saida(item.product_id, item.quantity).await {
                Ok(_) => applied.push(line_of(item)),
                Err(e) => return Err(self.undo_create(budget_id, &applied, e).await),
            }
        }

        tracing::info!(
            budget_id,
            customer = %created.budget.customer,
            total = created.budget.total,
            item_count = created.items.len(),
            "Budget created",
        );

        Ok(created)
    }

    async fn cancel(self, id: DbId, items: Vec<BudgetItem>) -> ServiceResult<BudgetWithItems> {
        let mut restored = Vec::with_capacity(items.len());
        for item in &items {
            match self.stock.entrada(item.product_id, item.quantity).await {
                Ok(_) => restored.push(line_of(item)),
                Err(e) => return Err(self.undo_cancel(id, &restored, e).await),
            }
        }

        let header = match BudgetRepo::mark_cancelled(&self.pool, id).await {
            Ok(Some(header)) => header,
            Ok(None) => {
                let cause = ServiceError::conflict(format!(
                    "Budget {id} was cancelled or removed concurrently"
                ));
                return Err(self.undo_cancel(id, &restored, cause).await);
            }
            Err(e) => return Err(self.undo_cancel(id, &restored, e.into()).await),
        };

        tracing::info!(
            budget_id = id,
            restored_items = restored.len(),
            "Budget cancelled",
        );

        Ok(BudgetWithItems::new(header, items))
    }

    async fn load(&self, id: DbId) -> ServiceResult<BudgetWithItems> {
        BudgetRepo::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Budget", id))
    }

    /// Reverse applied deductions newest first, then drop the budget.
    async fn undo_create(
        &self,
        budget_id: DbId,
        applied: &[AppliedLine],
        cause: ServiceError,
    ) -> ServiceError {
        tracing::warn!(
            budget_id,
            applied = applied.len(),
            error = %cause,
            "Stock deduction failed, compensating",
        );

        for line in applied.iter().rev() {
            if let Err(e) = self.stock.entrada(line.product_id, line.quantity).await {
                tracing::error!(
                    budget_id,
                    product_id = line.product_id,
                    error = %e,
                    "Failed to restore stock while compensating budget creation",
                );
                return ServiceError::partial(budget_id, PartialStage::CreateDeduction, e);
            }
        }

        if let Err(e) = BudgetRepo::delete(&self.pool, budget_id).await {
            tracing::error!(
                budget_id,
                error = %e,
                "Failed to delete budget while compensating its creation",
            );
            return ServiceError::partial(budget_id, PartialStage::CreateDeduction, e.into());
        }

        cause
    }

    /// Re-deduct restored lines newest first. The budget stays ACTIVE.
    async fn undo_cancel(
        &self,
        budget_id: DbId,
        restored: &[AppliedLine],
        cause: ServiceError,
    ) -> ServiceError {
        tracing::warn!(
            budget_id,
            restored = restored.len(),
            error = %cause,
            "Cancel did not complete, reverting stock restorations",
        );

        for line in restored.iter().rev() {
            if let Err(e) = self.stock.saida(line.product_id, line.quantity).await {
                tracing::error!(
                    budget_id,
                    product_id = line.product_id,
                    error = %e,
                    "Failed to re-deduct stock while compensating cancellation",
                );
                return ServiceError::partial(budget_id, PartialStage::CancelRestoration, e);
            }
        }

        cause
    }
}

fn line_of(item: &BudgetItem) -> AppliedLine {
    AppliedLine {
        product_id: item.product_id,
        quantity: item.quantity,
    }
}

fn not_active(id: DbId) -> ServiceError {
    ServiceError::conflict(format!("Budget {id} is cancelled and can no longer change"))
}
