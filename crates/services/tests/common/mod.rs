//! Shared wiring and test doubles for service integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use balcao_core::budget::{ItemRequest, ProductSnapshot};
use balcao_core::error::CoreError;
use balcao_core::types::DbId;
use balcao_db::models::product::CreateProduct;
use balcao_services::{
    BudgetService, CatalogService, DbProductCatalog, ProductCatalog, ServiceError, ServiceResult,
    StockMovements, StockService,
};
use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;

// ---------------------------------------------------------------------------
// Wiring
// ---------------------------------------------------------------------------

/// Production wiring over a test database.
pub struct Harness {
    pub pool: SqlitePool,
    pub stock: Arc<StockService>,
    pub catalog: CatalogService,
    pub budgets: Arc<BudgetService>,
}

pub fn harness(pool: SqlitePool) -> Harness {
    let stock = Arc::new(StockService::with_product_column(pool.clone()));
    harness_with(pool, stock.clone(), stock)
}

/// Same as [`harness`] but budgets reach stock through `movements`.
pub fn harness_with(
    pool: SqlitePool,
    stock: Arc<StockService>,
    movements: Arc<dyn StockMovements>,
) -> Harness {
    let catalog = CatalogService::new(pool.clone(), stock.clone());
    let budgets = Arc::new(BudgetService::new(
        pool.clone(),
        Arc::new(DbProductCatalog::new(pool.clone())),
        movements,
    ));
    Harness {
        pool,
        stock,
        catalog,
        budgets,
    }
}

pub fn live() -> CancellationToken {
    CancellationToken::new()
}

pub fn cancelled() -> CancellationToken {
    let token = CancellationToken::new();
    token.cancel();
    token
}

pub async fn seed_product(catalog: &CatalogService, name: &str, price: f64, stock: f64) -> DbId {
    let input = CreateProduct {
        name: name.to_string(),
        price,
        unit: "un".to_string(),
        category: "material".to_string(),
        opening_stock: stock,
    };
    catalog.create(&live(), &input).await.unwrap().id
}

pub fn lines(items: &[(DbId, f64)]) -> Vec<ItemRequest> {
    items
        .iter()
        .map(|&(product_id, quantity)| ItemRequest {
            product_id,
            quantity,
        })
        .collect()
}

pub async fn count(pool: &SqlitePool, table: &str) -> i64 {
    let row: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .unwrap();
    row.0
}

pub async fn level(stock: &StockService, product_id: DbId) -> f64 {
    stock.current_level(&live(), product_id).await.unwrap()
}

// ---------------------------------------------------------------------------
// In-memory catalog
// ---------------------------------------------------------------------------

/// A catalog whose prices can change mid-test.
#[derive(Default)]
pub struct FakeCatalog {
    products: Mutex<HashMap<DbId, ProductSnapshot>>,
}

impl FakeCatalog {
    pub fn with(products: &[(DbId, &str, f64)]) -> Self {
        let catalog = Self::default();
        for &(id, name, price) in products {
            catalog.put(id, name, price);
        }
        catalog
    }

    pub fn put(&self, id: DbId, name: &str, price: f64) {
        self.products.lock().unwrap().insert(
            id,
            ProductSnapshot {
                id,
                name: name.to_string(),
                price,
            },
        );
    }
}

#[async_trait]
impl ProductCatalog for FakeCatalog {
    async fn get_by_id(&self, product_id: DbId) -> ServiceResult<Option<ProductSnapshot>> {
        Ok(self.products.lock().unwrap().get(&product_id).cloned())
    }
}

// ---------------------------------------------------------------------------
// Scriptable stock
// ---------------------------------------------------------------------------

/// A recorded stock call: `("SAIDA" | "ENTRADA", product_id, quantity)`.
pub type StockCall = (&'static str, DbId, f64);

/// Delegates to a real [`StockService`] but fails or stalls chosen calls.
///
/// Call numbers are 1-based and counted per direction. A stalled call
/// sleeps before anything else happens. A failed call is not forwarded,
/// so it records nothing.
pub struct FlakyStock {
    inner: Arc<StockService>,
    fail_saida: Vec<usize>,
    fail_entrada: Vec<usize>,
    stall_saida: Option<(usize, Duration)>,
    stall_entrada: Option<(usize, Duration)>,
    saidas: AtomicUsize,
    entradas: AtomicUsize,
    calls: Mutex<Vec<StockCall>>,
}

impl FlakyStock {
    pub fn new(inner: Arc<StockService>) -> Self {
        Self {
            inner,
            fail_saida: Vec::new(),
            fail_entrada: Vec::new(),
            stall_saida: None,
            stall_entrada: None,
            saidas: AtomicUsize::new(0),
            entradas: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_saida(mut self, nth: usize) -> Self {
        self.fail_saida.push(nth);
        self
    }

    pub fn failing_entrada(mut self, nth: usize) -> Self {
        self.fail_entrada.push(nth);
        self
    }

    pub fn stalling_saida(mut self, nth: usize, delay: Duration) -> Self {
        self.stall_saida = Some((nth, delay));
        self
    }

    pub fn stalling_entrada(mut self, nth: usize, delay: Duration) -> Self {
        self.stall_entrada = Some((nth, delay));
        self
    }

    /// Calls that were forwarded successfully, in order.
    pub fn calls(&self) -> Vec<StockCall> {
        self.calls.lock().unwrap().clone()
    }

    fn injected(kind: &str, nth: usize) -> ServiceError {
        ServiceError::Core(CoreError::Internal(format!("injected {kind} failure #{nth}")))
    }

    async fn stall(plan: Option<(usize, Duration)>, nth: usize) {
        if let Some((at, delay)) = plan {
            if at == nth {
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[async_trait]
impl StockMovements for FlakyStock {
    async fn saida(&self, product_id: DbId, quantity: f64) -> ServiceResult<DbId> {
        let nth = self.saidas.fetch_add(1, Ordering::SeqCst) + 1;
        Self::stall(self.stall_saida, nth).await;
        if self.fail_saida.contains(&nth) {
            return Err(Self::injected("saida", nth));
        }
        let id = self.inner.saida(&live(), product_id, quantity).await?.movement_id;
        self.calls
            .lock()
            .unwrap()
            .push(("SAIDA", product_id, quantity));
        Ok(id)
    }

    async fn entrada(&self, product_id: DbId, quantity: f64) -> ServiceResult<DbId> {
        let nth = self.entradas.fetch_add(1, Ordering::SeqCst) + 1;
        Self::stall(self.stall_entrada, nth).await;
        if self.fail_entrada.contains(&nth) {
            return Err(Self::injected("entrada", nth));
        }
        let id = self.inner.entrada(&live(), product_id, quantity).await?.movement_id;
        self.calls
            .lock()
            .unwrap()
            .push(("ENTRADA", product_id, quantity));
        Ok(id)
    }
}
