//! Product catalog management and the read-only catalog used by budgets.

use std::sync::Arc;

use async_trait::async_trait;
use balcao_core::budget::ProductSnapshot;
use balcao_core::product::{validate_opening_stock, validate_price, validate_text};
use balcao_core::stock::MovementType;
use balcao_core::types::DbId;
use balcao_db::models::product::{CreateProduct, Product, UpdateProduct};
use balcao_db::repositories::ProductRepo;
use balcao_db::DbPool;
use tokio_util::sync::CancellationToken;

use crate::capability::ProductCatalog;
use crate::ensure_live;
use crate::error::{ServiceError, ServiceResult};
use crate::stock_service::StockService;

/// [`ProductCatalog`] reading straight from the `products` table.
pub struct DbProductCatalog {
    pool: DbPool,
}

impl DbProductCatalog {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductCatalog for DbProductCatalog {
    async fn get_by_id(&self, product_id: DbId) -> ServiceResult<Option<ProductSnapshot>> {
        let product = ProductRepo::find_by_id(&self.pool, product_id).await?;
        Ok(product.map(|p| p.snapshot()))
    }
}

/// CRUD over catalog products.
///
/// Stock is never edited here. A non-zero `opening_stock` on create is
/// recorded as an AJUSTE movement in the same transaction as the insert.
pub struct CatalogService {
    pool: DbPool,
    stock: Arc<StockService>,
}

impl CatalogService {
    pub fn new(pool: DbPool, stock: Arc<StockService>) -> Self {
        Self { pool, stock }
    }

    pub async fn create(
        &self,
        cancel: &CancellationToken,
        input: &CreateProduct,
    ) -> ServiceResult<Product> {
        validate_text("Name", &input.name)?;
        validate_text("Unit", &input.unit)?;
        validate_text("Category", &input.category)?;
        validate_price(input.price)?;
        validate_opening_stock(input.opening_stock)?;
        ensure_live(cancel)?;

        let mut tx = balcao_db::begin_write(&self.pool).await?;
        let mut product = ProductRepo::insert(&mut tx, input).await?;

        if input.opening_stock > 0.0 {
            let outcome = self
                .stock
                .apply_in(&mut tx, product.id, MovementType::Ajuste, input.opening_stock)
                .await?;
            product.stock = outcome.new_level;
        }

        ensure_live(cancel)?;
        tx.commit().await?;

        tracing::info!(
            product_id = product.id,
            name = %product.name,
            opening_stock = product.stock,
            "Product created",
        );
        Ok(product)
    }

    pub async fn list(&self, cancel: &CancellationToken) -> ServiceResult<Vec<Product>> {
        ensure_live(cancel)?;
        Ok(ProductRepo::list(&self.pool).await?)
    }

    pub async fn get(&self, cancel: &CancellationToken, id: DbId) -> ServiceResult<Product> {
        ensure_live(cancel)?;
        ProductRepo::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Product", id))
    }

    /// Apply the provided catalog fields. Existing budgets keep the prices
    /// they were quoted with.
    pub async fn update(
        &self,
        cancel: &CancellationToken,
        id: DbId,
        input: &UpdateProduct,
    ) -> ServiceResult<Product> {
        if let Some(name) = &input.name {
            validate_text("Name", name)?;
        }
        if let Some(unit) = &input.unit {
            validate_text("Unit", unit)?;
        }
        if let Some(category) = &input.category {
            validate_text("Category", category)?;
        }
        if let Some(price) = input.price {
            validate_price(price)?;
        }
        ensure_live(cancel)?;

        let product = ProductRepo::update(&self.pool, id, input)
            .await?
            .ok_or_else(|| ServiceError::not_found("Product", id))?;

        tracing::info!(product_id = id, price = product.price, "Product updated");
        Ok(product)
    }

    /// Remove a product. Its ledger rows and budget items stay untouched.
    pub async fn delete(&self, cancel: &CancellationToken, id: DbId) -> ServiceResult<()> {
        ensure_live(cancel)?;
        if !ProductRepo::delete(&self.pool, id).await? {
            return Err(ServiceError::not_found("Product", id));
        }
        tracing::info!(product_id = id, "Product deleted");
        Ok(())
    }
}
