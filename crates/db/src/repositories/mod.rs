//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods. Methods
//! that own their transaction accept `&DbPool`; methods meant to be composed
//! into a caller's transaction accept `&mut DbConnection`.

pub mod budget_repo;
pub mod product_repo;
pub mod stock_movement_repo;

pub use budget_repo::BudgetRepo;
pub use product_repo::ProductRepo;
pub use stock_movement_repo::StockMovementRepo;
