//! Row models and input DTOs, one module per table group.

pub mod budget;
pub mod product;
pub mod status;
pub mod stock_movement;
