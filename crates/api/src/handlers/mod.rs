pub mod budget;
pub mod product;
pub mod stock;
