//! Domain logic shared by the balcao services.
//!
//! Everything here is pure: no database handles, no async. Storage and
//! orchestration live in `balcao-db` and `balcao-services`.

pub mod budget;
pub mod error;
pub mod product;
pub mod stock;
pub mod types;
