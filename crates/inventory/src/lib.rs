//! Inventory domain module.
//!
//! Stock items are the only records here with interior mutability: each one
//! guards its current quantity with its own mutex, so settlements touching
//! different items never contend.

pub mod catalogue;
pub mod item;

pub use catalogue::{Catalogue, CatalogueEntry};
pub use item::{StockGuard, StockItem, StockSnapshot};
