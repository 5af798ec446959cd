//! `tillsim-core` — domain building blocks shared by every settlement crate.
//!
//! This crate contains **pure domain** primitives (no threads, no IO).

pub mod entity;
pub mod error;
pub mod id;
pub mod money;
pub mod value_object;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{BillId, RunId, StockItemId, WorkerId};
pub use money::Money;
pub use value_object::ValueObject;
