//! Sales domain module: bills waiting to be settled.
//!
//! A bill is built once, priced once, and settled at most once. It carries no
//! lock of its own; exclusive ownership moves from the backlog to a worker and
//! then into the settled log.

pub mod bill;

pub use bill::{Bill, BillLine, BillStatus};
