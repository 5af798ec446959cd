//! Accounting module: the revenue ledger and the log of settled bills.
//!
//! Pure bookkeeping only. Neither type locks anything itself; the engine keeps
//! both behind the books transaction so they always move together.

pub mod ledger;
pub mod settled_log;

pub use ledger::Ledger;
pub use settled_log::{SettledBill, SettledLog};
