//! Concurrent settlement engine.
//!
//! ## Design
//!
//! - Bills wait on a shared LIFO stack ([`PendingWork`]) and are popped by a
//!   fixed pool of worker threads
//! - The settled log and the ledger are only reachable through a
//!   [`BooksTransaction`], which locks them in one fixed order (log, then ledger)
//! - Stock item locks are innermost and held one at a time
//! - An [`Auditor`] thread periodically re-derives revenue from the settled log
//!   and from stock depletion and compares both against the ledger
//!
//! ## Components
//!
//! - `PendingWork`: backlog of bills not yet settled
//! - `SettlementBooks`: settled log + ledger behind the lock protocol
//! - `SettlementWorker`: drains the backlog
//! - `Auditor`: continuous consistency oracle
//! - `Simulation`: owns the shared state and runs the threads
//! - `BacklogGenerator`: builds random backlogs for a catalogue

pub mod auditor;
pub mod books;
pub mod config;
pub mod error;
pub mod generator;
pub mod pending;
pub mod simulation;
pub mod worker;

mod sync;

pub use auditor::{AuditFailure, AuditReport, AuditSummary, Auditor};
pub use books::{BooksTransaction, SettlementBooks, SettlementReceipt};
pub use config::SimulationConfig;
pub use error::{EngineError, EngineResult};
pub use generator::{BacklogConfig, BacklogGenerator, default_catalogue};
pub use pending::{PendingWork, TakenBill};
pub use simulation::{Simulation, SimulationReport};
pub use worker::{SettlementWorker, WorkerStats};
