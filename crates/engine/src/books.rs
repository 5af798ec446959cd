//! Settled log + ledger, and the lock protocol that guards them.
//!
//! Lock order, enforced by construction:
//!
//! 1. settled log
//! 2. ledger
//! 3. at most one stock item at a time (innermost)
//!
//! The log and the ledger are private to [`SettlementBooks`] and only reachable
//! through [`SettlementBooks::transaction`], which always takes both in that
//! order. Stock item locks may be taken inside a transaction or outside one,
//! but a transaction is never opened while an item lock is held.

use std::sync::{Mutex, MutexGuard};

use serde::Serialize;

use tillsim_accounting::{Ledger, SettledLog};
use tillsim_core::{Money, WorkerId};
use tillsim_sales::Bill;

use crate::sync::lock;

/// The settled log and the ledger, each behind its own mutex.
#[derive(Debug, Default)]
pub struct SettlementBooks {
    log: Mutex<SettledLog>,
    ledger: Mutex<Ledger>,
}

impl SettlementBooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-size the log for a backlog of `bills`.
    pub fn with_capacity(bills: usize) -> Self {
        Self {
            log: Mutex::new(SettledLog::with_capacity(bills)),
            ledger: Mutex::new(Ledger::new()),
        }
    }

    /// Lock the log, then the ledger.
    pub fn transaction(&self) -> BooksTransaction<'_> {
        let log = lock(&self.log);
        let ledger = lock(&self.ledger);
        BooksTransaction { log, ledger }
    }

    pub fn into_parts(self) -> (SettledLog, Ledger) {
        let log = self
            .log
            .into_inner()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let ledger = self
            .ledger
            .into_inner()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        (log, ledger)
    }
}

/// Both book locks, held together.
#[derive(Debug)]
pub struct BooksTransaction<'a> {
    log: MutexGuard<'a, SettledLog>,
    ledger: MutexGuard<'a, Ledger>,
}

/// What one settlement recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SettlementReceipt {
    pub sequence: u64,
    pub lines: usize,
    pub revenue: Money,
}

impl BooksTransaction<'_> {
    pub fn log(&self) -> &SettledLog {
        &self.log
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Record a settlement: append the bill (marking it settled), credit
    /// `revenue` to the ledger, then withdraw every line's quantity from its
    /// stock item.
    ///
    /// All three happen before the transaction is released, so an auditor
    /// holding the same transaction never sees a partial settlement.
    pub fn settle(&mut self, bill: Bill, worker: WorkerId, revenue: Money) -> SettlementReceipt {
        let lines = bill.lines().len();
        let sequence = self.log.append(bill, worker);
        self.ledger.credit(revenue);

        let entry = &self.log.entries()[sequence as usize];
        for line in entry.bill.lines() {
            line.stock().lock().withdraw(line.sale_quantity());
        }

        SettlementReceipt {
            sequence,
            lines,
            revenue,
        }
    }
}
