//! Backlog of bills waiting for a worker.

use std::sync::Mutex;

use tillsim_sales::Bill;

use crate::sync::lock;

/// A bill removed from the backlog, with the backlog index it occupied.
#[derive(Debug)]
pub struct TakenBill {
    pub index: usize,
    pub bill: Bill,
}

/// Shared stack of unsettled bills.
///
/// Last in, first out. The lock is held only for the pop itself, so removal
/// and the remaining-count update are one atomic step and a bill is handed out
/// at most once.
#[derive(Debug)]
pub struct PendingWork {
    bills: Mutex<Vec<Bill>>,
    backlog: usize,
}

impl PendingWork {
    pub fn new(bills: Vec<Bill>) -> Self {
        let backlog = bills.len();
        Self {
            bills: Mutex::new(bills),
            backlog,
        }
    }

    /// Remove and return the most recently added bill, or `None` once the
    /// backlog is exhausted. Never blocks beyond the pop.
    pub fn try_take_one(&self) -> Option<TakenBill> {
        let mut bills = lock(&self.bills);
        let bill = bills.pop()?;
        Some(TakenBill {
            index: bills.len(),
            bill,
        })
    }

    pub fn remaining(&self) -> usize {
        lock(&self.bills).len()
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Number of bills the backlog started with.
    pub fn backlog(&self) -> usize {
        self.backlog
    }
}
