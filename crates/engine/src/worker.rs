//! Settlement workers: drain the backlog one bill at a time.

use serde::Serialize;
use tracing::{debug, info, info_span};

use tillsim_core::{Entity, Money, WorkerId};
use tillsim_sales::Bill;

use crate::books::{SettlementBooks, SettlementReceipt};
use crate::pending::PendingWork;

/// Per-worker totals, returned when the worker exits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkerStats {
    pub worker: WorkerId,
    pub bills_settled: u64,
    pub lines_settled: u64,
    pub revenue: Money,
}

impl WorkerStats {
    pub fn new(worker: WorkerId) -> Self {
        Self {
            worker,
            bills_settled: 0,
            lines_settled: 0,
            revenue: Money::ZERO,
        }
    }

    fn record(&mut self, receipt: &SettlementReceipt) {
        self.bills_settled += 1;
        self.lines_settled += receipt.lines as u64;
        self.revenue += receipt.revenue;
    }
}

/// One member of the settlement pool.
///
/// Borrows the shared state for the lifetime of the run; the simulation owns
/// it and outlives every worker thread.
#[derive(Debug, Clone, Copy)]
pub struct SettlementWorker<'a> {
    id: WorkerId,
    pending: &'a PendingWork,
    books: &'a SettlementBooks,
    progress_every: usize,
}

impl<'a> SettlementWorker<'a> {
    pub fn new(
        id: WorkerId,
        pending: &'a PendingWork,
        books: &'a SettlementBooks,
        progress_every: usize,
    ) -> Self {
        Self {
            id,
            pending,
            books,
            progress_every: progress_every.max(1),
        }
    }

    /// Settle bills until the backlog is empty.
    pub fn run(self) -> WorkerStats {
        let span = info_span!("settlement_worker", worker = %self.id);
        let _enter = span.enter();

        let mut stats = WorkerStats::new(self.id);

        while let Some(taken) = self.pending.try_take_one() {
            let milestone = taken.index % self.progress_every == 0;
            if milestone {
                info!(bill = taken.index, "starting processing bill");
            }

            let receipt = self.settle(taken.bill);
            stats.record(&receipt);

            if milestone {
                info!(bill = taken.index, "finished processing bill");
            }
        }

        info!(
            bills = stats.bills_settled,
            lines = stats.lines_settled,
            revenue = %stats.revenue,
            "backlog empty, settlement worker exiting"
        );
        stats
    }

    /// Settle one bill.
    ///
    /// First the revenue is accumulated line by line, each line under its
    /// stock item's lock. Then, inside one books transaction, the bill is
    /// logged, the ledger credited and the stock withdrawn.
    pub fn settle(&self, bill: Bill) -> SettlementReceipt {
        let revenue: Money = bill
            .lines()
            .iter()
            .map(|line| {
                let _stock = line.stock().lock();
                line.sale_price()
            })
            .sum();

        let bill_id = bill.id();
        let receipt = self.books.transaction().settle(bill, self.id, revenue);

        debug!(
            bill = %bill_id,
            sequence = receipt.sequence,
            lines = receipt.lines,
            revenue = %receipt.revenue,
            "bill settled"
        );
        receipt
    }
}
