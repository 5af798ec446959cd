//! Background consistency check of ledger, settled log and stock.
//!
//! Every pass derives revenue twice, independently:
//!
//! - from the settled log: Σ bill totals
//! - from stock depletion: Σ (original − current quantity) × unit price
//!
//! and compares both against the ledger. Because a settlement updates all
//! three inside one books transaction, and the auditor reads them inside the
//! same transaction, any mismatch is a synchronization defect in settlement.

use std::sync::mpsc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, info_span, warn};

use tillsim_core::{Entity, Money, StockItemId};
use tillsim_inventory::Catalogue;

use crate::books::SettlementBooks;
use crate::pending::PendingWork;

/// One comparison that did not hold.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuditFailure {
    #[error("settled bills total {bills} but the ledger holds {ledger}")]
    LedgerMismatch { bills: Money, ledger: Money },

    #[error("stock depletion is worth {stock} but settled bills total {bills}")]
    StockMismatch { stock: Money, bills: Money },
}

/// Result of one audit pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    /// 1-based pass number.
    pub pass: u64,
    pub checked_at: DateTime<Utc>,
    pub settled_bills: usize,
    pub revenue_from_bills: Money,
    pub revenue_from_stock: Money,
    pub ledger_amount: Money,
    /// Items whose quantity is below zero. Informational: stock is never
    /// checked for availability, so this does not fail the pass.
    pub oversold: Vec<StockItemId>,
    pub failures: Vec<AuditFailure>,
    /// Whether every bill of the backlog had settled when this pass ran.
    pub final_pass: bool,
}

impl AuditReport {
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Everything the auditor saw during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditSummary {
    pub passes: u64,
    pub failed_passes: u64,
    /// The pass that ran after the backlog drained; `None` if aborted first.
    pub final_report: Option<AuditReport>,
    pub aborted: bool,
}

impl AuditSummary {
    /// The final pass ran and no pass ever failed.
    pub fn is_clean(&self) -> bool {
        self.failed_passes == 0 && self.final_report.as_ref().is_some_and(AuditReport::passed)
    }
}

/// The auditor; borrows the state it checks.
#[derive(Debug, Clone, Copy)]
pub struct Auditor<'a> {
    catalogue: &'a Catalogue,
    pending: &'a PendingWork,
    books: &'a SettlementBooks,
    interval: Duration,
}

impl<'a> Auditor<'a> {
    pub fn new(
        catalogue: &'a Catalogue,
        pending: &'a PendingWork,
        books: &'a SettlementBooks,
        interval: Duration,
    ) -> Self {
        Self {
            catalogue,
            pending,
            books,
            interval,
        }
    }

    /// Run one audit pass.
    ///
    /// Holds the books transaction for the whole pass; stock items are locked
    /// one by one inside it.
    pub fn audit(&self, pass: u64) -> AuditReport {
        let txn = self.books.transaction();

        let settled_bills = txn.log().len();
        let revenue_from_bills = txn.log().revenue();
        let ledger_amount = txn.ledger().amount();

        let mut revenue_from_stock = Money::ZERO;
        let mut oversold = Vec::new();
        for item in self.catalogue.items() {
            let stock = item.lock();
            revenue_from_stock += stock.depletion_value();
            if stock.quantity() < 0 {
                oversold.push(item.id());
            }
        }

        let final_pass = settled_bills == self.pending.backlog();
        drop(txn);

        let mut failures = Vec::new();
        if revenue_from_bills != ledger_amount {
            failures.push(AuditFailure::LedgerMismatch {
                bills: revenue_from_bills,
                ledger: ledger_amount,
            });
        }
        if revenue_from_stock != revenue_from_bills {
            failures.push(AuditFailure::StockMismatch {
                stock: revenue_from_stock,
                bills: revenue_from_bills,
            });
        }

        AuditReport {
            pass,
            checked_at: Utc::now(),
            settled_bills,
            revenue_from_bills,
            revenue_from_stock,
            ledger_amount,
            oversold,
            failures,
            final_pass,
        }
    }

    /// Audit every `interval` until a final pass has run.
    ///
    /// A message on (or disconnection of) `shutdown` stops the loop early
    /// without a final pass.
    pub fn run(self, shutdown: mpsc::Receiver<()>) -> AuditSummary {
        let span = info_span!("auditor");
        let _enter = span.enter();

        let mut summary = AuditSummary {
            passes: 0,
            failed_passes: 0,
            final_report: None,
            aborted: false,
        };

        loop {
            summary.passes += 1;
            let report = self.audit(summary.passes);
            log_report(&report);

            if !report.passed() {
                summary.failed_passes += 1;
            }
            if report.final_pass {
                info!(passes = summary.passes, "backlog settled, exiting check thread");
                summary.final_report = Some(report);
                break;
            }

            match shutdown.recv_timeout(self.interval) {
                Err(mpsc::RecvTimeoutError::Timeout) => continue,
                Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => {
                    warn!(passes = summary.passes, "auditor stopped before the backlog settled");
                    summary.aborted = true;
                    break;
                }
            }
        }

        summary
    }
}

fn log_report(report: &AuditReport) {
    if !report.oversold.is_empty() {
        warn!(pass = report.pass, items = ?report.oversold, "stock oversold");
    }

    if report.passed() {
        info!(
            pass = report.pass,
            settled = report.settled_bills,
            revenue_from_bills = %report.revenue_from_bills,
            revenue_from_stock = %report.revenue_from_stock,
            ledger = %report.ledger_amount,
            "inventory check passed"
        );
    } else {
        for failure in &report.failures {
            error!(
                pass = report.pass,
                settled = report.settled_bills,
                %failure,
                "inventory check failed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tillsim_core::{BillId, WorkerId};
    use tillsim_inventory::CatalogueEntry;
    use tillsim_sales::{Bill, BillLine};

    fn catalogue() -> Catalogue {
        Catalogue::from_entries(&[CatalogueEntry::new("Milk", 450, "l", 100)]).unwrap()
    }

    fn bill(catalogue: &Catalogue, id: u64, quantity: i64) -> Bill {
        let milk = catalogue.items()[0].clone();
        Bill::new(BillId::new(id), vec![BillLine::new(milk, quantity).unwrap()]).unwrap()
    }

    #[test]
    fn empty_run_passes_trivially_and_is_final() {
        let catalogue = catalogue();
        let pending = PendingWork::new(Vec::new());
        let books = SettlementBooks::new();

        let report = Auditor::new(&catalogue, &pending, &books, Duration::ZERO).audit(1);
        assert!(report.passed());
        assert!(report.final_pass);
        assert_eq!(report.revenue_from_bills, Money::ZERO);
        assert_eq!(report.revenue_from_stock, Money::ZERO);
        assert_eq!(report.ledger_amount, Money::ZERO);
    }

    #[test]
    fn consistent_settlements_pass() {
        let catalogue = catalogue();
        let pending = PendingWork::new(vec![bill(&catalogue, 0, 10), bill(&catalogue, 1, 10)]);
        let books = SettlementBooks::new();
        let auditor = Auditor::new(&catalogue, &pending, &books, Duration::ZERO);

        let taken = pending.try_take_one().unwrap();
        let total = taken.bill.total_sale_price();
        books.transaction().settle(taken.bill, WorkerId::new(0), total);

        let midway = auditor.audit(1);
        assert!(midway.passed());
        assert!(!midway.final_pass);

        let taken = pending.try_take_one().unwrap();
        let total = taken.bill.total_sale_price();
        books.transaction().settle(taken.bill, WorkerId::new(0), total);

        let report = auditor.audit(2);
        assert!(report.passed());
        assert!(report.final_pass);
        assert_eq!(report.revenue_from_bills, Money::from_minor(9000));
        assert_eq!(report.revenue_from_stock, Money::from_minor(9000));
        assert_eq!(report.ledger_amount, Money::from_minor(9000));
    }

    #[test]
    fn wrong_credit_is_a_ledger_mismatch() {
        let catalogue = catalogue();
        let pending = PendingWork::new(vec![bill(&catalogue, 0, 10)]);
        let books = SettlementBooks::new();

        let taken = pending.try_take_one().unwrap();
        books.transaction().settle(taken.bill, WorkerId::new(0), Money::from_minor(1));

        let report = Auditor::new(&catalogue, &pending, &books, Duration::ZERO).audit(1);
        assert_eq!(
            report.failures,
            vec![AuditFailure::LedgerMismatch {
                bills: Money::from_minor(4500),
                ledger: Money::from_minor(1),
            }]
        );
    }

    #[test]
    fn stock_moved_outside_settlement_is_a_stock_mismatch() {
        let catalogue = catalogue();
        let pending = PendingWork::new(Vec::new());
        let books = SettlementBooks::new();
        catalogue.items()[0].lock().withdraw(1);

        let report = Auditor::new(&catalogue, &pending, &books, Duration::ZERO).audit(1);
        assert_eq!(
            report.failures,
            vec![AuditFailure::StockMismatch {
                stock: Money::from_minor(450),
                bills: Money::ZERO,
            }]
        );
    }

    #[test]
    fn oversold_items_are_reported_without_failing() {
        let catalogue = catalogue();
        let pending = PendingWork::new(vec![bill(&catalogue, 0, 150)]);
        let books = SettlementBooks::new();

        let taken = pending.try_take_one().unwrap();
        let total = taken.bill.total_sale_price();
        books.transaction().settle(taken.bill, WorkerId::new(0), total);

        let report = Auditor::new(&catalogue, &pending, &books, Duration::ZERO).audit(1);
        assert!(report.passed());
        assert_eq!(report.oversold, vec![catalogue.items()[0].id()]);
    }

    #[test]
    fn run_stops_after_the_final_pass() {
        let catalogue = catalogue();
        let pending = PendingWork::new(Vec::new());
        let books = SettlementBooks::new();
        let (_tx, rx) = mpsc::channel();

        let summary = Auditor::new(&catalogue, &pending, &books, Duration::from_secs(60)).run(rx);
        assert_eq!(summary.passes, 1);
        assert!(!summary.aborted);
        assert!(summary.is_clean());
    }

    #[test]
    fn shutdown_aborts_an_unfinished_run() {
        let catalogue = catalogue();
        let pending = PendingWork::new(vec![bill(&catalogue, 0, 1)]);
        let books = SettlementBooks::new();
        let (tx, rx) = mpsc::channel();
        tx.send(()).unwrap();

        let summary = Auditor::new(&catalogue, &pending, &books, Duration::from_secs(60)).run(rx);
        assert_eq!(summary.passes, 1);
        assert!(summary.aborted);
        assert!(summary.final_report.is_none());
        assert!(!summary.is_clean());
    }
}
