//! End-to-end settlement runs: worker pool + auditor over real backlogs.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use proptest::prelude::*;

use tillsim_core::{BillId, Entity, Money, StockItemId};
use tillsim_engine::{BacklogConfig, BacklogGenerator, Simulation, SimulationConfig, SimulationReport};
use tillsim_inventory::{Catalogue, CatalogueEntry};
use tillsim_sales::{Bill, BillLine};

fn config(workers: usize) -> SimulationConfig {
    SimulationConfig::default()
        .with_workers(workers)
        .with_audit_interval(Duration::from_millis(2))
}

fn plentiful_catalogue() -> Vec<CatalogueEntry> {
    vec![
        CatalogueEntry::new("Milk", 450, "l", 1_000_000),
        CatalogueEntry::new("Bread", 600, "pcs", 1_000_000),
        CatalogueEntry::new("Chocolate", 1200, "pcs", 1_000_000),
    ]
}

fn run_generated(entries: &[CatalogueEntry], backlog: BacklogConfig, workers: usize) -> SimulationReport {
    let catalogue = Catalogue::from_entries(entries).unwrap();
    let bills = BacklogGenerator::new(backlog).unwrap().generate(&catalogue).unwrap();
    Simulation::new(config(workers), catalogue, bills)
        .unwrap()
        .run()
        .unwrap()
}

/// Checks every end-of-run property that must hold for a report.
fn assert_settled_consistently(report: &SimulationReport) {
    let log = &report.settled_log;

    // Every bill settled exactly once.
    assert_eq!(log.len(), report.backlog);
    let ids: HashSet<BillId> = log.entries().iter().map(|e| e.bill.id()).collect();
    assert_eq!(ids.len(), report.backlog);
    assert!(log.entries().iter().all(|e| e.bill.is_settled()));

    // Ledger equals the settled bills, exactly.
    assert_eq!(report.ledger.amount(), log.revenue());
    assert_eq!(report.ledger.postings(), report.backlog as u64);

    // quantity == original − Σ sold, per item.
    let mut sold: HashMap<StockItemId, i64> = HashMap::new();
    for entry in log.entries() {
        for line in entry.bill.lines() {
            *sold.entry(line.stock_id()).or_default() += line.sale_quantity();
        }
    }
    for item in &report.stock {
        let sold = sold.get(&item.id).copied().unwrap_or(0);
        assert_eq!(item.quantity, item.original_quantity - sold, "item {}", item.name);
    }

    // Worker totals add up.
    let settled_by_workers: u64 = report.workers.iter().map(|w| w.bills_settled).sum();
    assert_eq!(settled_by_workers, report.backlog as u64);
    let revenue_by_workers: Money = report.workers.iter().map(|w| w.revenue).sum();
    assert_eq!(revenue_by_workers, report.ledger.amount());

    // The auditor's final pass saw all three totals agree.
    let last = report.audit.final_report.as_ref().expect("final audit pass");
    assert!(last.final_pass);
    assert!(last.passed(), "final audit failed: {:?}", last.failures);
    assert_eq!(last.revenue_from_bills, report.ledger.amount());
    assert_eq!(last.revenue_from_stock, report.ledger.amount());
    assert_eq!(last.ledger_amount, report.ledger.amount());
    assert_eq!(report.audit.failed_passes, 0);
    assert!(!report.audit.aborted);
}

#[test]
fn two_bills_of_ten_units_leave_eighty_and_nine_thousand() {
    let catalogue = Catalogue::from_entries(&[CatalogueEntry::new("Milk", 450, "l", 100)]).unwrap();
    let milk = catalogue.items()[0].clone();
    let bills = vec![
        Bill::new(BillId::new(0), vec![BillLine::new(milk.clone(), 10).unwrap()]).unwrap(),
        Bill::new(BillId::new(1), vec![BillLine::new(milk.clone(), 10).unwrap()]).unwrap(),
    ];

    let report = Simulation::new(config(10), catalogue, bills).unwrap().run().unwrap();

    assert_eq!(milk.quantity(), 80);
    assert_eq!(report.stock[0].quantity, 80);
    assert_eq!(report.ledger.amount(), Money::from_minor(9000));

    let last = report.audit.final_report.as_ref().unwrap();
    assert!(last.passed());
    assert_eq!(last.revenue_from_bills, Money::from_minor(9000));
    assert_eq!(last.revenue_from_stock, Money::from_minor(9000));
    assert_settled_consistently(&report);
}

#[test]
fn empty_backlog_audits_once_and_passes() {
    let catalogue = Catalogue::from_entries(&plentiful_catalogue()).unwrap();

    let report = Simulation::new(config(4), catalogue, Vec::new()).unwrap().run().unwrap();

    assert_eq!(report.audit.passes, 1);
    assert!(report.audit.is_clean());
    let last = report.audit.final_report.as_ref().unwrap();
    assert_eq!(last.revenue_from_bills, Money::ZERO);
    assert_eq!(last.revenue_from_stock, Money::ZERO);
    assert_eq!(last.ledger_amount, Money::ZERO);
    assert!(report.workers.iter().all(|w| w.bills_settled == 0));
}

#[test]
fn pool_size_does_not_change_the_outcome() {
    let backlog = BacklogConfig::default()
        .with_bills(1_500)
        .with_lines_per_bill(1..=12)
        .with_seed(2024);

    let single = run_generated(&plentiful_catalogue(), backlog.clone(), 1);
    let pooled = run_generated(&plentiful_catalogue(), backlog, 8);

    assert_eq!(single.ledger.amount(), pooled.ledger.amount());
    let quantities = |r: &SimulationReport| r.stock.iter().map(|s| s.quantity).collect::<Vec<_>>();
    assert_eq!(quantities(&single), quantities(&pooled));

    assert_settled_consistently(&single);
    assert_settled_consistently(&pooled);
}

#[test]
fn large_contended_run_stays_consistent_at_every_audit() {
    let backlog = BacklogConfig::default()
        .with_bills(5_000)
        .with_lines_per_bill(5..=40)
        .with_seed(99);

    let report = run_generated(&plentiful_catalogue(), backlog, 10);

    assert_settled_consistently(&report);
    for item in &report.stock {
        assert!(item.quantity >= 0 && item.quantity <= item.original_quantity);
    }
}

#[test]
fn scarce_stock_is_oversold_but_still_balances() {
    let entries = vec![
        CatalogueEntry::new("Milk", 450, "l", 1_000_000),
        CatalogueEntry::new("Chocolate", 1200, "pcs", 5),
    ];
    let backlog = BacklogConfig::default().with_bills(300).with_seed(5);

    let report = run_generated(&entries, backlog, 6);

    assert_settled_consistently(&report);
    let chocolate = &report.stock[1];
    assert!(chocolate.quantity < 0);
    let last = report.audit.final_report.as_ref().unwrap();
    assert_eq!(last.oversold, vec![chocolate.id]);
}

#[test]
fn report_serializes_without_the_settled_log() {
    let backlog = BacklogConfig::default().with_bills(10).with_seed(1);
    let report = run_generated(&plentiful_catalogue(), backlog, 2);

    let json = serde_json::to_value(&report).unwrap();
    assert!(json.get("settled_log").is_none());
    assert_eq!(json["backlog"], 10);
    assert_eq!(json["ledger"]["amount"], report.ledger.amount().minor());
    assert!(json["audit"]["final_report"]["failures"].as_array().unwrap().is_empty());
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 16,
        ..ProptestConfig::default()
    })]

    /// Property: for any backlog and pool size, the run ends balanced and
    /// matches a single-threaded run of the same backlog.
    #[test]
    fn any_backlog_settles_to_the_same_books(
        bills in 0usize..200,
        max_lines in 1usize..15,
        workers in 1usize..8,
        seed in any::<u64>(),
    ) {
        let backlog = BacklogConfig::default()
            .with_bills(bills)
            .with_lines_per_bill(1..=max_lines)
            .with_seed(seed);

        let reference = run_generated(&plentiful_catalogue(), backlog.clone(), 1);
        let report = run_generated(&plentiful_catalogue(), backlog, workers);

        assert_settled_consistently(&report);
        prop_assert_eq!(report.ledger.amount(), reference.ledger.amount());
        for (a, b) in report.stock.iter().zip(&reference.stock) {
            prop_assert_eq!(a.quantity, b.quantity);
        }
    }
}
