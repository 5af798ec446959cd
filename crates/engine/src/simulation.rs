//! Run coordinator: owns the shared state, runs the worker pool and the auditor.

use std::sync::mpsc;
use std::thread;
use std::time::Instant;

use serde::Serialize;
use tracing::{error, info, info_span};

use tillsim_accounting::{Ledger, SettledLog};
use tillsim_core::{DomainError, Money, RunId, WorkerId};
use tillsim_inventory::{Catalogue, StockSnapshot};
use tillsim_sales::Bill;

use crate::auditor::{AuditSummary, Auditor};
use crate::books::SettlementBooks;
use crate::config::SimulationConfig;
use crate::error::{EngineError, EngineResult};
use crate::pending::PendingWork;
use crate::worker::{SettlementWorker, WorkerStats};

/// Outcome of a completed run.
#[derive(Debug, Serialize)]
pub struct SimulationReport {
    pub run_id: RunId,
    pub backlog: usize,
    pub workers: Vec<WorkerStats>,
    pub ledger: Ledger,
    pub stock: Vec<StockSnapshot>,
    pub audit: AuditSummary,
    pub elapsed_ms: u64,
    /// Every settled bill, in settlement order.
    #[serde(skip)]
    pub settled_log: SettledLog,
}

/// One settlement run over a fixed catalogue and backlog.
///
/// Catalogue, backlog and books live exactly as long as the simulation; the
/// worker and auditor threads borrow them and are joined before `run` returns.
#[derive(Debug)]
pub struct Simulation {
    run_id: RunId,
    config: SimulationConfig,
    catalogue: Catalogue,
    pending: PendingWork,
    books: SettlementBooks,
}

impl Simulation {
    pub fn new(config: SimulationConfig, catalogue: Catalogue, bills: Vec<Bill>) -> EngineResult<Self> {
        config.validate()?;
        // Every revenue figure the auditor derives is bounded by this total.
        bills
            .iter()
            .try_fold(Money::ZERO, |total, bill| total.checked_add(bill.total_sale_price()))
            .ok_or_else(|| DomainError::invariant("backlog revenue overflow"))?;
        let books = SettlementBooks::with_capacity(bills.len());
        Ok(Self {
            run_id: RunId::new(),
            config,
            catalogue,
            pending: PendingWork::new(bills),
            books,
        })
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Settle the whole backlog and return the report.
    ///
    /// Fails only if a thread cannot be spawned or dies; audit failures are
    /// reported in the result, not raised.
    pub fn run(self) -> EngineResult<SimulationReport> {
        let span = info_span!("simulation", run_id = %self.run_id);
        let _enter = span.enter();
        let started = Instant::now();

        info!(
            workers = self.config.workers,
            bills = self.pending.backlog(),
            items = self.catalogue.len(),
            "starting settlement run"
        );

        let (workers, audit) = self.run_threads()?;

        let (settled_log, ledger) = self.books.into_parts();
        let report = SimulationReport {
            run_id: self.run_id,
            backlog: self.pending.backlog(),
            workers,
            ledger,
            stock: self.catalogue.snapshot(),
            audit,
            elapsed_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            settled_log,
        };

        info!(
            settled = report.settled_log.len(),
            ledger = %report.ledger.amount(),
            audit_passes = report.audit.passes,
            failed_passes = report.audit.failed_passes,
            elapsed_ms = report.elapsed_ms,
            "settlement run finished"
        );
        Ok(report)
    }

    fn run_threads(&self) -> EngineResult<(Vec<WorkerStats>, AuditSummary)> {
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let auditor = Auditor::new(
            &self.catalogue,
            &self.pending,
            &self.books,
            self.config.audit_interval,
        );

        // Spans do not follow threads; each spawned thread re-enters the run span.
        let parent = tracing::Span::current();

        thread::scope(|scope| -> EngineResult<(Vec<WorkerStats>, AuditSummary)> {
            let audit_span = parent.clone();
            let auditor_handle = thread::Builder::new()
                .name("auditor".to_string())
                .spawn_scoped(scope, move || audit_span.in_scope(|| auditor.run(shutdown_rx)))
                .map_err(|source| EngineError::Spawn {
                    role: "auditor".to_string(),
                    source,
                })?;

            let mut handles = Vec::with_capacity(self.config.workers);
            for index in 0..self.config.workers {
                let name = format!("settlement-worker-{index}");
                let worker = SettlementWorker::new(
                    WorkerId::new(index as u32),
                    &self.pending,
                    &self.books,
                    self.config.progress_every,
                );
                let worker_span = parent.clone();
                let spawned = thread::Builder::new()
                    .name(name.clone())
                    .spawn_scoped(scope, move || worker_span.in_scope(|| worker.run()));

                match spawned {
                    Ok(handle) => handles.push((name, handle)),
                    Err(source) => {
                        error!(worker = %name, error = %source, "failed to spawn settlement worker");
                        // Spawned workers still drain the backlog; the auditor
                        // must not wait for bills nobody will settle.
                        let _ = shutdown_tx.send(());
                        return Err(EngineError::Spawn { role: name, source });
                    }
                }
            }

            let mut stats = Vec::with_capacity(handles.len());
            let mut panicked = None;
            for (name, handle) in handles {
                match handle.join() {
                    Ok(worker_stats) => stats.push(worker_stats),
                    Err(_) => {
                        error!(worker = %name, "settlement worker panicked");
                        panicked.get_or_insert(name);
                    }
                }
            }

            if let Some(name) = panicked {
                let _ = shutdown_tx.send(());
                let _ = auditor_handle.join();
                return Err(EngineError::WorkerPanicked { name });
            }

            let audit = auditor_handle
                .join()
                .map_err(|_| EngineError::AuditorPanicked)?;
            Ok((stats, audit))
        })
    }
}
