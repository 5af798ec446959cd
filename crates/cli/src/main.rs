mod args;

use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use tillsim_engine::{BacklogGenerator, Simulation, SimulationReport, default_catalogue};
use tillsim_inventory::{Catalogue, CatalogueEntry};

use crate::args::Args;

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    tillsim_observability::init(args.log_format.into());

    let entries = match &args.catalogue {
        Some(path) => load_catalogue(path)?,
        None => default_catalogue(),
    };

    tracing::info!(items = entries.len(), "generating stocks");
    let catalogue = Catalogue::from_entries(&entries).context("invalid catalogue")?;

    tracing::info!(bills = args.bills, "generating bills");
    let bills = BacklogGenerator::new(args.backlog_config())
        .and_then(|mut generator| generator.generate(&catalogue))
        .context("failed to generate the bill backlog")?;

    let report = Simulation::new(args.simulation_config(), catalogue, bills)?
        .run()
        .context("settlement run aborted")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }

    Ok(if report.audit.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn load_catalogue(path: &Path) -> anyhow::Result<Vec<CatalogueEntry>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read catalogue {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse catalogue {}", path.display()))
}

fn print_summary(report: &SimulationReport) {
    println!("run {}", report.run_id);
    println!(
        "settled {} bills with {} workers in {} ms",
        report.backlog,
        report.workers.len(),
        report.elapsed_ms
    );
    println!("ledger: {}", report.ledger.amount());

    println!("stock:");
    for item in &report.stock {
        let marker = if item.is_oversold() { "  (oversold)" } else { "" };
        println!(
            "  {:>15}: {:>8} x{:>8} {:<3} (started at {}){marker}",
            item.name, item.unit_price, item.quantity, item.unit, item.original_quantity
        );
    }

    println!(
        "audit: {} passes, {} failed",
        report.audit.passes, report.audit.failed_passes
    );
    match &report.audit.final_report {
        Some(last) if last.passed() => println!(
            "INVENTORY CHECK: PASSED (bills {} = stock {} = ledger {})",
            last.revenue_from_bills, last.revenue_from_stock, last.ledger_amount
        ),
        Some(last) => {
            println!("INVENTORY CHECK: FAILED");
            for failure in &last.failures {
                println!("  {failure}");
            }
        }
        None => println!("INVENTORY CHECK: no final pass (auditor stopped early)"),
    }
}
