//! Command-line arguments for `tillsim`.
//!
//! Every flag can also be set through a `TILLSIM_*` environment variable.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use tillsim_engine::{BacklogConfig, SimulationConfig};
use tillsim_observability::LogFormat;

#[derive(Parser, Debug)]
#[command(name = "tillsim", about = "Concurrent bill settlement with a continuous ledger audit")]
pub struct Args {
    /// Number of settlement worker threads.
    #[arg(long, env = "TILLSIM_WORKERS", default_value_t = 10)]
    pub workers: usize,

    /// Number of bills in the generated backlog.
    #[arg(long, env = "TILLSIM_BILLS", default_value_t = 10_000)]
    pub bills: usize,

    /// Minimum number of lines per bill.
    #[arg(long, env = "TILLSIM_MIN_LINES", default_value_t = 5)]
    pub min_lines: usize,

    /// Maximum number of lines per bill.
    #[arg(long, env = "TILLSIM_MAX_LINES", default_value_t = 50)]
    pub max_lines: usize,

    /// Minimum quantity sold per line.
    #[arg(long, env = "TILLSIM_MIN_QUANTITY", default_value_t = 1)]
    pub min_quantity: i64,

    /// Maximum quantity sold per line.
    #[arg(long, env = "TILLSIM_MAX_QUANTITY", default_value_t = 10)]
    pub max_quantity: i64,

    /// Seed for a reproducible backlog. Random when omitted.
    #[arg(long, env = "TILLSIM_SEED")]
    pub seed: Option<u64>,

    /// Milliseconds between two audit passes.
    #[arg(long, env = "TILLSIM_AUDIT_INTERVAL_MS", default_value_t = 1_000)]
    pub audit_interval_ms: u64,

    /// Log a progress line for every bill index divisible by this.
    #[arg(long, env = "TILLSIM_PROGRESS_EVERY", default_value_t = 100)]
    pub progress_every: usize,

    /// JSON file with the catalogue (array of {name, unit_price, unit, initial_quantity}).
    /// The built-in milk/bread/chocolate catalogue is used when omitted.
    #[arg(long, env = "TILLSIM_CATALOGUE")]
    pub catalogue: Option<PathBuf>,

    /// Log line format.
    #[arg(long, env = "TILLSIM_LOG_FORMAT", value_enum, default_value_t = LogFormatArg::Text)]
    pub log_format: LogFormatArg,

    /// Print the final report as JSON instead of a summary.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Text,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Text => LogFormat::Text,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

impl Args {
    pub fn simulation_config(&self) -> SimulationConfig {
        SimulationConfig::default()
            .with_workers(self.workers)
            .with_audit_interval(Duration::from_millis(self.audit_interval_ms))
            .with_progress_every(self.progress_every)
    }

    pub fn backlog_config(&self) -> BacklogConfig {
        let config = BacklogConfig::default()
            .with_bills(self.bills)
            .with_lines_per_bill(self.min_lines..=self.max_lines)
            .with_quantity_per_line(self.min_quantity..=self.max_quantity);
        match self.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        }
    }
}
