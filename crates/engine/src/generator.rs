//! Random backlog generation.

use std::ops::RangeInclusive;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use tillsim_core::{BillId, StockItemId};
use tillsim_inventory::{Catalogue, CatalogueEntry};
use tillsim_sales::{Bill, BillLine};

use crate::error::{EngineError, EngineResult};

/// The reference catalogue: milk, bread and a deliberately scarce chocolate.
pub fn default_catalogue() -> Vec<CatalogueEntry> {
    vec![
        CatalogueEntry::new("Milk", 450, "l", 154_572),
        CatalogueEntry::new("Bread", 600, "pcs", 264_654),
        CatalogueEntry::new("Chocolate", 1200, "pcs", 98),
    ]
}

/// Shape of a generated backlog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BacklogConfig {
    pub bills: usize,
    pub lines_per_bill: RangeInclusive<usize>,
    pub quantity_per_line: RangeInclusive<i64>,
    /// Fixed seed for a reproducible backlog; OS entropy when `None`.
    pub seed: Option<u64>,
}

impl Default for BacklogConfig {
    fn default() -> Self {
        Self {
            bills: 10_000,
            lines_per_bill: 5..=50,
            quantity_per_line: 1..=10,
            seed: None,
        }
    }
}

impl BacklogConfig {
    pub fn with_bills(mut self, bills: usize) -> Self {
        self.bills = bills;
        self
    }

    pub fn with_lines_per_bill(mut self, lines: RangeInclusive<usize>) -> Self {
        self.lines_per_bill = lines;
        self
    }

    pub fn with_quantity_per_line(mut self, quantity: RangeInclusive<i64>) -> Self {
        self.quantity_per_line = quantity;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.lines_per_bill.is_empty() || *self.lines_per_bill.start() == 0 {
            return Err(EngineError::config(format!(
                "lines per bill must be a non-empty range starting at 1 or more (got {:?})",
                self.lines_per_bill
            )));
        }
        if self.quantity_per_line.is_empty() || *self.quantity_per_line.start() <= 0 {
            return Err(EngineError::config(format!(
                "quantity per line must be a non-empty positive range (got {:?})",
                self.quantity_per_line
            )));
        }
        Ok(())
    }
}

/// Builds bills against a catalogue.
#[derive(Debug)]
pub struct BacklogGenerator {
    config: BacklogConfig,
    rng: StdRng,
}

impl BacklogGenerator {
    pub fn new(config: BacklogConfig) -> EngineResult<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Ok(Self { config, rng })
    }

    /// Generate the configured number of bills. Each line picks a uniformly
    /// random catalogue item and quantity.
    pub fn generate(&mut self, catalogue: &Catalogue) -> EngineResult<Vec<Bill>> {
        if self.config.bills > 0 && catalogue.is_empty() {
            return Err(EngineError::config("cannot generate bills for an empty catalogue"));
        }

        let item_count = u32::try_from(catalogue.len())
            .map_err(|_| EngineError::config("catalogue has too many items"))?;

        let mut bills = Vec::with_capacity(self.config.bills);
        for index in 0..self.config.bills {
            let line_count = self.rng.random_range(self.config.lines_per_bill.clone());
            let mut lines = Vec::with_capacity(line_count);
            for _ in 0..line_count {
                let item = catalogue.get(StockItemId::new(self.rng.random_range(0..item_count)))?;
                let quantity = self.rng.random_range(self.config.quantity_per_line.clone());
                lines.push(BillLine::new(item.clone(), quantity)?);
            }
            bills.push(Bill::new(BillId::new(index as u64), lines)?);
        }

        debug!(bills = bills.len(), "backlog generated");
        Ok(bills)
    }
}
