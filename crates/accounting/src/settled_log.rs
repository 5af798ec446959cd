use chrono::{DateTime, Utc};

use tillsim_core::{Money, WorkerId};
use tillsim_sales::Bill;

/// One entry of the settled log.
#[derive(Debug)]
pub struct SettledBill {
    /// 0-based append position.
    pub sequence: u64,
    pub worker: WorkerId,
    pub settled_at: DateTime<Utc>,
    pub bill: Bill,
}

/// Append-only record of settled bills.
///
/// The log owns every bill it holds; once appended an entry is never removed
/// or modified.
#[derive(Debug, Default)]
pub struct SettledLog {
    entries: Vec<SettledBill>,
}

impl SettledLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Mark `bill` settled and take ownership of it. Returns the entry's sequence.
    pub fn append(&mut self, mut bill: Bill, worker: WorkerId) -> u64 {
        bill.mark_settled();
        let sequence = self.entries.len() as u64;
        self.entries.push(SettledBill {
            sequence,
            worker,
            settled_at: Utc::now(),
            bill,
        });
        sequence
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[SettledBill] {
        &self.entries
    }

    /// Σ total sale price over every settled bill.
    pub fn revenue(&self) -> Money {
        self.entries.iter().map(|e| e.bill.total_sale_price()).sum()
    }
}
