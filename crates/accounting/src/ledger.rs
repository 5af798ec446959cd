use serde::Serialize;

use tillsim_core::Money;

/// Running total of settled revenue.
///
/// Note: the ledger does NOT know which bills produced its amount; that is the
/// settled log's job. The auditor cross-checks the two.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Ledger {
    amount: Money,
    postings: u64,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one bill's revenue.
    pub fn credit(&mut self, amount: Money) {
        self.amount += amount;
        self.postings += 1;
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    /// Number of credits applied so far.
    pub fn postings(&self) -> u64 {
        self.postings
    }
}
