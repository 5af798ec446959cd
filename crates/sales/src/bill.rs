use std::sync::Arc;

use serde::{Deserialize, Serialize};

use tillsim_core::{BillId, DomainError, DomainResult, Entity, Money, StockItemId};
use tillsim_inventory::StockItem;

/// Bill status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillStatus {
    Pending,
    Settled,
}

/// Bill line: stock item, quantity sold, price of the line.
#[derive(Debug, Clone)]
pub struct BillLine {
    stock: Arc<StockItem>,
    sale_quantity: i64,
    /// `sale_quantity × unit_price`, fixed when the line is created.
    sale_price: Money,
}

impl BillLine {
    pub fn new(stock: Arc<StockItem>, sale_quantity: i64) -> DomainResult<Self> {
        if sale_quantity <= 0 {
            return Err(DomainError::validation(format!(
                "sale quantity of {} must be positive",
                stock.name()
            )));
        }
        let sale_price = stock.unit_price().checked_mul(sale_quantity).ok_or_else(|| {
            DomainError::validation(format!(
                "price of {sale_quantity} x {} overflows",
                stock.name()
            ))
        })?;
        Ok(Self {
            stock,
            sale_quantity,
            sale_price,
        })
    }

    pub fn stock(&self) -> &StockItem {
        &self.stock
    }

    pub fn stock_id(&self) -> StockItemId {
        self.stock.id()
    }

    pub fn sale_quantity(&self) -> i64 {
        self.sale_quantity
    }

    pub fn sale_price(&self) -> Money {
        self.sale_price
    }
}

/// A sale request: lines plus a total computed at creation.
#[derive(Debug, Clone)]
pub struct Bill {
    id: BillId,
    lines: Vec<BillLine>,
    total_sale_price: Money,
    status: BillStatus,
}

impl Bill {
    pub fn new(id: BillId, lines: Vec<BillLine>) -> DomainResult<Self> {
        if lines.is_empty() {
            return Err(DomainError::validation(format!("bill {id} must have lines")));
        }
        let total_sale_price = lines
            .iter()
            .try_fold(Money::ZERO, |total, line| total.checked_add(line.sale_price()))
            .ok_or_else(|| DomainError::invariant(format!("bill {id} total overflow")))?;
        Ok(Self {
            id,
            lines,
            total_sale_price,
            status: BillStatus::Pending,
        })
    }

    pub fn lines(&self) -> &[BillLine] {
        &self.lines
    }

    pub fn total_sale_price(&self) -> Money {
        self.total_sale_price
    }

    pub fn status(&self) -> BillStatus {
        self.status
    }

    pub fn is_settled(&self) -> bool {
        matches!(self.status, BillStatus::Settled)
    }

    /// Pending → Settled. Settling is one-way and happens once per bill: the
    /// only caller owns the bill by value, having taken it off the backlog.
    pub fn mark_settled(&mut self) {
        debug_assert!(!self.is_settled(), "bill {} settled twice", self.id);
        self.status = BillStatus::Settled;
    }
}

impl Entity for Bill {
    type Id = BillId;

    fn id(&self) -> BillId {
        self.id
    }
}
