use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use tillsim_core::{DomainError, DomainResult, Entity, Money, StockItemId};

/// A single product's inventory record.
///
/// Name, unit, unit price and original quantity are fixed at creation and can
/// be read without locking. The current quantity lives behind the item's own
/// mutex and is only reachable through [`StockItem::lock`].
#[derive(Debug)]
pub struct StockItem {
    id: StockItemId,
    name: String,
    unit: String,
    unit_price: Money,
    original_quantity: i64,
    quantity: Mutex<i64>,
}

impl StockItem {
    pub fn new(
        id: StockItemId,
        name: impl Into<String>,
        unit_price: Money,
        unit: impl Into<String>,
        initial_quantity: i64,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("stock item name cannot be empty"));
        }
        if unit_price.is_negative() {
            return Err(DomainError::validation(format!(
                "unit price of {name} cannot be negative"
            )));
        }
        if initial_quantity < 0 {
            return Err(DomainError::validation(format!(
                "initial quantity of {name} cannot be negative"
            )));
        }
        if unit_price.checked_mul(initial_quantity).is_none() {
            return Err(DomainError::validation(format!(
                "stock value of {name} overflows"
            )));
        }

        Ok(Self {
            id,
            name,
            unit: unit.into(),
            unit_price,
            original_quantity: initial_quantity,
            quantity: Mutex::new(initial_quantity),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    pub fn original_quantity(&self) -> i64 {
        self.original_quantity
    }

    /// Take this item's exclusive lock.
    ///
    /// Item locks are always innermost: hold at most one at a time, and never
    /// open a books transaction while holding one.
    pub fn lock(&self) -> StockGuard<'_> {
        StockGuard {
            item: self,
            quantity: self.quantity.lock().unwrap_or_else(PoisonError::into_inner),
        }
    }

    /// Current quantity, read under a short-lived lock.
    pub fn quantity(&self) -> i64 {
        self.lock().quantity()
    }

    pub fn snapshot(&self) -> StockSnapshot {
        let guard = self.lock();
        StockSnapshot {
            id: self.id,
            name: self.name.clone(),
            unit: self.unit.clone(),
            unit_price: self.unit_price,
            original_quantity: self.original_quantity,
            quantity: guard.quantity(),
        }
    }
}

impl Entity for StockItem {
    type Id = StockItemId;

    fn id(&self) -> StockItemId {
        self.id
    }
}

/// Exclusive access to one item's quantity.
#[derive(Debug)]
pub struct StockGuard<'a> {
    item: &'a StockItem,
    quantity: MutexGuard<'a, i64>,
}

impl StockGuard<'_> {
    pub fn quantity(&self) -> i64 {
        *self.quantity
    }

    /// Remove `quantity` units from stock.
    ///
    /// Availability is not checked: a sale larger than the remaining stock
    /// drives the quantity below zero.
    pub fn withdraw(&mut self, quantity: i64) {
        *self.quantity -= quantity;
    }

    /// Units sold since creation.
    pub fn depletion(&self) -> i64 {
        self.item.original_quantity - *self.quantity
    }

    /// Value of the units sold since creation, at the item's unit price.
    pub fn depletion_value(&self) -> Money {
        self.item.unit_price * self.depletion()
    }
}

/// Point-in-time copy of an item, for reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockSnapshot {
    pub id: StockItemId,
    pub name: String,
    pub unit: String,
    pub unit_price: Money,
    pub original_quantity: i64,
    pub quantity: i64,
}

impl StockSnapshot {
    pub fn is_oversold(&self) -> bool {
        self.quantity < 0
    }
}
