//! The fixed set of stock items a run sells from.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use tillsim_core::{DomainError, DomainResult, Money, StockItemId};

use crate::item::{StockItem, StockSnapshot};

/// Startup description of one catalogue item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogueEntry {
    pub name: String,
    /// Price in smallest currency unit (e.g., bani).
    pub unit_price: i64,
    pub unit: String,
    pub initial_quantity: i64,
}

impl CatalogueEntry {
    pub fn new(
        name: impl Into<String>,
        unit_price: i64,
        unit: impl Into<String>,
        initial_quantity: i64,
    ) -> Self {
        Self {
            name: name.into(),
            unit_price,
            unit: unit.into(),
            initial_quantity,
        }
    }
}

/// Catalogue of stock items, created once at startup and never resized.
///
/// Items are handed out as `Arc<StockItem>` so bill lines can reference them
/// without borrowing the catalogue.
#[derive(Debug, Default)]
pub struct Catalogue {
    items: Vec<Arc<StockItem>>,
}

impl Catalogue {
    /// Build a catalogue; item ids follow entry order.
    pub fn from_entries(entries: &[CatalogueEntry]) -> DomainResult<Self> {
        let items = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let index = u32::try_from(index)
                    .map_err(|_| DomainError::validation("catalogue has too many items"))?;
                StockItem::new(
                    StockItemId::new(index),
                    entry.name.clone(),
                    Money::from_minor(entry.unit_price),
                    entry.unit.clone(),
                    entry.initial_quantity,
                )
                .map(Arc::new)
            })
            .collect::<DomainResult<Vec<_>>>()?;

        Ok(Self { items })
    }

    pub fn get(&self, id: StockItemId) -> DomainResult<&Arc<StockItem>> {
        self.items
            .get(id.get() as usize)
            .ok_or_else(|| DomainError::not_found(format!("stock item {id}")))
    }

    pub fn items(&self) -> &[Arc<StockItem>] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn snapshot(&self) -> Vec<StockSnapshot> {
        self.items.iter().map(|item| item.snapshot()).collect()
    }
}
