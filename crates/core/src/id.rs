//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Identifier of one simulation run (attached to every log line of the run).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(Uuid);

impl RunId {
    /// Create a new identifier.
    ///
    /// Uses UUIDv7 (time-ordered), so run ids sort by start time.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for RunId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for RunId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uuid =
            Uuid::from_str(s).map_err(|e| DomainError::invalid_id(format!("RunId: {e}")))?;
        Ok(Self(uuid))
    }
}

/// Position of a stock item in the catalogue.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StockItemId(u32);

/// Position of a bill in the generated backlog.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BillId(u64);

/// Index of a settlement worker in the pool.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkerId(u32);

macro_rules! impl_index_newtype {
    ($t:ty, $inner:ty, $name:literal) => {
        impl $t {
            pub const fn new(index: $inner) -> Self {
                Self(index)
            }

            pub const fn get(self) -> $inner {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<$inner> for $t {
            fn from(value: $inner) -> Self {
                Self(value)
            }
        }

        impl From<$t> for $inner {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let index = s
                    .parse::<$inner>()
                    .map_err(|e| DomainError::invalid_id(format!("{}: {}", $name, e)))?;
                Ok(Self(index))
            }
        }
    };
}

impl_index_newtype!(StockItemId, u32, "StockItemId");
impl_index_newtype!(BillId, u64, "BillId");
impl_index_newtype!(WorkerId, u32, "WorkerId");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_ids_are_unique_and_round_trip_through_display() {
        let a = RunId::new();
        let b = RunId::new();
        assert_ne!(a, b);

        let parsed: RunId = a.to_string().parse().unwrap();
        assert_eq!(parsed, a);
    }

    #[test]
    fn index_ids_parse_and_reject_garbage() {
        let id: BillId = "42".parse().unwrap();
        assert_eq!(id.get(), 42);

        let err = "forty-two".parse::<BillId>().unwrap_err();
        match err {
            DomainError::InvalidId(msg) => assert!(msg.starts_with("BillId")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn index_ids_serialize_transparently() {
        let json = serde_json::to_string(&StockItemId::new(3)).unwrap();
        assert_eq!(json, "3");
    }
}
