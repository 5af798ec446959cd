//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. `Money` is the
/// canonical example in this workspace: two amounts of 450 are the same amount,
/// no matter which bill line produced them.
///
/// The trait requires:
/// - **Copy**: values are small and passed around freely between threads
/// - **PartialEq**: compared by their attribute values
/// - **Debug**: printable in logs and test failures
pub trait ValueObject: Copy + PartialEq + core::fmt::Debug {}
