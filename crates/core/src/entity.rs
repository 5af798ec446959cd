//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Stock items and bills are entities: two records with the same id are the
/// same record, whatever their current quantity or status.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;
}
