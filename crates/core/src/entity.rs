//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Ledger rows (movements, sales, reservations) are entities: two rows with the
/// same quantities are still different rows.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
