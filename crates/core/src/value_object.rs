//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**: two quantities
/// of `3` are the same quantity, while two sales of `3` units are different
/// sales (see [`crate::Entity`]).
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
