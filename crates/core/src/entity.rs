//! Entity trait: identity + continuity across state changes.

/// A record whose identity outlives changes to its fields.
///
/// Stores key records by `id()`; two records with the same id are the same
/// entity regardless of their other fields.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug + core::fmt::Display;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;
}
