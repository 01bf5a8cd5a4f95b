//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Catalog records (items, collaborators) are entities: edits keep the same
/// identity, and deletion/deactivation is addressed by that identity.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug + core::fmt::Display;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;

    /// Whether the entity is currently active (soft-deleted entities are not).
    fn is_active(&self) -> bool;
}

/// The entity with `id`, active or not.
pub fn find_by_id<'a, E: Entity>(rows: &'a [E], id: &E::Id) -> Option<&'a E> {
    rows.iter().find(|row| row.id() == id)
}

/// Entities that have not been deactivated, in input order.
pub fn active_only<'a, E: Entity + 'a>(
    rows: impl IntoIterator<Item = &'a E>,
) -> impl Iterator<Item = &'a E> {
    rows.into_iter().filter(|row| row.is_active())
}
