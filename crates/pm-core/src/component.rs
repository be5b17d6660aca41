//! Base component contract.

use crate::entity::Entity;

/// Plain data record owned by exactly one entity.
pub trait Component {
    /// Build a default-initialised component for `entity`.
    fn for_entity(entity: Entity) -> Self
    where
        Self: Sized;

    /// The owning entity.
    fn entity(&self) -> Entity;
}

/// Extracts a component of type `T` from a creation payload.
///
/// Payload types are usually enums with one variant per component type;
/// implementations return `None` when the payload carries some other variant.
pub trait ComponentSource<T> {
    /// Copy out the component carried by this payload, re-targeted at `entity`.
    fn component(&self, entity: Entity) -> Option<T>;
}
