//! The system contract.
//!
//! A system owns the storage for one or more component types and reacts to
//! creation and destruction requests routed by the
//! [`EntityOrchestrator`](crate::EntityOrchestrator). `D` is the creation
//! payload type chosen by the application, typically an enum that implements
//! [`ComponentSource`](crate::ComponentSource) for each component type.

use std::any::Any;

use crate::entity::Entity;
use crate::type_id::PolyTypeId;

/// Index of a system inside its orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SystemId(pub usize);

/// Upcast helper so boxed systems can be looked up by concrete type.
pub trait AsAny: Any {
    /// `self` as [`Any`].
    fn as_any(&self) -> &dyn Any;
    /// `self` as mutable [`Any`].
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Polymorphic unit owning component storage.
pub trait System<D>: AsAny {
    /// Human readable name used in logs.
    fn name(&self) -> &str;

    /// Component types this system wants creation requests for.
    fn subscriptions(&self) -> Vec<PolyTypeId>;

    /// Create a component of `type_id` for `entity` from `data`.
    ///
    /// Returns false when the type or payload is not something this system
    /// owns. That is a routing mismatch, not an error.
    fn create(&mut self, entity: Entity, type_id: PolyTypeId, data: &D) -> bool;

    /// Drop every component this system holds for `entity`.
    ///
    /// [`Entity::ALL`] clears the whole system.
    fn destroy(&mut self, entity: Entity);
}
