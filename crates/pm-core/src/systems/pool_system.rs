//! Minimal system owning a single component pool.

use crate::component::{Component, ComponentSource};
use crate::entity::Entity;
use crate::pool::ComponentPool;
use crate::system::System;
use crate::type_id::PolyTypeId;

/// Owns one [`ComponentPool`] and copies matching payloads into it.
pub struct PoolSystem<T> {
    type_id: PolyTypeId,
    pool: ComponentPool<T>,
}

impl<T: Component> PoolSystem<T> {
    /// Create a system storing components registered as `type_id`.
    pub fn new(type_id: PolyTypeId) -> Self {
        Self::with_capacity(type_id, 0)
    }

    /// Same as [`new`](Self::new) with a pool capacity hint.
    pub fn with_capacity(type_id: PolyTypeId, capacity: usize) -> Self {
        Self {
            type_id,
            pool: ComponentPool::with_capacity(capacity),
        }
    }

    /// Read access to the stored components.
    pub fn pool(&self) -> &ComponentPool<T> {
        &self.pool
    }

    /// Write access to the stored components.
    pub fn pool_mut(&mut self) -> &mut ComponentPool<T> {
        &mut self.pool
    }
}

impl<T, D> System<D> for PoolSystem<T>
where
    T: Component + 'static,
    D: ComponentSource<T>,
{
    fn name(&self) -> &str {
        std::any::type_name::<T>()
    }

    fn subscriptions(&self) -> Vec<PolyTypeId> {
        vec![self.type_id]
    }

    fn create(&mut self, entity: Entity, type_id: PolyTypeId, data: &D) -> bool {
        if type_id != self.type_id || !entity.is_valid() {
            return false;
        }
        match data.component(entity) {
            Some(component) => {
                self.pool.insert(component);
                true
            }
            None => false,
        }
    }

    fn destroy(&mut self, entity: Entity) {
        if entity == Entity::ALL {
            self.pool.clear();
        } else {
            self.pool.destroy(entity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Name {
        entity: Entity,
        name: String,
    }

    impl Component for Name {
        fn for_entity(entity: Entity) -> Self {
            Self { entity, name: String::new() }
        }

        fn entity(&self) -> Entity {
            self.entity
        }
    }

    impl ComponentSource<Name> for &'static str {
        fn component(&self, entity: Entity) -> Option<Name> {
            Some(Name { entity, name: self.to_string() })
        }
    }

    fn system() -> PoolSystem<Name> {
        PoolSystem::new(PolyTypeId(0))
    }

    #[test]
    fn test_create_copies_payload() {
        let mut sys = system();
        assert!(System::<&str>::create(&mut sys, Entity(1), PolyTypeId(0), &"crate"));
        assert_eq!(sys.pool().get(Entity(1)).map(|n| n.name.as_str()), Some("crate"));
    }

    #[test]
    fn test_create_rejects_other_type() {
        let mut sys = system();
        assert!(!System::<&str>::create(&mut sys, Entity(1), PolyTypeId(3), &"crate"));
        assert!(sys.pool().is_empty());
    }

    #[test]
    fn test_create_rejects_sentinel() {
        let mut sys = system();
        assert!(!System::<&str>::create(&mut sys, Entity::INVALID, PolyTypeId(0), &"x"));
    }

    #[test]
    fn test_destroy_all() {
        let mut sys = system();
        for i in 0..4 {
            System::<&str>::create(&mut sys, Entity(i), PolyTypeId(0), &"n");
        }
        System::<&str>::destroy(&mut sys, Entity(2));
        assert_eq!(sys.pool().size(), 3);
        System::<&str>::destroy(&mut sys, Entity::ALL);
        assert!(sys.pool().is_empty());
    }
}
