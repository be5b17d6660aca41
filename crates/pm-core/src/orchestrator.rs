//! Routes component lifecycle requests to the systems that own them.

use std::collections::HashMap;

use crate::entity::{Entity, EntityAllocator};
use crate::system::{System, SystemId};
use crate::type_id::{PolyTypeId, TypeRegistry};

/// Registry of systems and of the component types each one handles.
///
/// The orchestrator owns its systems. Several systems may register for the
/// same type; a creation request is then delivered to each of them in
/// registration order.
pub struct EntityOrchestrator<D> {
    types: TypeRegistry,
    entities: EntityAllocator,
    systems: Vec<Box<dyn System<D>>>,
    routes: HashMap<PolyTypeId, Vec<SystemId>>,
}

impl<D: 'static> Default for EntityOrchestrator<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: 'static> EntityOrchestrator<D> {
    /// Create an orchestrator with an empty type registry.
    pub fn new() -> Self {
        Self::with_types(TypeRegistry::new())
    }

    /// Create an orchestrator around an already populated registry.
    pub fn with_types(types: TypeRegistry) -> Self {
        Self {
            types,
            entities: EntityAllocator::new(),
            systems: Vec::new(),
            routes: HashMap::new(),
        }
    }

    /// The type registry.
    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// Mutable type registry, for registering component types before systems
    /// are built.
    pub fn types_mut(&mut self) -> &mut TypeRegistry {
        &mut self.types
    }

    /// Allocate a fresh entity id.
    pub fn create_entity(&mut self) -> Entity {
        self.entities.allocate()
    }

    /// Take ownership of `system` and route its subscribed types to it.
    pub fn add_system<S: System<D>>(&mut self, system: S) -> SystemId {
        let id = SystemId(self.systems.len());
        let subscriptions = system.subscriptions();
        tracing::debug!(
            "Adding system '{}' ({} subscribed types)",
            system.name(),
            subscriptions.len()
        );
        self.systems.push(Box::new(system));
        for type_id in subscriptions {
            self.register_system_for_type(id, type_id);
        }
        id
    }

    /// Route creation requests for `type_id` to `system`.
    ///
    /// Registering the same pair twice has no effect. Unknown system ids are
    /// ignored.
    pub fn register_system_for_type(&mut self, system: SystemId, type_id: PolyTypeId) {
        if system.0 >= self.systems.len() {
            tracing::warn!("Ignoring route for unknown system {:?}", system);
            return;
        }
        let route = self.routes.entry(type_id).or_default();
        if !route.contains(&system) {
            route.push(system);
        }
    }

    /// Systems registered for `type_id`, in delivery order.
    pub fn systems_for(&self, type_id: PolyTypeId) -> &[SystemId] {
        self.routes.get(&type_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Deliver a creation request to every system registered for `type_id`.
    ///
    /// Returns true if at least one system accepted it. Types nobody handles
    /// are a silent no-op.
    pub fn submit_create(&mut self, entity: Entity, type_id: PolyTypeId, data: &D) -> bool {
        let Some(route) = self.routes.get(&type_id) else {
            tracing::trace!("No system handles {} (for {})", type_id, entity);
            return false;
        };

        let mut accepted = false;
        for id in route {
            let system = &mut self.systems[id.0];
            if system.create(entity, type_id, data) {
                accepted = true;
            } else {
                tracing::trace!("System '{}' rejected {} for {}", system.name(), type_id, entity);
            }
        }
        accepted
    }

    /// [`submit_create`](Self::submit_create) with the type id resolved from
    /// the registry.
    pub fn submit<T: 'static>(&mut self, entity: Entity, data: &D) -> bool {
        match self.types.id_of::<T>() {
            Some(type_id) => self.submit_create(entity, type_id, data),
            None => false,
        }
    }

    /// Tell every system to drop its state for `entity`.
    ///
    /// [`Entity::ALL`] is forwarded as is and clears every system.
    pub fn destroy_entity(&mut self, entity: Entity) {
        for system in &mut self.systems {
            system.destroy(entity);
        }
    }

    /// Clear every system.
    pub fn teardown(&mut self) {
        tracing::debug!("Tearing down {} systems", self.systems.len());
        self.destroy_entity(Entity::ALL);
    }

    /// Number of owned systems.
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    /// First system of concrete type `S`.
    pub fn system<S: System<D>>(&self) -> Option<&S> {
        self.systems
            .iter()
            .find_map(|s| downcast_ref::<D, S>(s.as_ref()))
    }

    /// First system of concrete type `S`, mutably.
    pub fn system_mut<S: System<D>>(&mut self) -> Option<&mut S> {
        self.systems
            .iter_mut()
            .find_map(|s| downcast_mut::<D, S>(s.as_mut()))
    }

    /// System by id.
    pub fn get(&self, id: SystemId) -> Option<&dyn System<D>> {
        self.systems.get(id.0).map(|s| s.as_ref())
    }
}

fn downcast_ref<D: 'static, S: System<D>>(system: &dyn System<D>) -> Option<&S> {
    system.as_any().downcast_ref::<S>()
}

fn downcast_mut<D: 'static, S: System<D>>(system: &mut dyn System<D>) -> Option<&mut S> {
    system.as_any_mut().downcast_mut::<S>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{Component, ComponentSource};
    use crate::systems::PoolSystem;

    #[derive(Debug, Clone, PartialEq)]
    struct Health {
        entity: Entity,
        hp: i32,
    }

    impl Component for Health {
        fn for_entity(entity: Entity) -> Self {
            Self { entity, hp: 0 }
        }

        fn entity(&self) -> Entity {
            self.entity
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Tag {
        entity: Entity,
    }

    impl Component for Tag {
        fn for_entity(entity: Entity) -> Self {
            Self { entity }
        }

        fn entity(&self) -> Entity {
            self.entity
        }
    }

    enum Payload {
        Health(i32),
        Tag,
    }

    impl ComponentSource<Health> for Payload {
        fn component(&self, entity: Entity) -> Option<Health> {
            match self {
                Payload::Health(hp) => Some(Health { entity, hp: *hp }),
                _ => None,
            }
        }
    }

    impl ComponentSource<Tag> for Payload {
        fn component(&self, entity: Entity) -> Option<Tag> {
            match self {
                Payload::Tag => Some(Tag { entity }),
                _ => None,
            }
        }
    }

    /// Records every request it sees and accepts nothing.
    struct Spy {
        watched: PolyTypeId,
        created: Vec<Entity>,
        destroyed: Vec<Entity>,
    }

    impl System<Payload> for Spy {
        fn name(&self) -> &str {
            "spy"
        }

        fn subscriptions(&self) -> Vec<PolyTypeId> {
            vec![self.watched]
        }

        fn create(&mut self, entity: Entity, _type_id: PolyTypeId, _data: &Payload) -> bool {
            self.created.push(entity);
            false
        }

        fn destroy(&mut self, entity: Entity) {
            self.destroyed.push(entity);
        }
    }

    #[test]
    fn test_fan_out_to_two_systems() {
        let mut orch = EntityOrchestrator::<Payload>::new();
        let health = orch.types_mut().register::<Health>();

        orch.add_system(PoolSystem::<Health>::new(health));
        orch.add_system(Spy { watched: health, created: vec![], destroyed: vec![] });
        assert_eq!(orch.systems_for(health).len(), 2);

        let e = orch.create_entity();
        assert!(orch.submit_create(e, health, &Payload::Health(10)));

        let pool = orch.system::<PoolSystem<Health>>().map(|s| s.pool());
        assert_eq!(pool.and_then(|p| p.get(e)).map(|h| h.hp), Some(10));
        let spy = orch.system::<Spy>();
        assert_eq!(spy.map(|s| s.created.clone()), Some(vec![e]));
    }

    #[test]
    fn test_unknown_type_is_noop() {
        let mut orch = EntityOrchestrator::<Payload>::new();
        let health = orch.types_mut().register::<Health>();
        orch.add_system(PoolSystem::<Health>::new(health));

        assert!(!orch.submit_create(Entity(0), PolyTypeId(99), &Payload::Tag));
        assert!(!orch.submit::<Tag>(Entity(0), &Payload::Tag));
    }

    #[test]
    fn test_rejected_payload_returns_false() {
        let mut orch = EntityOrchestrator::<Payload>::new();
        let health = orch.types_mut().register::<Health>();
        orch.add_system(PoolSystem::<Health>::new(health));

        // Right type id, wrong payload variant.
        assert!(!orch.submit_create(Entity(0), health, &Payload::Tag));
    }

    #[test]
    fn test_duplicate_registration_ignored() {
        let mut orch = EntityOrchestrator::<Payload>::new();
        let tag = orch.types_mut().register::<Tag>();
        let id = orch.add_system(PoolSystem::<Tag>::new(tag));
        orch.register_system_for_type(id, tag);
        orch.register_system_for_type(SystemId(42), tag);
        assert_eq!(orch.systems_for(tag), &[id]);
    }

    #[test]
    fn test_destroy_broadcasts() {
        let mut orch = EntityOrchestrator::<Payload>::new();
        let health = orch.types_mut().register::<Health>();
        let tag = orch.types_mut().register::<Tag>();
        orch.add_system(PoolSystem::<Health>::new(health));
        orch.add_system(Spy { watched: tag, created: vec![], destroyed: vec![] });

        let e = orch.create_entity();
        orch.submit::<Health>(e, &Payload::Health(3));
        orch.destroy_entity(e);

        let pool_len = orch.system::<PoolSystem<Health>>().map(|s| s.pool().size());
        assert_eq!(pool_len, Some(0));
        assert_eq!(orch.system::<Spy>().map(|s| s.destroyed.clone()), Some(vec![e]));
    }

    #[test]
    fn test_teardown_clears_everything() {
        let mut orch = EntityOrchestrator::<Payload>::new();
        let health = orch.types_mut().register::<Health>();
        orch.add_system(PoolSystem::<Health>::new(health));
        for _ in 0..5 {
            let e = orch.create_entity();
            orch.submit::<Health>(e, &Payload::Health(1));
        }
        orch.teardown();
        let pool_len = orch.system::<PoolSystem<Health>>().map(|s| s.pool().size());
        assert_eq!(pool_len, Some(0));
    }

    #[test]
    fn test_system_mut_lookup() {
        let mut orch = EntityOrchestrator::<Payload>::new();
        let health = orch.types_mut().register::<Health>();
        orch.add_system(PoolSystem::<Health>::new(health));
        assert!(orch.system_mut::<PoolSystem<Health>>().is_some());
        assert!(orch.system_mut::<Spy>().is_none());
    }
}
