//! Dense, entity-keyed component storage.

use std::collections::HashMap;

use crate::component::Component;
use crate::entity::Entity;

/// Contiguous storage for one component type.
///
/// Components live in a dense `Vec`; a side index maps each entity to its
/// slot so that lookup, insertion and removal are all O(1). Removal swaps the
/// last component into the freed slot.
#[derive(Debug, Clone)]
pub struct ComponentPool<T> {
    dense: Vec<T>,
    index: HashMap<Entity, usize>,
}

impl<T: Component> Default for ComponentPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Component> ComponentPool<T> {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a pool with room for `capacity` components before reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            dense: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Add a default component for `entity`.
    ///
    /// If the entity already has one, the existing component is returned
    /// untouched.
    pub fn emplace(&mut self, entity: Entity) -> &mut T {
        let slot = match self.index.get(&entity) {
            Some(&slot) => slot,
            None => self.push(T::for_entity(entity)),
        };
        &mut self.dense[slot]
    }

    /// Store `component` under its entity, replacing any existing one.
    pub fn insert(&mut self, component: T) -> &mut T {
        let entity = component.entity();
        let slot = match self.index.get(&entity) {
            Some(&slot) => {
                self.dense[slot] = component;
                slot
            }
            None => self.push(component),
        };
        &mut self.dense[slot]
    }

    fn push(&mut self, component: T) -> usize {
        let slot = self.dense.len();
        self.index.insert(component.entity(), slot);
        self.dense.push(component);
        slot
    }

    /// Component of `entity`, if any.
    pub fn get(&self, entity: Entity) -> Option<&T> {
        self.index.get(&entity).map(|&slot| &self.dense[slot])
    }

    /// Mutable component of `entity`, if any.
    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        match self.index.get(&entity) {
            Some(&slot) => Some(&mut self.dense[slot]),
            None => None,
        }
    }

    /// Returns true if `entity` has a component in this pool.
    pub fn contains(&self, entity: Entity) -> bool {
        self.index.contains_key(&entity)
    }

    /// Remove the component of `entity`. Absent entities are ignored.
    pub fn destroy(&mut self, entity: Entity) -> Option<T> {
        let slot = self.index.remove(&entity)?;
        let removed = self.dense.swap_remove(slot);
        if let Some(moved) = self.dense.get(slot) {
            self.index.insert(moved.entity(), slot);
        }
        Some(removed)
    }

    /// Remove every component.
    pub fn clear(&mut self) {
        self.dense.clear();
        self.index.clear();
    }

    /// Number of live components.
    pub fn size(&self) -> usize {
        self.dense.len()
    }

    /// Same as [`size`](Self::size).
    pub fn len(&self) -> usize {
        self.dense.len()
    }

    /// Returns true if the pool holds no components.
    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    /// Visit every live component.
    pub fn for_each(&mut self, mut f: impl FnMut(&mut T)) {
        for component in &mut self.dense {
            f(component);
        }
    }

    /// Iterate over live components.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.dense.iter()
    }

    /// Iterate mutably over live components.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.dense.iter_mut()
    }

    /// Entities that currently own a component, in storage order.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.dense.iter().map(Component::entity)
    }
}

impl<'a, T: Component> IntoIterator for &'a ComponentPool<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T: Component> IntoIterator for &'a mut ComponentPool<T> {
    type Item = &'a mut T;
    type IntoIter = std::slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Counter {
        entity: Entity,
        value: u64,
    }

    impl Component for Counter {
        fn for_entity(entity: Entity) -> Self {
            Self { entity, value: 0 }
        }

        fn entity(&self) -> Entity {
            self.entity
        }
    }

    #[test]
    fn test_emplace_is_idempotent() {
        let mut pool = ComponentPool::<Counter>::with_capacity(4);
        pool.emplace(Entity(3)).value = 42;
        assert_eq!(pool.size(), 1);

        let again = pool.emplace(Entity(3));
        assert_eq!(again.value, 42);
        assert_eq!(pool.size(), 1);
    }

    #[test]
    fn test_get_absent() {
        let pool = ComponentPool::<Counter>::new();
        assert!(pool.get(Entity(1)).is_none());
        assert!(!pool.contains(Entity(1)));
    }

    #[test]
    fn test_insert_overwrites() {
        let mut pool = ComponentPool::<Counter>::new();
        pool.insert(Counter { entity: Entity(1), value: 1 });
        pool.insert(Counter { entity: Entity(1), value: 2 });
        assert_eq!(pool.size(), 1);
        assert_eq!(pool.get(Entity(1)).map(|c| c.value), Some(2));
    }

    #[test]
    fn test_destroy_twice_is_noop() {
        let mut pool = ComponentPool::<Counter>::new();
        pool.emplace(Entity(1));
        pool.emplace(Entity(2));
        assert!(pool.destroy(Entity(1)).is_some());
        assert!(pool.destroy(Entity(1)).is_none());
        assert_eq!(pool.size(), 1);
        assert!(pool.contains(Entity(2)));
    }

    #[test]
    fn test_destroy_keeps_index_consistent() {
        let mut pool = ComponentPool::<Counter>::new();
        for i in 0..5 {
            pool.emplace(Entity(i)).value = i * 10;
        }
        pool.destroy(Entity(0));
        pool.destroy(Entity(2));
        for i in [1, 3, 4] {
            assert_eq!(pool.get(Entity(i)).map(|c| c.value), Some(i * 10));
        }
        assert!(pool.get(Entity(0)).is_none());
        assert!(pool.get(Entity(2)).is_none());
    }

    #[test]
    fn test_iteration_visits_live_set() {
        let mut pool = ComponentPool::<Counter>::new();
        for i in 0..10 {
            pool.emplace(Entity(i));
        }
        pool.destroy(Entity(4));

        let mut visited = 0;
        pool.for_each(|_| visited += 1);
        assert_eq!(visited, pool.size());
        assert_eq!((&pool).into_iter().count(), 9);
        assert!(pool.entities().all(|e| e != Entity(4)));
    }

    #[test]
    fn test_clear() {
        let mut pool = ComponentPool::<Counter>::new();
        pool.emplace(Entity(1));
        pool.clear();
        assert!(pool.is_empty());
        assert!(!pool.contains(Entity(1)));
    }

    #[test]
    fn test_many_emplace_and_range_destroy() {
        let mut pool = ComponentPool::<Counter>::with_capacity(32);
        let mut expected = 0u64;
        for i in 0..128u64 {
            let value = i * 3 + 1;
            pool.emplace(Entity(i)).value = value;
            expected += value;
        }
        for i in 44..=100u64 {
            if let Some(removed) = pool.destroy(Entity(i)) {
                expected -= removed.value;
            }
        }
        assert_eq!(pool.size(), 128 - 57);

        let mut sum = 0;
        for c in &pool {
            sum += c.value;
        }
        assert_eq!(sum, expected);

        let manual: u64 = (0..44u64).chain(101..128).map(|i| i * 3 + 1).sum();
        assert_eq!(sum, manual);
    }
}
