//! Hierarchical transforms.
//!
//! [`TransformSystem`] owns a forest of [`SceneGraphComponent`]s and a cache
//! of [`WorldTransformComponent`]s derived from it. Every mutation goes
//! through the system, which recomputes the affected subtree top-down so a
//! parent's world pose is always final before its children read it.

mod components;

use glam::Vec3;

pub use components::{SceneGraphComponent, WorldTransformComponent};

use crate::component::ComponentSource;
use crate::entity::Entity;
use crate::math::Pose;
use crate::pool::ComponentPool;
use crate::system::System;
use crate::type_id::{PolyTypeId, TypeRegistry};

/// Structural errors raised by mutating transform calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransformError {
    #[error("Invalid entity")]
    InvalidEntity,
    #[error("Entity has no transform: {0}")]
    NoTransform(Entity),
    #[error("Entity already has a parent: {0}")]
    AlreadyHasParent(Entity),
    #[error("Parenting would create a cycle")]
    WouldCreateCycle,
}

/// Owner of the scene graph and the world transform cache.
pub struct TransformSystem {
    scene_graph_type: PolyTypeId,
    world_transform_type: PolyTypeId,
    scene_graph: ComponentPool<SceneGraphComponent>,
    world_transforms: ComponentPool<WorldTransformComponent>,
}

impl TransformSystem {
    /// Create an empty system, registering its component types.
    pub fn new(types: &mut TypeRegistry) -> Self {
        Self {
            scene_graph_type: types.register::<SceneGraphComponent>(),
            world_transform_type: types.register::<WorldTransformComponent>(),
            scene_graph: ComponentPool::new(),
            world_transforms: ComponentPool::new(),
        }
    }

    fn check_entity(&self, entity: Entity) -> Result<(), TransformError> {
        if !entity.is_valid() {
            return Err(TransformError::InvalidEntity);
        }
        if !self.scene_graph.contains(entity) {
            return Err(TransformError::NoTransform(entity));
        }
        Ok(())
    }

    // ========== Mutation ==========

    /// Give `entity` a transform.
    ///
    /// New entities become roots whose world pose equals `local_pose`.
    /// Calling this again on an entity that already has a transform resets its
    /// local pose and scale, keeps its parent and children, and recomputes the
    /// subtree.
    pub fn create(
        &mut self,
        entity: Entity,
        local_pose: Pose,
        local_scale: Vec3,
    ) -> Result<(), TransformError> {
        if !entity.is_valid() {
            return Err(TransformError::InvalidEntity);
        }

        match self.scene_graph.get_mut(entity) {
            Some(node) => {
                node.local_pose = local_pose;
                node.local_scale = local_scale;
            }
            None => {
                self.scene_graph
                    .insert(SceneGraphComponent::new(entity, local_pose, local_scale));
                self.world_transforms.emplace(entity);
            }
        }

        self.recalculate_world_transform(entity);
        Ok(())
    }

    /// Change the local transform of an existing entity.
    pub fn set_local_transform(
        &mut self,
        entity: Entity,
        local_pose: Pose,
        local_scale: Vec3,
    ) -> Result<(), TransformError> {
        self.check_entity(entity)?;
        if let Some(node) = self.scene_graph.get_mut(entity) {
            node.local_pose = local_pose;
            node.local_scale = local_scale;
        }
        self.recalculate_world_transform(entity);
        Ok(())
    }

    /// Attach `child` under `parent`.
    ///
    /// Attaching a child to the parent it already has is a no-op.
    pub fn add_child(&mut self, parent: Entity, child: Entity) -> Result<(), TransformError> {
        self.check_entity(parent)?;
        self.check_entity(child)?;

        if parent == child || self.is_descendant(parent, child) {
            return Err(TransformError::WouldCreateCycle);
        }

        let current = self.get_parent(child);
        if current == parent {
            return Ok(());
        }
        if current != Entity::INVALID {
            return Err(TransformError::AlreadyHasParent(child));
        }

        if let Some(node) = self.scene_graph.get_mut(parent) {
            node.children.push(child);
        }
        if let Some(node) = self.scene_graph.get_mut(child) {
            node.parent = parent;
        }

        self.recalculate_world_transform(parent);
        Ok(())
    }

    /// Detach `child` from its parent, turning it into a root.
    ///
    /// Entities without a parent are left untouched.
    pub fn remove_parent(&mut self, child: Entity) -> Result<(), TransformError> {
        self.check_entity(child)?;
        if self.unlink_from_parent(child) {
            self.recalculate_world_transform(child);
        }
        Ok(())
    }

    /// Remove `entity` and its whole subtree.
    pub fn destroy(&mut self, entity: Entity) -> Result<(), TransformError> {
        self.check_entity(entity)?;
        self.unlink_from_parent(entity);
        self.destroy_subtree(entity);
        Ok(())
    }

    /// Remove every transform.
    pub fn clear(&mut self) {
        self.scene_graph.clear();
        self.world_transforms.clear();
    }

    fn unlink_from_parent(&mut self, child: Entity) -> bool {
        let parent = self.get_parent(child);
        if parent == Entity::INVALID {
            return false;
        }

        if let Some(node) = self.scene_graph.get_mut(parent) {
            if let Some(idx) = node.children.iter().position(|&c| c == child) {
                node.children.remove(idx);
            }
        }
        if let Some(node) = self.scene_graph.get_mut(child) {
            node.parent = Entity::INVALID;
        }
        true
    }

    fn destroy_subtree(&mut self, entity: Entity) {
        let children = self
            .scene_graph
            .get(entity)
            .map(|node| node.children.clone())
            .unwrap_or_default();
        for child in children {
            self.destroy_subtree(child);
        }
        self.scene_graph.destroy(entity);
        self.world_transforms.destroy(entity);
    }

    /// Returns true if `node` sits somewhere below `ancestor`.
    fn is_descendant(&self, node: Entity, ancestor: Entity) -> bool {
        let mut current = self.get_parent(node);
        while current != Entity::INVALID {
            if current == ancestor {
                return true;
            }
            current = self.get_parent(current);
        }
        false
    }

    fn recalculate_world_transform(&mut self, entity: Entity) {
        let Some(node) = self.scene_graph.get(entity) else {
            return;
        };

        let world_pose = match self.world_transforms.get(node.parent) {
            Some(parent) => parent.world_pose * node.local_pose,
            None => node.local_pose,
        };
        let children = node.children.clone();

        self.world_transforms.emplace(entity).world_pose = world_pose;
        for child in children {
            self.recalculate_world_transform(child);
        }
    }

    // ========== Queries ==========

    /// Scene graph record of `entity`.
    pub fn get_local_transform(&self, entity: Entity) -> Option<&SceneGraphComponent> {
        self.scene_graph.get(entity)
    }

    /// Cached world transform of `entity`.
    pub fn get_world_transform(&self, entity: Entity) -> Option<&WorldTransformComponent> {
        self.world_transforms.get(entity)
    }

    /// Parent of `entity`, or [`Entity::INVALID`].
    pub fn get_parent(&self, entity: Entity) -> Entity {
        self.scene_graph
            .get(entity)
            .map_or(Entity::INVALID, |node| node.parent)
    }

    /// Children of `entity` in attachment order.
    pub fn get_children(&self, entity: Entity) -> &[Entity] {
        self.scene_graph
            .get(entity)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    /// Returns true if `entity` has a transform.
    pub fn has_transform(&self, entity: Entity) -> bool {
        self.scene_graph.contains(entity)
    }

    /// Entities without a parent.
    pub fn roots(&self) -> impl Iterator<Item = Entity> + '_ {
        self.scene_graph
            .iter()
            .filter(|node| !node.has_parent())
            .map(|node| node.entity)
    }

    /// Number of entities with a transform.
    pub fn len(&self) -> usize {
        self.scene_graph.size()
    }

    /// Returns true if no entity has a transform.
    pub fn is_empty(&self) -> bool {
        self.scene_graph.is_empty()
    }

    /// Type id of [`SceneGraphComponent`].
    pub fn scene_graph_type(&self) -> PolyTypeId {
        self.scene_graph_type
    }

    /// Type id of [`WorldTransformComponent`].
    pub fn world_transform_type(&self) -> PolyTypeId {
        self.world_transform_type
    }
}

impl<D: ComponentSource<SceneGraphComponent>> System<D> for TransformSystem {
    fn name(&self) -> &str {
        "transform"
    }

    fn subscriptions(&self) -> Vec<PolyTypeId> {
        vec![self.scene_graph_type, self.world_transform_type]
    }

    fn create(&mut self, entity: Entity, type_id: PolyTypeId, data: &D) -> bool {
        // World transforms are derived and cannot be created directly.
        if type_id != self.scene_graph_type {
            return false;
        }
        let Some(node) = data.component(entity) else {
            return false;
        };
        match TransformSystem::create(self, entity, node.local_pose, node.local_scale) {
            Ok(()) => true,
            Err(err) => {
                tracing::debug!("Transform create rejected for {}: {}", entity, err);
                false
            }
        }
    }

    fn destroy(&mut self, entity: Entity) {
        if entity == Entity::ALL {
            self.clear();
        } else if self.has_transform(entity) {
            if let Err(err) = TransformSystem::destroy(self, entity) {
                tracing::debug!("Transform destroy rejected for {}: {}", entity, err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;
    use std::f32::consts::FRAC_PI_2;

    fn system() -> TransformSystem {
        TransformSystem::new(&mut TypeRegistry::new())
    }

    fn at(x: f32, y: f32, z: f32) -> Pose {
        Pose::from_translation(Vec3::new(x, y, z))
    }

    fn world_position(sys: &TransformSystem, e: Entity) -> Option<Vec3> {
        sys.get_world_transform(e).map(|w| w.world_pose.position)
    }

    #[test]
    fn test_absent_entity_has_no_transform() {
        let sys = system();
        assert!(!sys.has_transform(Entity(0)));
        assert!(sys.get_world_transform(Entity(0)).is_none());
        assert!(sys.get_local_transform(Entity(0)).is_none());
        assert_eq!(sys.get_parent(Entity(0)), Entity::INVALID);
        assert!(sys.get_children(Entity(0)).is_empty());
    }

    #[test]
    fn test_root_world_equals_local() {
        let mut sys = system();
        let pose = Pose::new(Quat::from_rotation_y(0.5), Vec3::new(1.0, 2.0, 3.0));
        sys.create(Entity(1), pose, Vec3::ONE).unwrap();
        assert_eq!(sys.get_world_transform(Entity(1)).map(|w| w.world_pose), Some(pose));
    }

    #[test]
    fn test_create_rejects_sentinel() {
        let mut sys = system();
        assert_eq!(
            sys.create(Entity::INVALID, Pose::IDENTITY, Vec3::ONE),
            Err(TransformError::InvalidEntity)
        );
    }

    #[test]
    fn test_child_composes_with_parent() {
        let mut sys = system();
        let parent = Pose::new(Quat::from_rotation_z(FRAC_PI_2), Vec3::new(0.0, 0.0, 2.0));
        let local = at(1.0, 0.0, 0.0);
        sys.create(Entity(1), parent, Vec3::ONE).unwrap();
        sys.create(Entity(2), local, Vec3::ONE).unwrap();
        sys.add_child(Entity(1), Entity(2)).unwrap();

        let world = sys.get_world_transform(Entity(2)).unwrap().world_pose;
        assert!(world.abs_diff_eq(&(parent * local), 1e-5));
        assert!(world.position.abs_diff_eq(Vec3::new(0.0, 1.0, 2.0), 1e-5));
    }

    #[test]
    fn test_end_to_end_propagation() {
        let mut sys = system();
        let a = Entity(0);
        let b = Entity(1);
        sys.create(a, Pose::IDENTITY, Vec3::ONE).unwrap();
        sys.create(b, at(1.0, 0.0, 0.0), Vec3::ONE).unwrap();
        sys.add_child(a, b).unwrap();
        assert_eq!(world_position(&sys, b), Some(Vec3::new(1.0, 0.0, 0.0)));

        sys.create(a, at(0.0, 5.0, 0.0), Vec3::ONE).unwrap();
        assert_eq!(world_position(&sys, b), Some(Vec3::new(1.0, 5.0, 0.0)));
        // Re-creating keeps the hierarchy.
        assert_eq!(sys.get_parent(b), a);
        assert_eq!(sys.get_children(a), &[b]);
    }

    #[test]
    fn test_set_local_transform_propagates_to_grandchildren() {
        let mut sys = system();
        for i in 0..3 {
            sys.create(Entity(i), at(1.0, 0.0, 0.0), Vec3::ONE).unwrap();
        }
        sys.add_child(Entity(0), Entity(1)).unwrap();
        sys.add_child(Entity(1), Entity(2)).unwrap();
        assert_eq!(world_position(&sys, Entity(2)), Some(Vec3::new(3.0, 0.0, 0.0)));

        sys.set_local_transform(Entity(0), at(0.0, 0.0, -1.0), Vec3::ONE).unwrap();
        assert_eq!(world_position(&sys, Entity(2)), Some(Vec3::new(2.0, 0.0, -1.0)));
        assert_eq!(
            sys.set_local_transform(Entity(9), Pose::IDENTITY, Vec3::ONE),
            Err(TransformError::NoTransform(Entity(9)))
        );
    }

    #[test]
    fn test_add_child_requires_transforms() {
        let mut sys = system();
        sys.create(Entity(1), Pose::IDENTITY, Vec3::ONE).unwrap();
        assert_eq!(
            sys.add_child(Entity(1), Entity(2)),
            Err(TransformError::NoTransform(Entity(2)))
        );
        assert_eq!(
            sys.add_child(Entity::INVALID, Entity(1)),
            Err(TransformError::InvalidEntity)
        );
    }

    #[test]
    fn test_add_child_rejects_cycles() {
        let mut sys = system();
        for i in 0..3 {
            sys.create(Entity(i), Pose::IDENTITY, Vec3::ONE).unwrap();
        }
        sys.add_child(Entity(0), Entity(1)).unwrap();
        sys.add_child(Entity(1), Entity(2)).unwrap();
        assert_eq!(sys.add_child(Entity(2), Entity(0)), Err(TransformError::WouldCreateCycle));
        assert_eq!(sys.add_child(Entity(1), Entity(1)), Err(TransformError::WouldCreateCycle));
    }

    #[test]
    fn test_add_child_rejects_second_parent() {
        let mut sys = system();
        for i in 0..3 {
            sys.create(Entity(i), Pose::IDENTITY, Vec3::ONE).unwrap();
        }
        sys.add_child(Entity(0), Entity(2)).unwrap();
        assert_eq!(
            sys.add_child(Entity(1), Entity(2)),
            Err(TransformError::AlreadyHasParent(Entity(2)))
        );
        // Same parent again is a no-op.
        sys.add_child(Entity(0), Entity(2)).unwrap();
        assert_eq!(sys.get_children(Entity(0)), &[Entity(2)]);
    }

    #[test]
    fn test_remove_parent_makes_root() {
        let mut sys = system();
        sys.create(Entity(0), at(0.0, 5.0, 0.0), Vec3::ONE).unwrap();
        sys.create(Entity(1), at(1.0, 0.0, 0.0), Vec3::ONE).unwrap();
        sys.add_child(Entity(0), Entity(1)).unwrap();

        sys.remove_parent(Entity(1)).unwrap();
        assert_eq!(sys.get_parent(Entity(1)), Entity::INVALID);
        assert!(sys.get_children(Entity(0)).is_empty());
        assert_eq!(world_position(&sys, Entity(1)), Some(Vec3::new(1.0, 0.0, 0.0)));

        // Already a root.
        sys.remove_parent(Entity(1)).unwrap();
        assert_eq!(
            sys.remove_parent(Entity(7)),
            Err(TransformError::NoTransform(Entity(7)))
        );
    }

    #[test]
    fn test_destroy_removes_subtree() {
        let mut sys = system();
        for i in 0..5 {
            sys.create(Entity(i), Pose::IDENTITY, Vec3::ONE).unwrap();
        }
        sys.add_child(Entity(0), Entity(1)).unwrap();
        sys.add_child(Entity(1), Entity(2)).unwrap();
        sys.add_child(Entity(1), Entity(3)).unwrap();
        sys.add_child(Entity(0), Entity(4)).unwrap();

        sys.destroy(Entity(1)).unwrap();
        for i in 1..4 {
            assert!(!sys.has_transform(Entity(i)));
            assert!(sys.get_world_transform(Entity(i)).is_none());
        }
        assert_eq!(sys.get_children(Entity(0)), &[Entity(4)]);
        assert_eq!(sys.len(), 2);

        assert_eq!(sys.destroy(Entity(1)), Err(TransformError::NoTransform(Entity(1))));
        assert_eq!(sys.destroy(Entity::INVALID), Err(TransformError::InvalidEntity));
    }

    #[test]
    fn test_roots() {
        let mut sys = system();
        for i in 0..3 {
            sys.create(Entity(i), Pose::IDENTITY, Vec3::ONE).unwrap();
        }
        sys.add_child(Entity(0), Entity(1)).unwrap();
        let mut roots: Vec<_> = sys.roots().collect();
        roots.sort();
        assert_eq!(roots, vec![Entity(0), Entity(2)]);
    }

    enum Payload {
        Node(Pose),
        World,
    }

    impl ComponentSource<SceneGraphComponent> for Payload {
        fn component(&self, entity: Entity) -> Option<SceneGraphComponent> {
            match self {
                Payload::Node(pose) => Some(SceneGraphComponent::new(entity, *pose, Vec3::ONE)),
                Payload::World => None,
            }
        }
    }

    #[test]
    fn test_system_contract() {
        let mut types = TypeRegistry::new();
        let mut sys = TransformSystem::new(&mut types);
        let node_type = sys.scene_graph_type();
        let world_type = sys.world_transform_type();

        assert!(System::<Payload>::create(&mut sys, Entity(1), node_type, &Payload::Node(at(1.0, 0.0, 0.0))));
        assert!(!System::<Payload>::create(&mut sys, Entity(2), world_type, &Payload::World));
        assert!(!System::<Payload>::create(&mut sys, Entity(2), node_type, &Payload::World));
        assert_eq!(world_position(&sys, Entity(1)), Some(Vec3::X));

        // Unknown entities are ignored by the broadcast path.
        System::<Payload>::destroy(&mut sys, Entity(99));
        System::<Payload>::destroy(&mut sys, Entity::ALL);
        assert!(sys.is_empty());
    }

    #[test]
    fn test_system_destroy_removes_subtree() {
        let mut types = TypeRegistry::new();
        let mut sys = TransformSystem::new(&mut types);
        let node_type = sys.scene_graph_type();

        for e in 1..=3 {
            assert!(System::<Payload>::create(&mut sys, Entity(e), node_type, &Payload::Node(at(1.0, 0.0, 0.0))));
        }
        sys.add_child(Entity(1), Entity(2)).unwrap();
        sys.add_child(Entity(2), Entity(3)).unwrap();

        System::<Payload>::destroy(&mut sys, Entity(2));
        assert!(sys.has_transform(Entity(1)));
        assert!(!sys.has_transform(Entity(2)));
        assert!(!sys.has_transform(Entity(3)));
        assert!(sys.get_children(Entity(1)).is_empty());
        assert_eq!(sys.len(), 1);

        // Destroying again is a no-op.
        System::<Payload>::destroy(&mut sys, Entity(2));
        assert_eq!(sys.len(), 1);
    }
}
