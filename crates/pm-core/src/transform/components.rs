//! Scene graph records.

use glam::Vec3;

use crate::component::Component;
use crate::entity::Entity;
use crate::math::Pose;

/// Authored transform of an entity and its place in the hierarchy.
///
/// `parent` and `children` are plain ids; the transform system keeps them
/// in agreement.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneGraphComponent {
    /// Owning entity.
    pub entity: Entity,
    /// Pose relative to the parent (or the world, for roots).
    pub local_pose: Pose,
    /// Scale applied to the entity's own geometry. Not inherited.
    pub local_scale: Vec3,
    /// Parent entity, [`Entity::INVALID`] for roots.
    pub parent: Entity,
    /// Children in attachment order.
    pub children: Vec<Entity>,
}

impl SceneGraphComponent {
    /// Root node with the given local transform.
    pub fn new(entity: Entity, local_pose: Pose, local_scale: Vec3) -> Self {
        Self {
            entity,
            local_pose,
            local_scale,
            parent: Entity::INVALID,
            children: Vec::new(),
        }
    }

    /// Returns true if the node has a parent.
    pub fn has_parent(&self) -> bool {
        self.parent != Entity::INVALID
    }
}

impl Component for SceneGraphComponent {
    fn for_entity(entity: Entity) -> Self {
        Self::new(entity, Pose::IDENTITY, Vec3::ONE)
    }

    fn entity(&self) -> Entity {
        self.entity
    }
}

/// Cached world-space pose. Derived, never authored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldTransformComponent {
    /// Owning entity.
    pub entity: Entity,
    /// Pose in world space.
    pub world_pose: Pose,
}

impl Component for WorldTransformComponent {
    fn for_entity(entity: Entity) -> Self {
        Self { entity, world_pose: Pose::IDENTITY }
    }

    fn entity(&self) -> Entity {
        self.entity
    }
}
