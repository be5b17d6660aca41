//! Components owned by the render system, and the creation payload that
//! carries them through the orchestrator.

use std::fmt;

use pm_core::{Component, ComponentSource, Entity, SceneGraphComponent};

use crate::light::{DirectionalLightComponent, PointLightComponent};
use crate::material::{DrawableHandle, MaterialHandle};

/// Geometry of an entity.
#[derive(Clone)]
pub struct MeshComponent {
    /// Owning entity.
    pub entity: Entity,
    /// Geometry to draw; entities without one are skipped.
    pub mesh: Option<DrawableHandle>,
    /// Object-space bounding sphere radius used for culling. Zero disables
    /// culling for the entity.
    pub bounding_radius: f32,
}

impl MeshComponent {
    /// Mesh component with a bounding radius.
    pub fn new(entity: Entity, mesh: DrawableHandle, bounding_radius: f32) -> Self {
        Self {
            entity,
            mesh: Some(mesh),
            bounding_radius,
        }
    }
}

impl Component for MeshComponent {
    fn for_entity(entity: Entity) -> Self {
        Self {
            entity,
            mesh: None,
            bounding_radius: 0.0,
        }
    }

    fn entity(&self) -> Entity {
        self.entity
    }
}

impl fmt::Debug for MeshComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MeshComponent")
            .field("entity", &self.entity)
            .field("mesh", &self.mesh.is_some())
            .field("bounding_radius", &self.bounding_radius)
            .finish()
    }
}

/// Surface of an entity.
#[derive(Clone)]
pub struct MaterialComponent {
    /// Owning entity.
    pub entity: Entity,
    /// Material to bind; entities without one are skipped.
    pub material: Option<MaterialHandle>,
    /// Draw into the shadow cascades.
    pub cast_shadow: bool,
    /// Sample the shadow cascades when shading.
    pub receive_shadow: bool,
}

impl MaterialComponent {
    /// Material component that casts and receives shadows.
    pub fn new(entity: Entity, material: MaterialHandle) -> Self {
        Self {
            entity,
            material: Some(material),
            cast_shadow: true,
            receive_shadow: true,
        }
    }
}

impl Component for MaterialComponent {
    fn for_entity(entity: Entity) -> Self {
        Self {
            entity,
            material: None,
            cast_shadow: true,
            receive_shadow: true,
        }
    }

    fn entity(&self) -> Entity {
        self.entity
    }
}

impl fmt::Debug for MaterialComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MaterialComponent")
            .field("entity", &self.entity)
            .field("material", &self.material.as_ref().map(|m| m.id()))
            .field("cast_shadow", &self.cast_shadow)
            .field("receive_shadow", &self.receive_shadow)
            .finish()
    }
}

/// Creation payload for every component type the built-in systems own.
#[derive(Debug, Clone)]
pub enum SceneComponent {
    /// Transform node.
    SceneGraph(SceneGraphComponent),
    /// Geometry.
    Mesh(MeshComponent),
    /// Surface.
    Material(MaterialComponent),
    /// Point light.
    PointLight(PointLightComponent),
    /// Directional light.
    DirectionalLight(DirectionalLightComponent),
}

impl ComponentSource<SceneGraphComponent> for SceneComponent {
    fn component(&self, entity: Entity) -> Option<SceneGraphComponent> {
        match self {
            SceneComponent::SceneGraph(node) => Some(SceneGraphComponent::new(
                entity,
                node.local_pose,
                node.local_scale,
            )),
            _ => None,
        }
    }
}

impl ComponentSource<MeshComponent> for SceneComponent {
    fn component(&self, entity: Entity) -> Option<MeshComponent> {
        match self {
            SceneComponent::Mesh(mesh) => Some(MeshComponent {
                entity,
                ..mesh.clone()
            }),
            _ => None,
        }
    }
}

impl ComponentSource<MaterialComponent> for SceneComponent {
    fn component(&self, entity: Entity) -> Option<MaterialComponent> {
        match self {
            SceneComponent::Material(material) => Some(MaterialComponent {
                entity,
                ..material.clone()
            }),
            _ => None,
        }
    }
}

impl ComponentSource<PointLightComponent> for SceneComponent {
    fn component(&self, entity: Entity) -> Option<PointLightComponent> {
        match self {
            SceneComponent::PointLight(light) => Some(PointLightComponent { entity, ..*light }),
            _ => None,
        }
    }
}

impl ComponentSource<DirectionalLightComponent> for SceneComponent {
    fn component(&self, entity: Entity) -> Option<DirectionalLightComponent> {
        match self {
            SceneComponent::DirectionalLight(light) => {
                Some(DirectionalLightComponent { entity, ..*light })
            }
            _ => None,
        }
    }
}
