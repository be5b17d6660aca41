//! Component storage of the render system.
//!
//! Kept apart from the GPU state so it can be exercised without a device.

use pm_core::{Component, ComponentPool, ComponentSource, Entity, PolyTypeId, TypeRegistry};

use crate::components::{MaterialComponent, MeshComponent};
use crate::light::{DirectionalLight, DirectionalLightComponent, PointLight, PointLightComponent};
use crate::material::{DrawableHandle, MaterialHandle};
use crate::payload::Renderable;

/// Pools for every component type the render system owns.
pub struct RenderComponents {
    mesh_type: PolyTypeId,
    material_type: PolyTypeId,
    point_light_type: PolyTypeId,
    directional_light_type: PolyTypeId,
    meshes: ComponentPool<MeshComponent>,
    materials: ComponentPool<MaterialComponent>,
    point_lights: ComponentPool<PointLightComponent>,
    directional_lights: ComponentPool<DirectionalLightComponent>,
}

/// A renderable with everything needed to draw it.
#[derive(Clone)]
pub struct Draw {
    /// Transform snapshot.
    pub renderable: Renderable,
    /// Geometry.
    pub mesh: DrawableHandle,
    /// Surface.
    pub material: MaterialHandle,
    /// Drawn into the shadow cascades.
    pub cast_shadow: bool,
    /// Samples the shadow cascades.
    pub receive_shadow: bool,
    /// World-space culling radius; zero never culls.
    pub radius: f32,
}

impl RenderComponents {
    /// Register the component types and create empty pools.
    pub fn new(types: &mut TypeRegistry) -> Self {
        Self {
            mesh_type: types.register::<MeshComponent>(),
            material_type: types.register::<MaterialComponent>(),
            point_light_type: types.register::<PointLightComponent>(),
            directional_light_type: types.register::<DirectionalLightComponent>(),
            meshes: ComponentPool::new(),
            materials: ComponentPool::new(),
            point_lights: ComponentPool::new(),
            directional_lights: ComponentPool::new(),
        }
    }

    /// Types routed to the render system.
    pub fn subscriptions(&self) -> Vec<PolyTypeId> {
        vec![
            self.mesh_type,
            self.material_type,
            self.point_light_type,
            self.directional_light_type,
        ]
    }

    /// Store the component of `type_id` carried by `data`.
    pub fn create<D>(&mut self, entity: Entity, type_id: PolyTypeId, data: &D) -> bool
    where
        D: ComponentSource<MeshComponent>
            + ComponentSource<MaterialComponent>
            + ComponentSource<PointLightComponent>
            + ComponentSource<DirectionalLightComponent>,
    {
        if !entity.is_valid() {
            return false;
        }
        if type_id == self.mesh_type {
            store(&mut self.meshes, ComponentSource::<MeshComponent>::component(data, entity))
        } else if type_id == self.material_type {
            store(
                &mut self.materials,
                ComponentSource::<MaterialComponent>::component(data, entity),
            )
        } else if type_id == self.point_light_type {
            store(
                &mut self.point_lights,
                ComponentSource::<PointLightComponent>::component(data, entity),
            )
        } else if type_id == self.directional_light_type {
            store(
                &mut self.directional_lights,
                ComponentSource::<DirectionalLightComponent>::component(data, entity),
            )
        } else {
            false
        }
    }

    /// Drop every component of `entity`; [`Entity::ALL`] clears all pools.
    pub fn destroy(&mut self, entity: Entity) {
        if entity == Entity::ALL {
            self.meshes.clear();
            self.materials.clear();
            self.point_lights.clear();
            self.directional_lights.clear();
        } else {
            self.meshes.destroy(entity);
            self.materials.destroy(entity);
            self.point_lights.destroy(entity);
            self.directional_lights.destroy(entity);
        }
    }

    /// Mesh components.
    pub fn meshes(&self) -> &ComponentPool<MeshComponent> {
        &self.meshes
    }

    /// Mutable mesh components.
    pub fn meshes_mut(&mut self) -> &mut ComponentPool<MeshComponent> {
        &mut self.meshes
    }

    /// Material components.
    pub fn materials(&self) -> &ComponentPool<MaterialComponent> {
        &self.materials
    }

    /// Mutable material components.
    pub fn materials_mut(&mut self) -> &mut ComponentPool<MaterialComponent> {
        &mut self.materials
    }

    /// Point light components.
    pub fn point_lights(&self) -> &ComponentPool<PointLightComponent> {
        &self.point_lights
    }

    /// Mutable point light components.
    pub fn point_lights_mut(&mut self) -> &mut ComponentPool<PointLightComponent> {
        &mut self.point_lights
    }

    /// Directional light components.
    pub fn directional_lights(&self) -> &ComponentPool<DirectionalLightComponent> {
        &self.directional_lights
    }

    /// Mutable directional light components.
    pub fn directional_lights_mut(&mut self) -> &mut ComponentPool<DirectionalLightComponent> {
        &mut self.directional_lights
    }

    /// The sun for this frame: the payload's, else the first enabled component.
    pub fn sunlight(&self, payload_sun: Option<DirectionalLight>) -> Option<DirectionalLight> {
        payload_sun.or_else(|| {
            self.directional_lights
                .iter()
                .find(|light| light.enabled)
                .map(|light| light.data)
        })
    }

    /// Enabled component lights followed by `extra`.
    pub fn point_lights_with<'a>(
        &'a self,
        extra: &'a [PointLight],
    ) -> impl Iterator<Item = &'a PointLight> + 'a {
        self.point_lights
            .iter()
            .filter(|light| light.enabled)
            .map(|light| &light.data)
            .chain(extra.iter())
    }

    /// Resolve mesh and material for each renderable.
    ///
    /// Renderables missing either are skipped.
    pub fn collect_draws(&self, render_set: &[Renderable]) -> Vec<Draw> {
        render_set
            .iter()
            .filter_map(|renderable| {
                let mesh = self.meshes.get(renderable.entity);
                let material = self.materials.get(renderable.entity);
                let (Some(mesh), Some(material)) = (mesh, material) else {
                    tracing::debug!("Skipping {}: missing mesh or material", renderable.entity);
                    return None;
                };
                let (Some(handle), Some(surface)) = (&mesh.mesh, &material.material) else {
                    tracing::debug!("Skipping {}: empty mesh or material", renderable.entity);
                    return None;
                };
                Some(Draw {
                    renderable: *renderable,
                    mesh: handle.clone(),
                    material: surface.clone(),
                    cast_shadow: material.cast_shadow,
                    receive_shadow: material.receive_shadow,
                    radius: mesh.bounding_radius * renderable.scale.abs().max_element(),
                })
            })
            .collect()
    }
}

fn store<T: Component>(pool: &mut ComponentPool<T>, component: Option<T>) -> bool {
    match component {
        Some(component) => {
            pool.insert(component);
            true
        }
        None => false,
    }
}
