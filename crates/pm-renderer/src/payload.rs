//! Per-frame render input.
//!
//! A [`RenderPayload`] is assembled by the application every frame and handed
//! to [`PbrRenderSystem::render_frame`](crate::PbrRenderSystem::render_frame),
//! which only reads it.

use std::fmt;
use std::sync::Arc;

use glam::{Mat4, Vec3};

use pm_core::{Entity, Pose, TransformSystem};

use crate::constants::viewport::CLEAR_COLOR;
use crate::light::{DirectionalLight, PointLight};
use crate::material::Skybox;
use crate::view::ViewData;

/// Transform snapshot of one entity to draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Renderable {
    /// Entity whose mesh and material are drawn.
    pub entity: Entity,
    /// World pose at gather time.
    pub world_pose: Pose,
    /// Local scale, applied before the world pose.
    pub scale: Vec3,
}

impl Renderable {
    /// Object to world matrix.
    pub fn model_matrix(&self) -> Mat4 {
        self.world_pose.matrix() * Mat4::from_scale(self.scale)
    }

    /// World-space position used for sorting and culling.
    pub fn position(&self) -> Vec3 {
        self.world_pose.position
    }
}

/// Image based lighting inputs, owned by the application.
#[derive(Debug, Clone)]
pub struct IblCubemaps {
    /// Diffuse irradiance cubemap.
    pub irradiance: Arc<wgpu::TextureView>,
    /// Prefiltered specular cubemap.
    pub radiance: Arc<wgpu::TextureView>,
    /// Mip count of `radiance`.
    pub radiance_mip_levels: u32,
}

/// Everything needed to draw one frame.
#[derive(Clone)]
pub struct RenderPayload {
    /// Entities to draw.
    pub render_set: Vec<Renderable>,
    /// Point lights in addition to those held as components.
    pub point_lights: Vec<PointLight>,
    /// The sun, if any. Overrides a directional light component.
    pub sunlight: Option<DirectionalLight>,
    /// One view per configured camera.
    pub views: Vec<ViewData>,
    /// Background.
    pub skybox: Option<Arc<dyn Skybox>>,
    /// Image based lighting.
    pub ibl: Option<IblCubemaps>,
    /// Linear RGBA clear color.
    pub clear_color: [f32; 4],
}

impl Default for RenderPayload {
    fn default() -> Self {
        Self {
            render_set: Vec::new(),
            point_lights: Vec::new(),
            sunlight: None,
            views: Vec::new(),
            skybox: None,
            ibl: None,
            clear_color: CLEAR_COLOR,
        }
    }
}

impl fmt::Debug for RenderPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderPayload")
            .field("render_set", &self.render_set.len())
            .field("point_lights", &self.point_lights.len())
            .field("sunlight", &self.sunlight)
            .field("views", &self.views.len())
            .field("skybox", &self.skybox.is_some())
            .field("ibl", &self.ibl.is_some())
            .field("clear_color", &self.clear_color)
            .finish()
    }
}

impl RenderPayload {
    /// Snapshot world transforms for `entities`.
    ///
    /// Entities without a transform are skipped.
    pub fn gather(
        transforms: &TransformSystem,
        entities: impl IntoIterator<Item = Entity>,
    ) -> Self {
        let render_set = entities
            .into_iter()
            .filter_map(|entity| {
                let world = transforms.get_world_transform(entity)?;
                let local = transforms.get_local_transform(entity)?;
                Some(Renderable {
                    entity,
                    world_pose: world.world_pose,
                    scale: local.local_scale,
                })
            })
            .collect();

        Self {
            render_set,
            ..Default::default()
        }
    }

    /// Add a camera view.
    pub fn with_view(mut self, view: ViewData) -> Self {
        self.views.push(view);
        self
    }

    /// Add a point light.
    pub fn with_point_light(mut self, light: PointLight) -> Self {
        self.point_lights.push(light);
        self
    }

    /// Set the sun.
    pub fn with_sunlight(mut self, light: DirectionalLight) -> Self {
        self.sunlight = Some(light);
        self
    }

    /// Set the skybox.
    pub fn with_skybox(mut self, skybox: Arc<dyn Skybox>) -> Self {
        self.skybox = Some(skybox);
        self
    }

    /// Set image based lighting.
    pub fn with_ibl(mut self, ibl: IblCubemaps) -> Self {
        self.ibl = Some(ibl);
        self
    }

    /// Set the clear color.
    pub fn with_clear_color(mut self, color: [f32; 4]) -> Self {
        self.clear_color = color;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pm_core::TypeRegistry;

    #[test]
    fn test_gather_skips_entities_without_transform() {
        let mut transforms = TransformSystem::new(&mut TypeRegistry::new());
        transforms
            .create(Entity(0), Pose::from_translation(Vec3::X), Vec3::splat(2.0))
            .unwrap();
        transforms
            .create(Entity(2), Pose::from_translation(Vec3::Y), Vec3::ONE)
            .unwrap();

        let payload = RenderPayload::gather(&transforms, [Entity(0), Entity(1), Entity(2)]);
        let entities: Vec<_> = payload.render_set.iter().map(|r| r.entity).collect();
        assert_eq!(entities, vec![Entity(0), Entity(2)]);
        assert_eq!(payload.render_set[0].scale, Vec3::splat(2.0));
    }

    #[test]
    fn test_gather_uses_world_pose() {
        let mut transforms = TransformSystem::new(&mut TypeRegistry::new());
        transforms
            .create(Entity(0), Pose::from_translation(Vec3::new(0.0, 5.0, 0.0)), Vec3::ONE)
            .unwrap();
        transforms
            .create(Entity(1), Pose::from_translation(Vec3::X), Vec3::ONE)
            .unwrap();
        transforms.add_child(Entity(0), Entity(1)).unwrap();

        let payload = RenderPayload::gather(&transforms, [Entity(1)]);
        assert!(payload.render_set[0]
            .position()
            .abs_diff_eq(Vec3::new(1.0, 5.0, 0.0), 1e-6));
    }

    #[test]
    fn test_model_matrix_scales_before_pose() {
        let r = Renderable {
            entity: Entity(0),
            world_pose: Pose::from_translation(Vec3::new(0.0, 0.0, 3.0)),
            scale: Vec3::splat(2.0),
        };
        let p = r.model_matrix().transform_point3(Vec3::X);
        assert!(p.abs_diff_eq(Vec3::new(2.0, 0.0, 3.0), 1e-6));
    }

    #[test]
    fn test_builder() {
        let payload = RenderPayload::default()
            .with_point_light(PointLight::default())
            .with_sunlight(DirectionalLight::default())
            .with_clear_color([1.0, 0.0, 0.0, 1.0]);
        assert_eq!(payload.point_lights.len(), 1);
        assert!(payload.sunlight.is_some());
        assert_eq!(payload.clear_color, [1.0, 0.0, 0.0, 1.0]);
        assert!(payload.skybox.is_none());
    }
}
