//! GPU uniform blocks.
//!
//! Layouts mirror the structs in `shaders/common.wgsl`.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::constants::lighting::MAX_POINT_LIGHTS;
use crate::constants::shadow::NUM_CASCADES;

/// Point light as seen by the shaders.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct PointLightUniform {
    /// World-space position.
    pub position: [f32; 3],
    /// Distance at which the light fades to zero.
    pub radius: f32,
    /// Linear RGB color.
    pub color: [f32; 3],
    /// Padding for alignment.
    pub _pad: f32,
}

/// Directional light as seen by the shaders.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct DirectionalLightUniform {
    /// Direction the light travels (normalized).
    pub direction: [f32; 3],
    /// Intensity multiplier.
    pub amount: f32,
    /// Linear RGB color.
    pub color: [f32; 3],
    /// Padding for alignment.
    pub _pad: f32,
}

/// Data shared by every draw in a frame.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct SceneUniform {
    /// The sun.
    pub directional_light: DirectionalLightUniform,
    /// Point lights; only the first `active_point_lights` are valid.
    pub point_lights: [PointLightUniform; MAX_POINT_LIGHTS],
    /// World to cascade clip space, one per cascade.
    pub cascade_matrices: [[[f32; 4]; 4]; NUM_CASCADES],
    /// Per cascade: split near, split far, light-space near, light-space far.
    pub cascade_planes: [[f32; 4]; NUM_CASCADES],
    /// Render size in pixels.
    pub resolution: [f32; 2],
    /// Reciprocal of `resolution`.
    pub inv_resolution: [f32; 2],
    /// Seconds since the renderer was created.
    pub time: f32,
    /// Number of valid entries in `point_lights`.
    pub active_point_lights: u32,
    /// 1 when `directional_light` is valid.
    pub sunlight_active: u32,
    /// 1 when the cascade data is valid.
    pub shadows_active: u32,
}

impl Default for SceneUniform {
    fn default() -> Self {
        Self::zeroed()
    }
}

/// Per-view camera data.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct ViewUniform {
    /// World to view.
    pub view: [[f32; 4]; 4],
    /// World to clip.
    pub view_proj: [[f32; 4]; 4],
    /// Eye position (w = 1).
    pub eye_position: [f32; 4],
}

impl ViewUniform {
    /// Build from view matrices and eye position.
    pub fn new(view: Mat4, view_proj: Mat4, eye: Vec3) -> Self {
        Self {
            view: view.to_cols_array_2d(),
            view_proj: view_proj.to_cols_array_2d(),
            eye_position: eye.extend(1.0).to_array(),
        }
    }
}

/// Per-draw object data, addressed with a dynamic offset.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct ObjectUniform {
    /// Object to world.
    pub model: [[f32; 4]; 4],
    /// Inverse transpose of `model`, for normals.
    pub model_it: [[f32; 4]; 4],
    /// 1 when the object samples the shadow map.
    pub receive_shadow: f32,
    /// Padding for alignment.
    pub _pad: [f32; 3],
}

impl ObjectUniform {
    /// Build from a model matrix.
    pub fn new(model: Mat4, receive_shadow: bool) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            model_it: model.inverse().transpose().to_cols_array_2d(),
            receive_shadow: if receive_shadow { 1.0 } else { 0.0 },
            _pad: [0.0; 3],
        }
    }
}

/// Light-space matrix for one cascade layer of the caster pass.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CascadeUniform {
    /// World to cascade clip space.
    pub shadow_matrix: [[f32; 4]; 4],
}

/// Round `size` up to the next multiple of `alignment`.
pub fn align_to(size: u64, alignment: u64) -> u64 {
    size.div_ceil(alignment) * alignment
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizes_are_vec4_multiples() {
        assert_eq!(std::mem::size_of::<PointLightUniform>(), 32);
        assert_eq!(std::mem::size_of::<DirectionalLightUniform>(), 32);
        assert_eq!(std::mem::size_of::<ViewUniform>(), 144);
        assert_eq!(std::mem::size_of::<ObjectUniform>(), 144);
        assert_eq!(std::mem::size_of::<SceneUniform>() % 16, 0);
    }

    #[test]
    fn test_align_to() {
        assert_eq!(align_to(144, 256), 256);
        assert_eq!(align_to(256, 256), 256);
        assert_eq!(align_to(257, 256), 512);
    }

    #[test]
    fn test_object_normal_matrix() {
        let model = Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));
        let object = ObjectUniform::new(model, true);
        let it = Mat4::from_cols_array_2d(&object.model_it);
        assert!(it.abs_diff_eq(Mat4::from_scale(Vec3::new(0.5, 1.0, 1.0)), 1e-6));
        assert_eq!(object.receive_shadow, 1.0);
    }
}
