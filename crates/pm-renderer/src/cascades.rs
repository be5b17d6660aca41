//! Stable cascaded shadow maps.
//!
//! Splits the camera frustum into [`NUM_CASCADES`] depth ranges and fits an
//! orthographic light projection around each. Each cascade is bounded by a
//! sphere instead of a box and its projection is snapped to whole shadow
//! texels, so cascades do not shimmer when the camera moves or rotates.

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::constants::shadow::{
    DEFAULT_RESOLUTION, DEFAULT_SPLIT_LAMBDA, NUM_CASCADES, RADIUS_QUANTUM,
};
use crate::settings::CascadeConfig;

/// Matrices and ranges for one cascade.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cascade {
    /// Near and far distance of the camera sub-frustum.
    pub split: Vec2,
    /// World to light view.
    pub view: Mat4,
    /// Light view to cascade clip space (texel snapped).
    pub projection: Mat4,
    /// `projection * view`.
    pub shadow_matrix: Mat4,
    /// Near plane of the light projection.
    pub light_near: f32,
    /// Far plane of the light projection.
    pub light_far: f32,
}

/// Per-frame cascade computation.
#[derive(Debug, Clone)]
pub struct StableCascadedShadows {
    /// Shadow map resolution per cascade.
    pub resolution: u32,
    /// Blend between linear (0) and logarithmic (1) split placement.
    pub split_lambda: f32,
    cascades: Vec<Cascade>,
}

impl Default for StableCascadedShadows {
    fn default() -> Self {
        Self::new(DEFAULT_RESOLUTION, DEFAULT_SPLIT_LAMBDA)
    }
}

impl StableCascadedShadows {
    /// Create with the given resolution and split lambda.
    pub fn new(resolution: u32, split_lambda: f32) -> Self {
        Self {
            resolution,
            split_lambda: split_lambda.clamp(0.0, 1.0),
            cascades: Vec::with_capacity(NUM_CASCADES),
        }
    }

    /// Create from renderer settings.
    pub fn from_config(config: &CascadeConfig) -> Self {
        Self::new(config.resolution, config.split_lambda)
    }

    /// Recompute every cascade for a camera and a light.
    ///
    /// `view` is the camera's world-to-view matrix; `light_dir` is the
    /// direction the light travels.
    pub fn update_cascades(
        &mut self,
        view: Mat4,
        near: f32,
        far: f32,
        aspect: f32,
        vfov: f32,
        light_dir: Vec3,
    ) {
        self.cascades.clear();

        let light_dir = light_dir.normalize_or(Vec3::NEG_Y);
        let splits = compute_split_distances(near, far, self.split_lambda);
        let resolution = self.resolution as f32;

        for &(split_near, split_far) in &splits {
            let split_projection = Mat4::perspective_rh(vfov, aspect, split_near, split_far);
            let corners = frustum_corners(split_projection * view);

            let centroid = corners.iter().copied().sum::<Vec3>() / corners.len() as f32;
            let radius = corners
                .iter()
                .map(|c| c.distance(centroid))
                .fold(0.0f32, f32::max);
            let radius = (radius / RADIUS_QUANTUM).ceil() * RADIUS_QUANTUM;

            let eye = centroid - light_dir * radius;
            let cascade_view = Mat4::look_at_rh(eye, centroid, light_up(light_dir));
            let mut projection = Mat4::orthographic_rh(-radius, radius, -radius, radius, 0.0, 2.0 * radius);

            snap_to_texel(&mut projection, cascade_view, resolution);

            self.cascades.push(Cascade {
                split: Vec2::new(split_near, split_far),
                view: cascade_view,
                projection,
                shadow_matrix: projection * cascade_view,
                light_near: 0.0,
                light_far: 2.0 * radius,
            });
        }
    }

    /// Cascades from the last update.
    pub fn cascades(&self) -> &[Cascade] {
        &self.cascades
    }

    /// Near and far distance of each cascade.
    pub fn split_planes(&self) -> Vec<Vec2> {
        self.cascades.iter().map(|c| c.split).collect()
    }

    /// Combined light matrix of each cascade.
    pub fn shadow_matrices(&self) -> Vec<Mat4> {
        self.cascades.iter().map(|c| c.shadow_matrix).collect()
    }
}

/// Near/far distance of every cascade using the practical split scheme.
///
/// Interior boundaries blend a uniform split with a logarithmic one by
/// `lambda`. The first cascade always starts at `near` and the last ends at
/// `far`.
pub fn compute_split_distances(near: f32, far: f32, lambda: f32) -> [(f32, f32); NUM_CASCADES] {
    let count = NUM_CASCADES as f32;
    let boundary = |i: usize| -> f32 {
        if i == 0 {
            return near;
        }
        if i == NUM_CASCADES {
            return far;
        }
        let t = i as f32 / count;
        let linear = near + t * (far - near);
        let log = near * (far / near).powf(t);
        linear + (log - linear) * lambda
    };
    std::array::from_fn(|i| (boundary(i), boundary(i + 1)))
}

/// World-space corners of the frustum described by `view_proj` (depth 0..1).
fn frustum_corners(view_proj: Mat4) -> [Vec3; 8] {
    let inverse = view_proj.inverse();
    let ndc = [
        Vec3::new(-1.0, -1.0, 0.0),
        Vec3::new(-1.0, 1.0, 0.0),
        Vec3::new(1.0, 1.0, 0.0),
        Vec3::new(1.0, -1.0, 0.0),
        Vec3::new(-1.0, -1.0, 1.0),
        Vec3::new(-1.0, 1.0, 1.0),
        Vec3::new(1.0, 1.0, 1.0),
        Vec3::new(1.0, -1.0, 1.0),
    ];
    ndc.map(|p| inverse.project_point3(p))
}

/// Up vector for a light view that is never parallel to the light.
fn light_up(light_dir: Vec3) -> Vec3 {
    if light_dir.cross(Vec3::Y).length_squared() < 1e-6 {
        Vec3::X
    } else {
        Vec3::Y
    }
}

/// Shift `projection` so the world origin lands on a texel corner.
fn snap_to_texel(projection: &mut Mat4, view: Mat4, resolution: f32) {
    let half = resolution * 0.5;
    let origin = (*projection * view).project_point3(Vec3::ZERO) * half;
    let rounded = origin.round();
    let offset = (rounded - origin) * (2.0 / resolution);
    projection.w_axis += Vec4::new(offset.x, offset.y, 0.0, 0.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera_view() -> Mat4 {
        Mat4::look_at_rh(Vec3::new(0.0, 2.0, 10.0), Vec3::ZERO, Vec3::Y)
    }

    fn updated(light_dir: Vec3) -> StableCascadedShadows {
        let mut shadows = StableCascadedShadows::new(1024, 0.5);
        shadows.update_cascades(camera_view(), 0.1, 100.0, 16.0 / 9.0, 1.0, light_dir);
        shadows
    }

    #[test]
    fn test_cascade_count_and_ordering() {
        let shadows = updated(Vec3::new(-0.3, -1.0, -0.2));
        let splits = shadows.split_planes();
        assert_eq!(splits.len(), NUM_CASCADES);
        for s in &splits {
            assert!(s.x < s.y);
        }
        for pair in splits.windows(2) {
            assert!(pair[0].x <= pair[1].x);
            assert!(pair[0].y <= pair[1].y);
            assert!((pair[0].y - pair[1].x).abs() < 1e-5);
        }
    }

    #[test]
    fn test_split_endpoints() {
        for lambda in [0.0, 0.5, 1.0] {
            let splits = compute_split_distances(0.5, 200.0, lambda);
            assert_eq!(splits[0].0, 0.5);
            assert_eq!(splits[NUM_CASCADES - 1].1, 200.0);
        }
    }

    #[test]
    fn test_split_lambda_extremes() {
        let linear = compute_split_distances(1.0, 101.0, 0.0);
        assert!((linear[0].1 - 26.0).abs() < 1e-4);
        let log = compute_split_distances(1.0, 10000.0, 1.0);
        assert!((log[1].1 - 100.0).abs() < 1e-2);
    }

    #[test]
    fn test_radius_is_quantized() {
        let shadows = updated(Vec3::NEG_Y);
        for c in shadows.cascades() {
            let radius = c.light_far * 0.5;
            let steps = radius / RADIUS_QUANTUM;
            assert!((steps - steps.round()).abs() < 1e-3);
        }
    }

    #[test]
    fn test_origin_snaps_to_texel() {
        let shadows = updated(Vec3::new(0.4, -1.0, 0.1));
        for c in shadows.cascades() {
            let origin = c.shadow_matrix.project_point3(Vec3::ZERO) * 512.0;
            assert!((origin.x - origin.x.round()).abs() < 1e-2);
            assert!((origin.y - origin.y.round()).abs() < 1e-2);
        }
    }

    #[test]
    fn test_cascade_covers_its_split() {
        let shadows = updated(Vec3::new(0.2, -1.0, 0.3));
        let view = camera_view();
        for c in shadows.cascades() {
            let proj = Mat4::perspective_rh(1.0, 16.0 / 9.0, c.split.x, c.split.y);
            for corner in frustum_corners(proj * view) {
                let p = c.shadow_matrix.project_point3(corner);
                assert!(p.x.abs() <= 1.0 + 2e-3 && p.y.abs() <= 1.0 + 2e-3);
                assert!((-1e-3..=1.0 + 1e-3).contains(&p.z));
            }
        }
    }

    #[test]
    fn test_vertical_light_uses_fallback_up() {
        let shadows = updated(Vec3::NEG_Y);
        for c in shadows.cascades() {
            assert!(c.view.is_finite());
        }
    }

    #[test]
    fn test_stable_under_small_translation() {
        let light = Vec3::new(0.3, -1.0, 0.2);
        let mut a = StableCascadedShadows::new(1024, 0.5);
        let mut b = StableCascadedShadows::new(1024, 0.5);
        a.update_cascades(camera_view(), 0.1, 100.0, 1.5, 1.0, light);
        let moved = camera_view() * Mat4::from_translation(Vec3::new(0.0001, 0.0, 0.0));
        b.update_cascades(moved, 0.1, 100.0, 1.5, 1.0, light);
        for (ca, cb) in a.cascades().iter().zip(b.cascades()) {
            assert_eq!(ca.light_far, cb.light_far);
        }
    }
}
